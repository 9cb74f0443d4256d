//! Authority → permission expansion and the evaluator over it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use atelier_core::{Action, ResourceKind};

use crate::Principal;

/// Baseline authority granted to a customer on first-login confirmation.
pub const DEFAULT_CUSTOMER_AUTHORITY: &str = "customer.basic";

/// The action tier an authority carries.
///
/// `write` implies `read`; `full` implies everything.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tier {
    Read,
    Write,
    Full,
}

impl Tier {
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Tier::Read => &[Action::Read],
            Tier::Write => &[Action::Read, Action::Write],
            Tier::Full => &[Action::Read, Action::Write, Action::Create, Action::Delete],
        }
    }
}

/// One row of the authority catalogue: name, tier, guarded resource kinds.
pub type CatalogEntry = (&'static str, Tier, &'static [ResourceKind]);

const PEOPLE: &[ResourceKind] = &[ResourceKind::Staff, ResourceKind::Customer, ResourceKind::Phone];

/// The standard authority catalogue.
const STANDARD_CATALOG: &[CatalogEntry] = &[
    ("admin.read", Tier::Read, ResourceKind::ALL),
    ("admin.write", Tier::Write, ResourceKind::ALL),
    ("admin.full", Tier::Full, ResourceKind::ALL),
    ("staff.read", Tier::Read, PEOPLE),
    ("staff.write", Tier::Write, PEOPLE),
    ("staff.full", Tier::Full, PEOPLE),
    ("hr.read", Tier::Read, PEOPLE),
    ("hr.write", Tier::Write, PEOPLE),
    ("hr.full", Tier::Full, PEOPLE),
    ("staff.self", Tier::Read, &[ResourceKind::Staff, ResourceKind::Phone]),
    (DEFAULT_CUSTOMER_AUTHORITY, Tier::Read, &[ResourceKind::Order]),
];

/// Immutable table mapping each authority name to its expanded
/// `(action, resource kind)` grants.
///
/// Built once, either explicitly (tests, custom policy) or through
/// [`PermissionModel::standard`], which guards the build behind a
/// process-wide once-cell so concurrent first accesses cannot race to
/// construct it twice.
#[derive(Debug)]
pub struct PermissionModel {
    grants: HashMap<String, HashSet<(Action, ResourceKind)>>,
}

impl PermissionModel {
    pub fn from_catalog(catalog: &[CatalogEntry]) -> Self {
        let mut grants: HashMap<String, HashSet<(Action, ResourceKind)>> = HashMap::new();
        for (name, tier, kinds) in catalog {
            let expanded = grants.entry((*name).to_string()).or_default();
            for action in tier.actions() {
                for kind in *kinds {
                    expanded.insert((*action, *kind));
                }
            }
        }
        Self { grants }
    }

    /// The shared standard model.
    pub fn standard() -> Arc<PermissionModel> {
        static STANDARD: OnceLock<Arc<PermissionModel>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(PermissionModel::from_catalog(STANDARD_CATALOG)))
            .clone()
    }

    pub fn knows(&self, authority: &str) -> bool {
        self.grants.contains_key(authority)
    }

    pub fn allows(&self, authority: &str, action: Action, kind: ResourceKind) -> bool {
        self.grants
            .get(authority)
            .is_some_and(|granted| granted.contains(&(action, kind)))
    }
}

/// Answers "may this principal perform `action` on `kind`".
#[derive(Clone)]
pub struct PermissionEvaluator {
    model: Arc<PermissionModel>,
}

impl PermissionEvaluator {
    pub fn new(model: Arc<PermissionModel>) -> Self {
        Self { model }
    }

    pub fn standard() -> Self {
        Self::new(PermissionModel::standard())
    }

    /// True iff any held authority grants the pair. The wildcard authority
    /// bypasses the table. An authority the table has never heard of is a
    /// configuration error: logged and denied.
    pub fn check(&self, principal: &Principal, kind: ResourceKind, action: Action) -> bool {
        for authority in &principal.authorities {
            if authority.is_wildcard() {
                return true;
            }
            if !self.model.knows(authority.as_str()) {
                tracing::error!(
                    authority = %authority,
                    subject = %principal.subject,
                    "authority missing from the permission table"
                );
                continue;
            }
            if self.model.allows(authority.as_str(), action, kind) {
                return true;
            }
        }
        tracing::debug!(
            subject = %principal.subject,
            %kind,
            %action,
            "permission denied"
        );
        false
    }
}
