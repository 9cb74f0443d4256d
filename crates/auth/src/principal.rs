use serde::{Deserialize, Serialize};

use crate::{Authority, IdentityRecord};

/// Which kind of identity authenticated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Staff,
    Customer,
}

impl core::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IdentityKind::Staff => f.write_str("staff"),
            IdentityKind::Customer => f.write_str("customer"),
        }
    }
}

/// The resolved, request-scoped representation of an authenticated identity.
///
/// Created by a verifier after the credentials (or a previously-minted token)
/// have been proven, installed into the request context, and discarded when
/// the request ends. Never construct one from an unverified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub kind: IdentityKind,
    pub display_name: String,
    pub authorities: Vec<Authority>,
}

impl Principal {
    pub(crate) fn from_record(kind: IdentityKind, record: &IdentityRecord) -> Self {
        Self {
            subject: record.login_key.clone(),
            kind,
            display_name: record.display_name.clone(),
            authorities: record
                .authorities
                .iter()
                .map(|name| Authority::from(name.clone()))
                .collect(),
        }
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == name)
    }
}
