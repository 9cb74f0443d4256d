//! Enumerated resource kinds and actions.
//!
//! The permission layer decides over `(Action, ResourceKind)` pairs. Both
//! sides are closed enums so a guarded call site cannot name a resource the
//! permission table has never heard of; strings coming off the wire go
//! through `FromStr`, which rejects unknown names instead of silently
//! matching nothing.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A kind of guarded domain resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Order,
    Task,
    Customer,
    Staff,
    Phone,
    Classifier,
    Authority,
}

impl ResourceKind {
    /// Every resource kind, in declaration order.
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Order,
        ResourceKind::Task,
        ResourceKind::Customer,
        ResourceKind::Staff,
        ResourceKind::Phone,
        ResourceKind::Classifier,
        ResourceKind::Authority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Order => "order",
            ResourceKind::Task => "task",
            ResourceKind::Customer => "customer",
            ResourceKind::Staff => "staff",
            ResourceKind::Phone => "phone",
            ResourceKind::Classifier => "classifier",
            ResourceKind::Authority => "authority",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(ResourceKind::Order),
            "task" => Ok(ResourceKind::Task),
            "customer" => Ok(ResourceKind::Customer),
            "staff" => Ok(ResourceKind::Staff),
            "phone" => Ok(ResourceKind::Phone),
            "classifier" => Ok(ResourceKind::Classifier),
            "authority" => Ok(ResourceKind::Authority),
            other => Err(DomainError::validation(format!(
                "unknown resource kind: {other}"
            ))),
        }
    }
}

/// A concrete access the caller wants to perform on a resource kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
    Create,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Create => "create",
            Action::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            "create" => Ok(Action::Create),
            "delete" => Ok(Action::Delete),
            other => Err(DomainError::validation(format!("unknown action: {other}"))),
        }
    }
}
