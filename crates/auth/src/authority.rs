use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A named grant attached to an identity.
///
/// Authorities are opaque strings (e.g. "staff.read") at this layer; the
/// [`crate::PermissionModel`] expands them into concrete action/resource
/// pairs. The special wildcard authority `"*"` bypasses the table entirely
/// and is reserved for superuser accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(Cow<'static, str>);

impl Authority {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn wildcard() -> Self {
        Self(Cow::Borrowed("*"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Authority {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<String> for Authority {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
