//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures at the domain boundary
/// (validation, missing records). Lookup collaborators report their own
/// outages through `Storage`; callers decide how much of that to reveal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// The backing store could not serve the lookup.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Startup/process configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
