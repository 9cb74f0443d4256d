//! Narrow lookup contracts onto the persistence layer.
//!
//! The auth pipeline never persists identities; it reads them through these
//! traits and nothing else. Implementations live with the storage layer (or
//! in-memory doubles for tests and dev wiring).

use atelier_core::DomainResult;

/// An identity record as the directory stores it.
///
/// `password_hash` is a PHC-format string (argon2id). `authorities` are the
/// granted authority names as stored; the verifier turns them into
/// [`crate::Authority`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Primary login key (email).
    pub login_key: String,
    /// Optional secondary login key (customers may log in by phone).
    pub phone: Option<String>,
    pub password_hash: String,
    pub enabled: bool,
    pub display_name: String,
    pub authorities: Vec<String>,
}

/// Lookup contract for staff identities.
pub trait StaffDirectory: Send + Sync {
    fn find_by_login_key(&self, login_key: &str) -> DomainResult<Option<IdentityRecord>>;
}

/// Lookup contract for customer identities.
///
/// Implementations match the key against the email and any registered phone
/// number.
pub trait CustomerDirectory: Send + Sync {
    fn find_by_login_key(&self, login_key: &str) -> DomainResult<Option<IdentityRecord>>;
}

/// A one-time verification code bound to a pending customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub code: String,
    /// Login key of the pending customer the code was issued for.
    pub login_key: String,
}

/// Store of one-time first-login verification codes.
///
/// `consume` is the only mutation the auth pipeline ever requests; the store
/// owner reacts to it by enabling the confirmed identity.
pub trait VerificationCodes: Send + Sync {
    fn find(&self, code: &str) -> DomainResult<Option<CodeRecord>>;

    /// A still-valid code outstanding for the given subject, if any.
    fn find_for_subject(&self, login_key: &str) -> DomainResult<Option<CodeRecord>>;

    fn consume(&self, code: &str) -> DomainResult<()>;
}
