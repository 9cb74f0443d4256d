//! Credential verification, one verifier per identity kind.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use thiserror::Error;

use atelier_core::DomainError;

use crate::permissions::DEFAULT_CUSTOMER_AUTHORITY;
use crate::{
    Authority, CustomerDirectory, IdentityKind, Principal, StaffDirectory, VerificationCodes,
};

/// Request-scoped login credentials. Never stored.
#[derive(Clone)]
pub struct Credentials {
    pub login_key: String,
    pub secret: String,
    /// One-time verification code for first-login confirmation.
    pub code: Option<String>,
}

impl Credentials {
    pub fn new(login_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            login_key: login_key.into(),
            secret: secret.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    fn trimmed_code(&self) -> Option<&str> {
        self.code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

// Keep raw secrets out of logs.
impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("login_key", &self.login_key)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown identity or wrong secret. One variant for both so callers
    /// cannot probe which accounts exist.
    #[error("bad credentials")]
    BadCredentials,

    /// The identity exists but is disabled. Collapsed into
    /// [`AuthError::AuthenticationFailed`] by the router before anything
    /// leaves the process.
    #[error("identity is disabled")]
    Disabled,

    /// First-login verification code missing, unknown, or bound to another
    /// identity. Carries a still-valid replacement code when one is
    /// outstanding for the presented subject.
    #[error("verification code rejected")]
    InvalidCode { replacement: Option<String> },

    /// Malformed login request (empty login key or secret).
    #[error("missing credentials")]
    MissingCredentials,

    /// No verifier accepted the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A lookup collaborator failed.
    #[error("directory failure: {0}")]
    Directory(#[from] DomainError),
}

/// Verifies one identity kind.
///
/// `verify_subject` skips the secret comparison and must only be reached
/// after a token for the same subject has been cryptographically validated.
pub trait CredentialVerifier: Send + Sync {
    fn kind(&self) -> IdentityKind;

    fn verify_password(&self, credentials: &Credentials) -> Result<Principal, AuthError>;

    fn verify_subject(&self, login_key: &str) -> Result<Principal, AuthError>;
}

/// Hash a raw secret into a PHC argon2id string. For seeding and tests.
pub fn hash_secret(raw: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DomainError::config(format!("secret hashing failed: {e}")))
}

/// Constant-time comparison of a raw secret against a stored PHC hash.
fn secret_matches(raw: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("stored secret hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Staff
// ─────────────────────────────────────────────────────────────────────────────

pub struct StaffVerifier {
    directory: Arc<dyn StaffDirectory>,
}

impl StaffVerifier {
    pub fn new(directory: Arc<dyn StaffDirectory>) -> Self {
        Self { directory }
    }
}

impl CredentialVerifier for StaffVerifier {
    fn kind(&self) -> IdentityKind {
        IdentityKind::Staff
    }

    fn verify_password(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        if credentials.login_key.is_empty() || credentials.secret.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let Some(record) = self.directory.find_by_login_key(&credentials.login_key)? else {
            tracing::debug!(login_key = %credentials.login_key, "no staff identity");
            return Err(AuthError::BadCredentials);
        };
        if !record.enabled {
            tracing::debug!(login_key = %record.login_key, "staff identity disabled");
            return Err(AuthError::Disabled);
        }
        if !secret_matches(&credentials.secret, &record.password_hash) {
            return Err(AuthError::BadCredentials);
        }
        Ok(Principal::from_record(IdentityKind::Staff, &record))
    }

    fn verify_subject(&self, login_key: &str) -> Result<Principal, AuthError> {
        let Some(record) = self.directory.find_by_login_key(login_key)? else {
            return Err(AuthError::BadCredentials);
        };
        if !record.enabled {
            return Err(AuthError::Disabled);
        }
        Ok(Principal::from_record(IdentityKind::Staff, &record))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Customer
// ─────────────────────────────────────────────────────────────────────────────

pub struct CustomerVerifier {
    directory: Arc<dyn CustomerDirectory>,
    codes: Arc<dyn VerificationCodes>,
}

impl CustomerVerifier {
    pub fn new(directory: Arc<dyn CustomerDirectory>, codes: Arc<dyn VerificationCodes>) -> Self {
        Self { directory, codes }
    }

    /// A still-valid code outstanding for the subject, for the retry redirect.
    fn outstanding_code(&self, login_key: &str) -> Option<String> {
        match self.codes.find_for_subject(login_key) {
            Ok(record) => record.map(|r| r.code),
            Err(e) => {
                tracing::warn!("verification code lookup failed: {e}");
                None
            }
        }
    }

    /// Complete a first login: the presented code must exist and be bound to
    /// this identity. Consuming the code is what confirms the account; the
    /// baseline customer authority is granted on the spot.
    ///
    /// The caller has already proven the password, so surfacing the
    /// replacement code here does not hand it to a stranger.
    fn confirm_first_login(
        &self,
        record: &crate::IdentityRecord,
        code: &str,
    ) -> Result<Principal, AuthError> {
        match self.codes.find(code)? {
            Some(found) if found.login_key == record.login_key => {
                self.codes.consume(&found.code)?;
                tracing::debug!(login_key = %record.login_key, "first login confirmed");
                let mut principal = Principal::from_record(IdentityKind::Customer, record);
                if !principal.has_authority(DEFAULT_CUSTOMER_AUTHORITY) {
                    principal
                        .authorities
                        .push(Authority::new(DEFAULT_CUSTOMER_AUTHORITY));
                }
                Ok(principal)
            }
            Some(_) | None => Err(AuthError::InvalidCode {
                replacement: self.outstanding_code(&record.login_key),
            }),
        }
    }
}

impl CredentialVerifier for CustomerVerifier {
    fn kind(&self) -> IdentityKind {
        IdentityKind::Customer
    }

    fn verify_password(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        if credentials.login_key.is_empty() || credentials.secret.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let Some(record) = self.directory.find_by_login_key(&credentials.login_key)? else {
            tracing::debug!(login_key = %credentials.login_key, "no customer identity");
            return Err(AuthError::BadCredentials);
        };
        // Secret first: nothing about the account state (pending codes
        // included) is revealed to a caller who doesn't hold it.
        if !secret_matches(&credentials.secret, &record.password_hash) {
            return Err(AuthError::BadCredentials);
        }
        if let Some(code) = credentials.trimmed_code() {
            return self.confirm_first_login(&record, code);
        }
        if !record.enabled {
            // A pending identity with an outstanding code is the
            // distinguished first-login case, not a plain disabled account.
            return match self.outstanding_code(&record.login_key) {
                Some(replacement) => Err(AuthError::InvalidCode {
                    replacement: Some(replacement),
                }),
                None => Err(AuthError::Disabled),
            };
        }
        Ok(Principal::from_record(IdentityKind::Customer, &record))
    }

    fn verify_subject(&self, login_key: &str) -> Result<Principal, AuthError> {
        let Some(record) = self.directory.find_by_login_key(login_key)? else {
            return Err(AuthError::BadCredentials);
        };
        if !record.enabled {
            return Err(AuthError::Disabled);
        }
        Ok(Principal::from_record(IdentityKind::Customer, &record))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use atelier_core::DomainResult;

    use super::*;
    use crate::{CodeRecord, IdentityRecord};

    pub(crate) fn record(login_key: &str, secret: &str, enabled: bool) -> IdentityRecord {
        IdentityRecord {
            login_key: login_key.to_string(),
            phone: None,
            password_hash: hash_secret(secret).unwrap(),
            enabled,
            display_name: login_key.split('@').next().unwrap().to_string(),
            authorities: vec!["staff.read".to_string()],
        }
    }

    pub(crate) struct FakeStaff(pub HashMap<String, IdentityRecord>);

    impl StaffDirectory for FakeStaff {
        fn find_by_login_key(&self, login_key: &str) -> DomainResult<Option<IdentityRecord>> {
            Ok(self.0.get(login_key).cloned())
        }
    }

    pub(crate) struct FakeCustomers(pub Vec<IdentityRecord>);

    impl CustomerDirectory for FakeCustomers {
        fn find_by_login_key(&self, login_key: &str) -> DomainResult<Option<IdentityRecord>> {
            Ok(self
                .0
                .iter()
                .find(|r| r.login_key == login_key || r.phone.as_deref() == Some(login_key))
                .cloned())
        }
    }

    pub(crate) struct FakeCodes(pub Mutex<Vec<CodeRecord>>);

    impl FakeCodes {
        pub(crate) fn with(codes: &[(&str, &str)]) -> Self {
            Self(Mutex::new(
                codes
                    .iter()
                    .map(|(code, key)| CodeRecord {
                        code: code.to_string(),
                        login_key: key.to_string(),
                    })
                    .collect(),
            ))
        }
    }

    impl VerificationCodes for FakeCodes {
        fn find(&self, code: &str) -> DomainResult<Option<CodeRecord>> {
            Ok(self.0.lock().unwrap().iter().find(|r| r.code == code).cloned())
        }

        fn find_for_subject(&self, login_key: &str) -> DomainResult<Option<CodeRecord>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.login_key == login_key)
                .cloned())
        }

        fn consume(&self, code: &str) -> DomainResult<()> {
            self.0.lock().unwrap().retain(|r| r.code != code);
            Ok(())
        }
    }

    fn staff_verifier(records: &[IdentityRecord]) -> StaffVerifier {
        StaffVerifier::new(Arc::new(FakeStaff(
            records.iter().map(|r| (r.login_key.clone(), r.clone())).collect(),
        )))
    }

    fn customer_verifier(records: &[IdentityRecord], codes: FakeCodes) -> CustomerVerifier {
        CustomerVerifier::new(Arc::new(FakeCustomers(records.to_vec())), Arc::new(codes))
    }

    #[test]
    fn staff_verifies_with_correct_secret() {
        let verifier = staff_verifier(&[record("erin@atelier.example", "hunter2hunter2", true)]);

        let principal = verifier
            .verify_password(&Credentials::new("erin@atelier.example", "hunter2hunter2"))
            .unwrap();
        assert_eq!(principal.kind, IdentityKind::Staff);
        assert_eq!(principal.subject, "erin@atelier.example");
        assert!(principal.has_authority("staff.read"));
    }

    #[test]
    fn unknown_identity_and_wrong_secret_share_one_error_shape() {
        let verifier = staff_verifier(&[record("erin@atelier.example", "hunter2hunter2", true)]);

        let unknown = verifier
            .verify_password(&Credentials::new("nobody@atelier.example", "hunter2hunter2"))
            .unwrap_err();
        let wrong = verifier
            .verify_password(&Credentials::new("erin@atelier.example", "wrong-secret"))
            .unwrap_err();

        assert_eq!(unknown, AuthError::BadCredentials);
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn disabled_staff_fails_even_with_correct_secret() {
        let verifier = staff_verifier(&[record("erin@atelier.example", "hunter2hunter2", false)]);

        assert_eq!(
            verifier
                .verify_password(&Credentials::new("erin@atelier.example", "hunter2hunter2"))
                .unwrap_err(),
            AuthError::Disabled
        );
    }

    #[test]
    fn empty_credentials_are_rejected_up_front() {
        let verifier = staff_verifier(&[]);
        assert_eq!(
            verifier
                .verify_password(&Credentials::new("", ""))
                .unwrap_err(),
            AuthError::MissingCredentials
        );
    }

    #[test]
    fn customer_can_log_in_by_phone() {
        let mut rec = record("cora@customer.example", "correct-horse", true);
        rec.phone = Some("+15550100".to_string());
        let verifier = customer_verifier(&[rec], FakeCodes::with(&[]));

        let principal = verifier
            .verify_password(&Credentials::new("+15550100", "correct-horse"))
            .unwrap();
        assert_eq!(principal.kind, IdentityKind::Customer);
    }

    #[test]
    fn pending_customer_without_code_gets_replacement() {
        let rec = record("cora@customer.example", "correct-horse", false);
        let verifier = customer_verifier(
            &[rec],
            FakeCodes::with(&[("code-123", "cora@customer.example")]),
        );

        let err = verifier
            .verify_password(&Credentials::new("cora@customer.example", "correct-horse"))
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidCode {
                replacement: Some("code-123".to_string())
            }
        );
    }

    #[test]
    fn disabled_customer_with_no_outstanding_code_stays_disabled() {
        let rec = record("cora@customer.example", "correct-horse", false);
        let verifier = customer_verifier(&[rec], FakeCodes::with(&[]));

        assert_eq!(
            verifier
                .verify_password(&Credentials::new("cora@customer.example", "correct-horse"))
                .unwrap_err(),
            AuthError::Disabled
        );
    }

    #[test]
    fn wrong_code_reports_the_outstanding_replacement() {
        let rec = record("cora@customer.example", "correct-horse", false);
        let verifier = customer_verifier(
            &[rec],
            FakeCodes::with(&[("code-123", "cora@customer.example")]),
        );

        let err = verifier
            .verify_password(
                &Credentials::new("cora@customer.example", "correct-horse")
                    .with_code("code-unknown"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidCode {
                replacement: Some("code-123".to_string())
            }
        );
    }

    #[test]
    fn code_bound_to_another_identity_is_rejected() {
        let rec = record("cora@customer.example", "correct-horse", false);
        let verifier = customer_verifier(
            &[rec],
            FakeCodes::with(&[
                ("code-123", "cora@customer.example"),
                ("code-999", "other@customer.example"),
            ]),
        );

        let err = verifier
            .verify_password(
                &Credentials::new("cora@customer.example", "correct-horse").with_code("code-999"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidCode {
                replacement: Some("code-123".to_string())
            }
        );
    }

    #[test]
    fn matching_code_confirms_consumes_and_grants_default_authority() {
        let rec = record("cora@customer.example", "correct-horse", false);
        let codes = FakeCodes::with(&[("code-123", "cora@customer.example")]);
        let verifier = customer_verifier(&[rec], codes);

        let principal = verifier
            .verify_password(
                &Credentials::new("cora@customer.example", "correct-horse").with_code("code-123"),
            )
            .unwrap();

        assert!(principal.has_authority(DEFAULT_CUSTOMER_AUTHORITY));
        // Code is one-time: a second confirmation attempt must fail.
        let err = verifier
            .verify_password(
                &Credentials::new("cora@customer.example", "correct-horse").with_code("code-123"),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode { .. }));
    }

    #[test]
    fn wrong_secret_hides_the_code_flow_entirely() {
        let rec = record("cora@customer.example", "correct-horse", false);
        let verifier = customer_verifier(
            &[rec],
            FakeCodes::with(&[("code-123", "cora@customer.example")]),
        );

        let err = verifier
            .verify_password(
                &Credentials::new("cora@customer.example", "wrong-secret").with_code("code-123"),
            )
            .unwrap_err();
        assert_eq!(err, AuthError::BadCredentials);
    }

    #[test]
    fn verify_subject_skips_the_secret_but_not_the_enabled_check() {
        let verifier = staff_verifier(&[
            record("erin@atelier.example", "hunter2hunter2", true),
            record("gone@atelier.example", "hunter2hunter2", false),
        ]);

        assert!(verifier.verify_subject("erin@atelier.example").is_ok());
        assert_eq!(
            verifier.verify_subject("gone@atelier.example").unwrap_err(),
            AuthError::Disabled
        );
        assert_eq!(
            verifier.verify_subject("nobody@atelier.example").unwrap_err(),
            AuthError::BadCredentials
        );
    }
}
