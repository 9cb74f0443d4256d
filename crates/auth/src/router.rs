use std::sync::Arc;

use crate::{AuthError, CredentialVerifier, Credentials, Principal};

/// Ordered chain of credential verifiers sharing one login endpoint.
///
/// Ordering is fixed at construction and identical for both operations, so
/// an identity authenticated through one verifier re-derives through the
/// same verifier on every subsequent request. Staff and customer login-key
/// spaces are assumed disjoint.
pub struct AuthenticationRouter {
    verifiers: Vec<Arc<dyn CredentialVerifier>>,
}

impl AuthenticationRouter {
    pub fn new(verifiers: Vec<Arc<dyn CredentialVerifier>>) -> Self {
        Self { verifiers }
    }

    /// Primary login: first verifier to accept the credentials wins.
    ///
    /// A rejected verification code aborts the chain: it is a verdict on
    /// the customer first-login flow, not a reason to probe other identity
    /// kinds. Exhausting the chain yields one aggregated failure that does
    /// not reveal which verifier came closest.
    pub fn login(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        for verifier in &self.verifiers {
            match verifier.verify_password(credentials) {
                Ok(principal) => {
                    tracing::debug!(
                        subject = %principal.subject,
                        kind = %principal.kind,
                        "login verified"
                    );
                    return Ok(principal);
                }
                Err(err @ AuthError::InvalidCode { .. }) => return Err(err),
                Err(err) => {
                    tracing::trace!(kind = %verifier.kind(), "verifier declined: {err}");
                }
            }
        }
        Err(AuthError::AuthenticationFailed)
    }

    /// Rebuild a principal from a subject whose secret has already been
    /// proven by a validated token. Same ordered fallback as [`login`].
    ///
    /// [`login`]: AuthenticationRouter::login
    pub fn rederive_by_subject(&self, login_key: &str) -> Result<Principal, AuthError> {
        if login_key.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        for verifier in &self.verifiers {
            match verifier.verify_subject(login_key) {
                Ok(principal) => return Ok(principal),
                Err(err) => {
                    tracing::trace!(kind = %verifier.kind(), "subject lookup declined: {err}");
                }
            }
        }
        Err(AuthError::AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::verifier::tests::{record, FakeCodes, FakeCustomers, FakeStaff};
    use crate::verifier::{CustomerVerifier, StaffVerifier};
    use crate::IdentityKind;

    fn router(
        staff: Vec<crate::IdentityRecord>,
        customers: Vec<crate::IdentityRecord>,
        codes: Vec<(&str, &str)>,
    ) -> AuthenticationRouter {
        let staff_dir = Arc::new(FakeStaff(
            staff.into_iter().map(|r| (r.login_key.clone(), r)).collect::<HashMap<_, _>>(),
        ));
        let customer_dir = Arc::new(FakeCustomers(customers));
        let code_store = Arc::new(FakeCodes::with(&codes));
        AuthenticationRouter::new(vec![
            Arc::new(StaffVerifier::new(staff_dir)),
            Arc::new(CustomerVerifier::new(customer_dir, code_store)),
        ])
    }

    fn standard_router() -> AuthenticationRouter {
        router(
            vec![record("erin@atelier.example", "hunter2hunter2", true)],
            vec![record("cora@customer.example", "correct-horse", true)],
            vec![],
        )
    }

    #[test]
    fn staff_key_resolves_through_the_staff_verifier() {
        let principal = standard_router()
            .login(&Credentials::new("erin@atelier.example", "hunter2hunter2"))
            .unwrap();
        assert_eq!(principal.kind, IdentityKind::Staff);
    }

    #[test]
    fn customer_key_falls_through_to_the_customer_verifier() {
        let principal = standard_router()
            .login(&Credentials::new("cora@customer.example", "correct-horse"))
            .unwrap();
        assert_eq!(principal.kind, IdentityKind::Customer);
    }

    #[test]
    fn exhausted_chain_reports_one_aggregate_failure() {
        let err = standard_router()
            .login(&Credentials::new("nobody@atelier.example", "whatever-secret"))
            .unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);

        // A wrong secret for an existing identity looks exactly the same.
        let err = standard_router()
            .login(&Credentials::new("erin@atelier.example", "wrong-secret"))
            .unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[test]
    fn rejected_code_aborts_the_chain() {
        let router = router(
            vec![],
            vec![record("cora@customer.example", "correct-horse", false)],
            vec![("code-123", "cora@customer.example")],
        );

        let err = router
            .login(
                &Credentials::new("cora@customer.example", "correct-horse").with_code("code-bad"),
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
    fn rederive_uses_the_same_verifier_as_login() {
        let router = standard_router();

        let at_login = router
            .login(&Credentials::new("cora@customer.example", "correct-horse"))
            .unwrap();
        let restored = router.rederive_by_subject("cora@customer.example").unwrap();

        assert_eq!(at_login.kind, restored.kind);
        assert_eq!(at_login.subject, restored.subject);
        assert_eq!(at_login.authorities, restored.authorities);
    }

    #[test]
    fn rederive_fails_for_unknown_or_disabled_subjects() {
        let router = router(
            vec![record("gone@atelier.example", "hunter2hunter2", false)],
            vec![],
            vec![],
        );

        assert_eq!(
            router.rederive_by_subject("gone@atelier.example").unwrap_err(),
            AuthError::AuthenticationFailed
        );
        assert_eq!(
            router.rederive_by_subject("nobody@atelier.example").unwrap_err(),
            AuthError::AuthenticationFailed
        );
    }

    #[test]
    fn a_failing_directory_does_not_poison_the_chain() {
        struct BrokenStaff;
        impl crate::StaffDirectory for BrokenStaff {
            fn find_by_login_key(
                &self,
                _login_key: &str,
            ) -> atelier_core::DomainResult<Option<crate::IdentityRecord>> {
                Err(atelier_core::DomainError::storage("staff store down"))
            }
        }

        let customer_dir = Arc::new(FakeCustomers(vec![record(
            "cora@customer.example",
            "correct-horse",
            true,
        )]));
        let codes = Arc::new(FakeCodes(Mutex::new(Vec::new())));
        let router = AuthenticationRouter::new(vec![
            Arc::new(StaffVerifier::new(Arc::new(BrokenStaff))),
            Arc::new(CustomerVerifier::new(customer_dir, codes)),
        ]);

        let principal = router
            .login(&Credentials::new("cora@customer.example", "correct-horse"))
            .unwrap();
        assert_eq!(principal.kind, IdentityKind::Customer);
    }
}
