//! In-memory identity directory for dev wiring and tests.
//!
//! Implements all three lookup contracts behind mutex-guarded maps. Real
//! deployments plug database-backed implementations in instead; the auth
//! pipeline only sees the traits.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use atelier_auth::permissions::DEFAULT_CUSTOMER_AUTHORITY;
use atelier_auth::{verifier, CodeRecord, CustomerDirectory, IdentityRecord, StaffDirectory, VerificationCodes};
use atelier_core::{DomainError, DomainResult};

/// Build an identity record from a raw secret (hashes it on the spot).
pub fn identity_record(
    login_key: &str,
    raw_secret: &str,
    enabled: bool,
    authorities: &[&str],
) -> Result<IdentityRecord, DomainError> {
    Ok(IdentityRecord {
        login_key: login_key.to_string(),
        phone: None,
        password_hash: verifier::hash_secret(raw_secret)?,
        enabled,
        display_name: login_key.split('@').next().unwrap_or(login_key).to_string(),
        authorities: authorities.iter().map(|a| a.to_string()).collect(),
    })
}

#[derive(Default)]
pub struct InMemoryIdentities {
    staff: Mutex<HashMap<String, IdentityRecord>>,
    customers: Mutex<Vec<IdentityRecord>>,
    codes: Mutex<Vec<CodeRecord>>,
}

impl InMemoryIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_staff(&self, record: IdentityRecord) {
        self.staff
            .lock()
            .expect("staff map poisoned")
            .insert(record.login_key.clone(), record);
    }

    pub fn insert_customer(&self, record: IdentityRecord) {
        self.customers.lock().expect("customer list poisoned").push(record);
    }

    /// Issue a fresh one-time verification code for a pending customer.
    pub fn issue_code(&self, login_key: &str) -> String {
        let code = Uuid::new_v4().to_string();
        self.codes.lock().expect("code list poisoned").push(CodeRecord {
            code: code.clone(),
            login_key: login_key.to_string(),
        });
        code
    }
}

impl StaffDirectory for InMemoryIdentities {
    fn find_by_login_key(&self, login_key: &str) -> DomainResult<Option<IdentityRecord>> {
        Ok(self
            .staff
            .lock()
            .map_err(|_| DomainError::storage("staff map poisoned"))?
            .get(login_key)
            .cloned())
    }
}

impl CustomerDirectory for InMemoryIdentities {
    fn find_by_login_key(&self, login_key: &str) -> DomainResult<Option<IdentityRecord>> {
        Ok(self
            .customers
            .lock()
            .map_err(|_| DomainError::storage("customer list poisoned"))?
            .iter()
            .find(|r| r.login_key == login_key || r.phone.as_deref() == Some(login_key))
            .cloned())
    }
}

impl VerificationCodes for InMemoryIdentities {
    fn find(&self, code: &str) -> DomainResult<Option<CodeRecord>> {
        Ok(self
            .codes
            .lock()
            .map_err(|_| DomainError::storage("code list poisoned"))?
            .iter()
            .find(|r| r.code == code)
            .cloned())
    }

    fn find_for_subject(&self, login_key: &str) -> DomainResult<Option<CodeRecord>> {
        Ok(self
            .codes
            .lock()
            .map_err(|_| DomainError::storage("code list poisoned"))?
            .iter()
            .find(|r| r.login_key == login_key)
            .cloned())
    }

    fn consume(&self, code: &str) -> DomainResult<()> {
        let mut codes = self
            .codes
            .lock()
            .map_err(|_| DomainError::storage("code list poisoned"))?;
        let Some(position) = codes.iter().position(|r| r.code == code) else {
            return Err(DomainError::NotFound);
        };
        let consumed = codes.remove(position);
        drop(codes);

        // Consuming a code confirms the pending customer: the store owner
        // enables the record and grants the baseline authority, so later
        // session re-derivations see the confirmed state.
        let mut customers = self
            .customers
            .lock()
            .map_err(|_| DomainError::storage("customer list poisoned"))?;
        if let Some(record) = customers.iter_mut().find(|r| r.login_key == consumed.login_key) {
            record.enabled = true;
            if !record.authorities.iter().any(|a| a == DEFAULT_CUSTOMER_AUTHORITY) {
                record.authorities.push(DEFAULT_CUSTOMER_AUTHORITY.to_string());
            }
        }
        Ok(())
    }
}
