use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Authority, KeyMaterial};

/// Wire claims carried by a session token.
///
/// `iat`/`exp` are unix seconds. `scope` is the authority names granted to
/// the subject at issuance time; it is informational on re-entry (the
/// authoritative set is re-derived from the directory on every request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub scope: Vec<String>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong audience/issuer, malformed or missing claims.
    ///
    /// Deliberately a single variant: callers must not be able to tell
    /// tampering apart from a policy mismatch.
    #[error("invalid token")]
    Invalid,

    /// Correctly signed but past its expiry.
    #[error("token expired")]
    Expired,
}

/// Encodes a verified identity into a signed token and validates/decodes
/// tokens presented back. Independent of how the identity was obtained.
pub struct TokenCodec {
    key: KeyMaterial,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(
        key: KeyMaterial,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            key,
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a signed token for an already-verified subject.
    pub fn encode(
        &self,
        subject: &str,
        authorities: &[Authority],
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            scope: authorities.iter().map(|a| a.as_str().to_string()).collect(),
        };
        encode(&Header::new(self.key.algorithm()), &claims, self.key.encoding()).map_err(|e| {
            tracing::trace!("token encoding failed: {e}");
            TokenError::Invalid
        })
    }

    /// Verify and decode a presented token.
    ///
    /// Signature is checked first; audience, issuer, a non-empty subject and
    /// a non-empty `scope` claim are all required. Every violation except
    /// expiry collapses into [`TokenError::Invalid`]. An expired token with
    /// a correct signature fails with [`TokenError::Expired`] so callers can
    /// choose to drop the session silently instead of rejecting outright.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.decode_with(token, self.validation())?;
        if claims.sub.trim().is_empty() || claims.scope.is_empty() {
            tracing::trace!("token rejected: empty subject or scope");
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    /// Classify expiry separately from signature validity.
    ///
    /// Still fails with [`TokenError::Invalid`] if the signature or the
    /// audience/issuer binding is wrong; only the expiry check is relaxed.
    pub fn is_expired(&self, token: &str, now: DateTime<Utc>) -> Result<bool, TokenError> {
        let mut validation = self.validation();
        validation.validate_exp = false;
        let claims = self.decode_with(token, validation)?;
        Ok(claims.exp <= now.timestamp())
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.key.algorithm());
        validation.leeway = 0;
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation
    }

    fn decode_with(
        &self,
        token: &str,
        validation: Validation,
    ) -> Result<SessionClaims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Invalid);
        }
        decode::<SessionClaims>(token, self.key.decoding(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    tracing::trace!("token parsing failed: {e}");
                    TokenError::Invalid
                }
            })
    }
}
