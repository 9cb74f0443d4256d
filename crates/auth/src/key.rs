use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use thiserror::Error;

/// Minimum length for the symmetric signing secret, in bytes.
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    #[error("signing secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
}

/// The process-wide signing key and algorithm.
///
/// Built once from the configured secret at startup and never mutated;
/// concurrent readers need no synchronization. Rotation is not supported:
/// replacing the key means restarting the process.
pub struct KeyMaterial {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyMaterial {
    /// Build HS256 key material from a shared secret.
    pub fn hs256(secret: &[u8]) -> Result<Self, KeyMaterialError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(KeyMaterialError::SecretTooShort);
        }
        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

// EncodingKey/DecodingKey hold secret bytes; keep them out of Debug output.
impl core::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
