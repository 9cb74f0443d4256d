//! `atelier-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. The HTTP
//! layer hands it credentials or a token string; the persistence layer is
//! reached only through the narrow lookup contracts in [`directory`].

pub mod authority;
pub mod directory;
pub mod key;
pub mod permissions;
pub mod principal;
pub mod router;
pub mod token;
pub mod verifier;

pub use authority::Authority;
pub use directory::{CodeRecord, CustomerDirectory, IdentityRecord, StaffDirectory, VerificationCodes};
pub use key::{KeyMaterial, KeyMaterialError};
pub use permissions::{PermissionEvaluator, PermissionModel, Tier};
pub use principal::{IdentityKind, Principal};
pub use router::AuthenticationRouter;
pub use token::{SessionClaims, TokenCodec, TokenError};
pub use verifier::{AuthError, Credentials, CredentialVerifier, CustomerVerifier, StaffVerifier};
