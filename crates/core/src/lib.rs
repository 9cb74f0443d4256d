//! `atelier-core` — shared domain primitives.
//!
//! This crate contains **pure domain** vocabulary (no infrastructure concerns):
//! the error model shared by the lookup collaborators and the enumerated
//! resource kinds / actions the permission layer decides over.

pub mod error;
pub mod resource;

pub use error::{DomainError, DomainResult};
pub use resource::{Action, ResourceKind};
