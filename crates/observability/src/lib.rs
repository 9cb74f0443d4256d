//! `atelier-observability` — process-wide tracing/logging bootstrap.

pub mod tracing;

pub use tracing::init;
