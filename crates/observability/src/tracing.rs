//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset: quiet dependencies, chatty
/// auth pipeline.
const DEFAULT_FILTER: &str = "info,atelier_auth=debug,atelier_api=debug";

/// Initialize structured logging for the process.
///
/// JSON lines with flattened event fields, filtered via `RUST_LOG`. Safe to
/// call more than once; later calls are no-ops (tests share one process).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_target(true)
        .try_init();
}
