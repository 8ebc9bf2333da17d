//! Logging setup for hosts and tests embedding the shape engine.
//!
//! The engine itself only emits `tracing` events: build summaries at `debug`,
//! lifecycle transitions at `info`, tree teardown at `trace`. Applications that
//! already install a subscriber need nothing from this module.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::LoggingError;

/// Installs a `stderr` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Errors (for example a subscriber that is already installed) are ignored, so
/// this is safe to call from every test.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Installs a `stderr` subscriber using an explicit filter directive such as
/// `"novade_window_shape=debug"`.
pub fn init_logging(directive: &str) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_new(directive).map_err(|e| LoggingError::Filter(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| LoggingError::Initialization(e.to_string()))
}
