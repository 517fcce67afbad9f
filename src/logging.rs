//! Logging initialization.
//!
//! The framework itself only emits `tracing` events; hosts that do not
//! install their own subscriber can call [`init`] once at startup.

use tracing_subscriber::EnvFilter;

/// Initialize a global subscriber with sensible defaults.
///
/// If `RUST_LOG` is not set, defaults to "info" level for this crate.
///
/// # Panics
/// Panics if a global subscriber is already installed; use [`try_init`]
/// when that is a possibility (e.g. in tests).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("meridian=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Like [`init`], but ignores an already-installed subscriber.
pub fn try_init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("meridian=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
