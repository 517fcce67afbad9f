//! Framework error taxonomy.
//!
//! Most "not found" conditions in the framework are expressed through
//! `Option`/`bool` returns rather than errors; the variants here cover the
//! cases callers may need to propagate with `?`.

use thiserror::Error;

/// Errors surfaced by the framework's own APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed call (empty key, empty name). Indicates a programmer
    /// error at the call site rather than runtime state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A second service of an already-registered kind.
    #[error("service already registered: {0}")]
    AlreadyRegistered(&'static str),

    /// An operation against an unregistered service kind.
    #[error("service not found: {0}")]
    NotFound(String),

    /// A service's start or stop reported failure.
    #[error("lifecycle failure in {service}: {reason}")]
    Lifecycle { service: String, reason: String },

    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from the file-backed configuration manager.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config name: {0}")]
    InvalidName(String),

    #[error("failed to read config '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}
