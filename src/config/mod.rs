//! Configuration module.
//!
//! Two layers, both explicit about where their data comes from:
//!
//! - [`Settings`] - framework-level knobs from environment variables
//! - [`ConfigManager`] / [`ConfigDocument`] - host-application config
//!   documents loaded from TOML files under an injected data directory

mod document;
mod manager;
mod settings;

pub use document::ConfigDocument;
pub use manager::ConfigManager;
pub use settings::Settings;
