//! Meridian - Modular Extension Framework
//!
//! A small in-process extension framework for host applications: command
//! dispatch, event-listener registration, configuration loading, and a
//! generic service lifecycle, layered over a host runtime the framework
//! does not control.
//!
//! ## Architecture
//!
//! - `config` - env settings + file-backed TOML config documents
//! - `cache` - concurrent expiring key-value store (lazy eviction)
//! - `cooldown` - per-subject, per-category timers with scheduled sweep
//! - `service` - service trait + ordered lifecycle registry
//! - `commands` - command registration facade over the host command table
//! - `events` - listener registration facade over the host event bus
//! - `runtime` - the `Framework` orchestrator and `Extension` trait
//! - `clock` - injectable time source (keeps TTL logic testable)
//! - `utils` - duration parsing/formatting helpers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meridian::cache::ExpiringCache;
//! use meridian::config::Settings;
//! use meridian::runtime::{Extension, Framework, HostContext};
//! use meridian::service::ServiceRegistry;
//!
//! struct MyExtension;
//!
//! impl Extension for MyExtension {
//!     fn initialize(&self, framework: &Framework) -> anyhow::Result<()> {
//!         let config = framework.config().load("settings")?;
//!         if config.get_bool_or("settings.debug", false) {
//!             tracing::info!("Debug mode enabled");
//!         }
//!         Ok(())
//!     }
//!
//!     fn register_services(&self, services: &ServiceRegistry) {
//!         services.register(Arc::new(ExpiringCache::<String>::new()));
//!     }
//! }
//!
//! # fn host_collaborators() -> (Arc<dyn meridian::commands::CommandTable>, Arc<dyn meridian::events::EventBus>) { unimplemented!() }
//! let (commands, events) = host_collaborators();
//! let framework = Framework::new(HostContext {
//!     settings: Settings::from_env(),
//!     commands,
//!     events,
//! });
//! framework.on_start(&MyExtension).unwrap();
//! // ... host runs ...
//! framework.on_stop(&MyExtension);
//! ```

pub mod cache;
pub mod clock;
pub mod commands;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod events;
pub mod logging;
pub mod runtime;
pub mod service;
pub mod utils;

pub use cache::ExpiringCache;
pub use cooldown::CooldownTracker;
pub use error::{ConfigError, Error};
pub use runtime::{Extension, Framework, HostContext};
pub use service::{Service, ServiceRegistry};
