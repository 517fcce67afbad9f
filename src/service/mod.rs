//! Service lifecycle system.
//!
//! ## Architecture
//!
//! - `Service` - a named unit with a start/stop lifecycle, reported through
//!   `Result` rather than panics so the registry's best-effort shutdown
//!   loop stays straightforward
//! - `ServiceRegistry` - insertion-ordered collection keyed by concrete
//!   service type; one live instance per kind
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use meridian::cache::ExpiringCache;
//! use meridian::service::ServiceRegistry;
//!
//! let registry = ServiceRegistry::new();
//! registry.register(Arc::new(ExpiringCache::<String>::new()));
//!
//! let cache = registry.get::<ExpiringCache<String>>().unwrap();
//! cache.put("k", "v".to_string()).unwrap();
//!
//! registry.stop_all();
//! ```

mod registry;

pub use registry::ServiceRegistry;

/// A lifecycle-bound framework component.
///
/// Identity is by concrete type: the registry admits one live instance per
/// implementing type. Services must tolerate `stop` being called after a
/// failed or absent `start`.
pub trait Service: Send + Sync + 'static {
    /// Human-readable name used in log output.
    fn name(&self) -> &str;

    /// Bring the service into its running state.
    fn start(&self) -> anyhow::Result<()>;

    /// Tear the service down, releasing any internal state.
    fn stop(&self) -> anyhow::Result<()>;

    /// Whether the service is currently running.
    fn is_running(&self) -> bool {
        false
    }
}
