//! Cache module - concurrent key-value store with per-entry TTL.
//!
//! ## Architecture
//!
//! - `ExpiringCache` - generic keyed store; each entry optionally carries
//!   an absolute expiry instant
//! - Eviction is lazy: stale entries are removed when a read discovers
//!   them, and `len`/`keys` sweep the whole store before reporting
//!
//! The store implements [`Service`](crate::service::Service) so it can be
//! owned by the service registry and cleared at shutdown.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use meridian::cache::ExpiringCache;
//!
//! let cache: ExpiringCache<String> = ExpiringCache::new();
//! cache.put("motd", "hello".to_string()).unwrap();
//! cache.put_with_ttl("session", "s1".to_string(), Duration::from_secs(300)).unwrap();
//!
//! assert_eq!(cache.get("motd").as_deref(), Some("hello"));
//! ```

mod entry;
mod store;

pub use store::ExpiringCache;
