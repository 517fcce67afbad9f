//! Cache entry with optional absolute expiry.

use std::time::Instant;

/// A stored value plus the instant it stops being valid.
///
/// `expires_at: None` means the entry never auto-evicts. An entry whose
/// expiry is strictly in the past is logically absent from the store even
/// while its memory representation survives until the next lazy sweep.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn permanent(value: V) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    pub fn expiring(value: V, expires_at: Instant) -> Self {
        Self {
            value,
            expires_at: Some(expires_at),
        }
    }

    /// Exclusive at the boundary: exactly-at-expiry is still fresh.
    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now > at)
    }
}
