//! Concurrent expiring key-value store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use super::entry::CacheEntry;
use crate::clock::{Clock, system_clock};
use crate::error::Error;
use crate::service::Service;

/// A thread-safe keyed store where each entry optionally carries a TTL.
///
/// Expired entries are evicted lazily: `get`/`contains` remove the entry
/// they discover stale, and `len`/`keys` perform a full sweep before
/// reporting. There is no background reaper and no size bound.
///
/// Cloning is cheap and shares the same underlying store.
pub struct ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    running: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl<V> Clone for ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            running: Arc::clone(&self.running),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a store backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create a store with an injected time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            running: Arc::new(AtomicBool::new(false)),
            clock,
        }
    }

    /// Store `value` under `key` with no expiry, overwriting any existing
    /// entry.
    ///
    /// Fails with [`Error::InvalidArgument`] if `key` is empty.
    pub fn put(&self, key: &str, value: V) -> Result<(), Error> {
        validate_key(key)?;
        self.entries
            .insert(key.to_string(), CacheEntry::permanent(value));
        Ok(())
    }

    /// Store `value` under `key`, expiring `ttl` from now.
    ///
    /// Fails with [`Error::InvalidArgument`] if `key` is empty.
    pub fn put_with_ttl(&self, key: &str, value: V, ttl: Duration) -> Result<(), Error> {
        validate_key(key)?;
        let expires_at = self.clock.now() + ttl;
        self.entries
            .insert(key.to_string(), CacheEntry::expiring(value, expires_at));
        Ok(())
    }

    /// Get the value for `key` if present and not expired.
    ///
    /// Discovering an expired entry removes it as a side effect. Unknown or
    /// empty keys return `None`; reads never error.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }

        // Stale: evict, but only if it hasn't been overwritten since the
        // read guard was dropped.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Get the cached value, or invoke `producer`, cache its result with no
    /// expiry, and return it.
    ///
    /// NOT single-flight: concurrent callers missing on the same key may
    /// each invoke `producer`, with the last writer winning. Fails with
    /// [`Error::InvalidArgument`] if `key` is empty.
    pub fn get_or_compute<F>(&self, key: &str, producer: F) -> Result<V, Error>
    where
        F: FnOnce() -> V,
    {
        validate_key(key)?;

        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = producer();
        self.entries
            .insert(key.to_string(), CacheEntry::permanent(value.clone()));
        Ok(value)
    }

    /// Fallible variant of [`get_or_compute`](Self::get_or_compute); a
    /// producer error is returned and nothing is cached.
    pub fn get_or_try_compute<F>(&self, key: &str, producer: F) -> anyhow::Result<V>
    where
        F: FnOnce() -> anyhow::Result<V>,
    {
        validate_key(key)?;

        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = producer()?;
        self.entries
            .insert(key.to_string(), CacheEntry::permanent(value.clone()));
        Ok(value)
    }

    /// Check whether a fresh entry exists for `key`.
    ///
    /// Same freshness semantics as [`get`](Self::get), including removal of
    /// an expired entry.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();

        {
            match self.entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return true,
                Some(_) => {}
                None => return false,
            }
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        false
    }

    /// Remove the entry for `key` unconditionally.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of live entries, after sweeping all expired ones.
    ///
    /// This is a full scan-and-evict pass, not a cheap accessor.
    pub fn len(&self) -> usize {
        self.sweep();
        self.entries.len()
    }

    /// Whether the store holds no live entries. Sweeps like [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live keys, after sweeping all expired entries.
    pub fn keys(&self) -> Vec<String> {
        self.sweep();
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    fn sweep(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

impl<V> Default for ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Service for ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "cache"
    }

    fn start(&self) -> anyhow::Result<()> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> anyhow::Result<()> {
        self.running.store(false, Ordering::Release);
        debug!("Clearing cache on stop ({} entries)", self.entries.len());
        self.entries.clear();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl<V> std::fmt::Debug for ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("entry_count", &self.entries.len())
            .field("running", &self.is_running())
            .finish()
    }
}

fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("cache key cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache_with_manual_clock<V>() -> (ExpiringCache<V>, ManualClock)
    where
        V: Clone + Send + Sync + 'static,
    {
        let clock = ManualClock::new();
        let cache = ExpiringCache::with_clock(Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn put_then_get_returns_value() {
        let cache = ExpiringCache::new();
        cache.put("x", 42).unwrap();
        assert_eq!(cache.get("x"), Some(42));
    }

    #[test]
    fn empty_key_is_rejected_for_writes() {
        let cache = ExpiringCache::new();
        assert!(matches!(
            cache.put("", 1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cache.put_with_ttl("", 1, Duration::from_secs(1)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_key_reads_are_not_found() {
        let cache: ExpiringCache<i32> = ExpiringCache::new();
        assert_eq!(cache.get(""), None);
        assert!(!cache.contains(""));
    }

    #[test]
    fn overwrite_replaces_value_and_ttl() {
        let (cache, clock) = cache_with_manual_clock();
        cache.put_with_ttl("k", 1, Duration::from_secs(5)).unwrap();
        cache.put("k", 2).unwrap();
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn entry_expires_strictly_after_ttl() {
        let (cache, clock) = cache_with_manual_clock();
        cache.put_with_ttl("y", 1, Duration::from_secs(5)).unwrap();

        clock.advance(Duration::from_secs(5));
        // Exactly at the boundary: still fresh
        assert_eq!(cache.get("y"), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("y"), None);
        // No resurrection
        assert_eq!(cache.get("y"), None);
    }

    #[test]
    fn contains_evicts_expired_entries() {
        let (cache, clock) = cache_with_manual_clock();
        cache.put_with_ttl("k", 1, Duration::from_secs(1)).unwrap();
        assert!(cache.contains("k"));

        clock.advance(Duration::from_secs(2));
        assert!(!cache.contains("k"));
        // The expired entry was removed, not just hidden
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn len_sweeps_expired_entries() {
        let (cache, clock) = cache_with_manual_clock();
        for i in 0..5 {
            cache.put(&format!("p{}", i), i).unwrap();
        }
        for i in 0..3 {
            cache
                .put_with_ttl(&format!("t{}", i), i, Duration::from_secs(1))
                .unwrap();
        }
        assert_eq!(cache.len(), 8);

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn keys_reports_only_live_entries() {
        let (cache, clock) = cache_with_manual_clock();
        cache.put("keep", 1).unwrap();
        cache
            .put_with_ttl("drop", 2, Duration::from_secs(1))
            .unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.keys(), vec!["keep".to_string()]);
    }

    #[test]
    fn get_or_compute_caches_on_miss() {
        let cache = ExpiringCache::new();
        let value = cache.get_or_compute("k", || 7).unwrap();
        assert_eq!(value, 7);
        assert_eq!(cache.get("k"), Some(7));
    }

    #[test]
    fn get_or_compute_skips_producer_on_hit() {
        let cache = ExpiringCache::new();
        cache.put("k", 1).unwrap();
        let value = cache
            .get_or_compute("k", || panic!("producer must not run"))
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn get_or_compute_result_has_no_expiry() {
        let (cache, clock) = cache_with_manual_clock();
        cache.get_or_compute("k", || 3).unwrap();
        clock.advance(Duration::from_secs(86400));
        assert_eq!(cache.get("k"), Some(3));
    }

    #[test]
    fn get_or_try_compute_does_not_cache_errors() {
        let cache: ExpiringCache<i32> = ExpiringCache::new();
        let result = cache.get_or_try_compute("k", || anyhow::bail!("boom"));
        assert!(result.is_err());
        assert_eq!(cache.get("k"), None);

        let value = cache.get_or_try_compute("k", || Ok(9)).unwrap();
        assert_eq!(value, 9);
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = ExpiringCache::new();
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();

        cache.invalidate("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn stop_clears_state() {
        let cache = ExpiringCache::new();
        cache.start().unwrap();
        assert!(cache.is_running());

        cache.put("k", 1).unwrap();
        cache.stop().unwrap();
        assert!(!cache.is_running());
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn concurrent_access_is_safe() {
        let cache: ExpiringCache<u64> = ExpiringCache::new();
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100u64 {
                    let key = format!("k{}", i % 10);
                    cache.put(&key, t * 1000 + i).unwrap();
                    cache.get(&key);
                    cache.contains(&key);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn real_clock_scenario() {
        let cache = ExpiringCache::new();
        cache.put("x", 42).unwrap();
        assert_eq!(cache.get("x"), Some(42));

        cache
            .put_with_ttl("y", 1, Duration::from_millis(100))
            .unwrap();
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(cache.get("y"), None);
        assert_eq!(cache.len(), 1);
    }
}
