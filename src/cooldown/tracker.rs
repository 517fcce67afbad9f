//! Per-subject cooldown bookkeeping.

use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::clock::{Clock, system_clock};
use crate::service::Service;

/// Tracks (category, subject) cooldowns until their expiry instant.
///
/// `has`/`remaining` evict the single record they discover expired, keeping
/// hot-path checks O(1); [`sweep_expired`](Self::sweep_expired) is the
/// opt-in full pass that bounds growth from subjects who never re-check.
///
/// `S` is the subject identity (a user id, a connection id). Cloning the
/// tracker is cheap and shares the same records.
pub struct CooldownTracker<S>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
{
    categories: Arc<DashMap<String, DashMap<S, Instant>>>,
    running: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for CooldownTracker<S>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            categories: Arc::clone(&self.categories),
            running: Arc::clone(&self.running),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> CooldownTracker<S>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create a tracker backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create a tracker with an injected time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            categories: Arc::new(DashMap::new()),
            running: Arc::new(AtomicBool::new(false)),
            clock,
        }
    }

    /// Put `subject` on cooldown for `category` until `duration` from now.
    ///
    /// Silently no-ops on an empty category.
    pub fn set(&self, category: &str, subject: S, duration: Duration) {
        if category.is_empty() {
            return;
        }

        let expires_at = self.clock.now() + duration;
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(subject, expires_at);
    }

    /// Whether `subject` is currently on cooldown for `category`.
    ///
    /// An expired record is removed as a side effect.
    pub fn has(&self, category: &str, subject: &S) -> bool {
        let now = self.clock.now();

        let Some(subjects) = self.categories.get(category) else {
            return false;
        };

        let expires_at = match subjects.get(subject) {
            Some(at) => *at,
            None => return false,
        };

        // Inclusive boundary: exactly-at-expiry is off cooldown
        if now >= expires_at {
            subjects.remove(subject);
            return false;
        }

        true
    }

    /// Time left on the cooldown, or zero if absent or expired.
    ///
    /// Mirrors [`has`](Self::has): discovering an expired record removes it.
    pub fn remaining(&self, category: &str, subject: &S) -> Duration {
        let now = self.clock.now();

        let Some(subjects) = self.categories.get(category) else {
            return Duration::ZERO;
        };

        let expires_at = match subjects.get(subject) {
            Some(at) => *at,
            None => return Duration::ZERO,
        };

        if now >= expires_at {
            subjects.remove(subject);
            return Duration::ZERO;
        }

        expires_at - now
    }

    /// Remove a single (category, subject) record unconditionally.
    pub fn remove(&self, category: &str, subject: &S) {
        if let Some(subjects) = self.categories.get(category) {
            subjects.remove(subject);
        }
    }

    /// Drop every record for a category.
    pub fn clear(&self, category: &str) {
        self.categories.remove(category);
    }

    /// Drop all cooldown state.
    pub fn clear_all(&self) {
        self.categories.clear();
    }

    /// Full maintenance pass removing all stale records across every
    /// category. Returns the number of records removed.
    ///
    /// Intended for periodic invocation by an external scheduler (see
    /// [`spawn_sweeper`](Self::spawn_sweeper)) rather than being implied by
    /// every read.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        for subjects in self.categories.iter() {
            let before = subjects.len();
            subjects.retain(|_, expires_at| *expires_at > now);
            removed += before - subjects.len();
        }

        removed
    }

    /// Number of records currently held for `category`, including expired
    /// ones not yet swept.
    pub fn tracked_count(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map(|subjects| subjects.len())
            .unwrap_or(0)
    }

    /// Spawn a tokio task that calls [`sweep_expired`](Self::sweep_expired)
    /// every `interval`.
    ///
    /// The task runs until its handle is aborted or the runtime shuts down.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = tracker.sweep_expired();
                if removed > 0 {
                    debug!("Cooldown sweep removed {} stale records", removed);
                }
            }
        })
    }
}

impl<S> Default for CooldownTracker<S>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Service for CooldownTracker<S>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "cooldowns"
    }

    fn start(&self) -> anyhow::Result<()> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> anyhow::Result<()> {
        self.running.store(false, Ordering::Release);
        self.categories.clear();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl<S> std::fmt::Debug for CooldownTracker<S>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownTracker")
            .field("categories", &self.categories.len())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn tracker_with_manual_clock() -> (CooldownTracker<u64>, ManualClock) {
        let clock = ManualClock::new();
        let tracker = CooldownTracker::with_clock(Arc::new(clock.clone()));
        (tracker, clock)
    }

    #[test]
    fn set_then_has_and_remaining() {
        let (tracker, _clock) = tracker_with_manual_clock();
        tracker.set("attack", 7, Duration::from_secs(5));

        assert!(tracker.has("attack", &7));
        let remaining = tracker.remaining("attack", &7);
        assert!(remaining > Duration::ZERO);
        assert!(remaining <= Duration::from_secs(5));
    }

    #[test]
    fn cooldown_elapses() {
        let (tracker, clock) = tracker_with_manual_clock();
        tracker.set("attack", 7, Duration::from_secs(5));

        clock.advance(Duration::from_secs(5));
        // Inclusive boundary: exactly at expiry means off cooldown
        assert!(!tracker.has("attack", &7));
        assert_eq!(tracker.remaining("attack", &7), Duration::ZERO);
    }

    #[test]
    fn has_evicts_the_expired_record() {
        let (tracker, clock) = tracker_with_manual_clock();
        tracker.set("attack", 7, Duration::from_secs(1));

        clock.advance(Duration::from_secs(2));
        assert!(!tracker.has("attack", &7));
        assert_eq!(tracker.tracked_count("attack"), 0);
    }

    #[test]
    fn categories_are_independent() {
        let (tracker, _clock) = tracker_with_manual_clock();
        tracker.set("attack", 7, Duration::from_secs(5));
        tracker.set("teleport", 7, Duration::from_secs(5));

        tracker.remove("attack", &7);
        assert!(!tracker.has("attack", &7));
        assert!(tracker.has("teleport", &7));
    }

    #[test]
    fn empty_category_is_a_no_op() {
        let (tracker, _clock) = tracker_with_manual_clock();
        tracker.set("", 7, Duration::from_secs(5));
        assert!(!tracker.has("", &7));
    }

    #[test]
    fn clear_and_clear_all() {
        let (tracker, _clock) = tracker_with_manual_clock();
        tracker.set("a", 1, Duration::from_secs(5));
        tracker.set("b", 2, Duration::from_secs(5));

        tracker.clear("a");
        assert!(!tracker.has("a", &1));
        assert!(tracker.has("b", &2));

        tracker.clear_all();
        assert!(!tracker.has("b", &2));
    }

    #[test]
    fn sweep_removes_only_stale_records() {
        let (tracker, clock) = tracker_with_manual_clock();
        tracker.set("attack", 1, Duration::from_secs(1));
        tracker.set("attack", 2, Duration::from_secs(10));
        tracker.set("teleport", 3, Duration::from_secs(1));

        clock.advance(Duration::from_secs(2));
        let removed = tracker.sweep_expired();

        assert_eq!(removed, 2);
        assert_eq!(tracker.tracked_count("attack"), 1);
        assert!(tracker.has("attack", &2));
    }

    #[test]
    fn stop_clears_state() {
        let (tracker, _clock) = tracker_with_manual_clock();
        tracker.start().unwrap();
        tracker.set("attack", 7, Duration::from_secs(5));

        tracker.stop().unwrap();
        assert!(!tracker.is_running());
        assert!(!tracker.has("attack", &7));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_removes_stale_records() {
        let clock = ManualClock::new();
        let tracker: CooldownTracker<u64> =
            CooldownTracker::with_clock(Arc::new(clock.clone()));
        tracker.set("attack", 7, Duration::from_secs(1));

        let handle = tracker.spawn_sweeper(Duration::from_millis(50));

        clock.advance(Duration::from_secs(2));
        tokio::time::advance(Duration::from_millis(100)).await;
        for _ in 0..50 {
            if tracker.tracked_count("attack") == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(tracker.tracked_count("attack"), 0);
        handle.abort();
    }
}
