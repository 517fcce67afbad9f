//! Cooldown module - per-subject, per-category action timers.
//!
//! ## Architecture
//!
//! - `CooldownTracker` - maps (category, subject) pairs to an expiry
//!   instant; a future expiry means "on cooldown"
//! - Reads evict lazily per record; a scheduled
//!   [`sweep_expired`](CooldownTracker::sweep_expired) pass bounds growth
//!   from subjects that never re-check
//!
//! Unlike the cache, size queries here never force a full sweep: cooldowns
//! are checked far more often than they are counted, so the hot path stays
//! O(1) and maintenance is opt-in.

mod tracker;

pub use tracker::CooldownTracker;
