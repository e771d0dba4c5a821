//! Cache Entry Module
//!
//! Defines the persisted envelope around a cached payload: creation and
//! expiry instants, per-entry usage metadata, and the retention score used
//! by eviction.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

// == Cache Entry ==
/// A cached payload with its lifecycle metadata, persisted as one JSON record.
///
/// Invariants: `expiry > timestamp`, `access_count >= 1`,
/// `last_accessed >= timestamp`. An entry is live iff `now < expiry`;
/// expired entries are treated as absent by every read path even while they
/// still physically occupy storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,
    /// Creation timestamp (Unix milliseconds), immutable after creation
    pub timestamp: u64,
    /// Absolute expiration instant (Unix milliseconds)
    pub expiry: u64,
    /// Number of hits, starting at 1 on creation
    pub access_count: u64,
    /// Timestamp of the most recent hit (Unix milliseconds)
    pub last_accessed: u64,
    /// Serialized payload size in bytes, computed once at creation
    pub size: usize,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry expiring `ttl_ms` after `now`.
    ///
    /// A zero TTL is clamped to one millisecond so `expiry > timestamp`
    /// always holds; an overlong TTL saturates at the end of time rather
    /// than wrapping into the past.
    pub fn new(data: T, size: usize, ttl_ms: u64, now: u64) -> Self {
        Self {
            data,
            timestamp: now,
            expiry: now.saturating_add(ttl_ms.max(1)),
            access_count: 1,
            last_accessed: now,
            size,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: expired when `now >= expiry`, so an entry whose
    /// TTL has fully elapsed is immediately treated as absent.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expiry
    }

    // == Record Access ==
    /// Records a hit: bumps the access count and refreshes `last_accessed`.
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed = now;
    }

    // == Retention Score ==
    /// Computes the eviction-ranking score at `now`. Higher is more valuable.
    ///
    /// `score = access_count / (age_days + 1) / (hours_since_last_access + 1)`
    ///
    /// Frequency is decayed by both total age and staleness, so a ticker that
    /// was hot once but has gone cold loses protection within hours, while a
    /// steadily re-queried one keeps it. Fresh entries (age near zero) start
    /// protected and lose that protection if unused.
    pub fn retention_score(&self, now: u64) -> f64 {
        let age_days = now.saturating_sub(self.timestamp) as f64 / MS_PER_DAY;
        let hours_stale = now.saturating_sub(self.last_accessed) as f64 / MS_PER_HOUR;
        self.access_count as f64 / (age_days + 1.0) / (hours_stale + 1.0)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
