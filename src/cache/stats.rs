//! Cache Statistics Module
//!
//! Tracks process-lifetime hit/miss counters and defines the two reporting
//! shapes: O(1) performance metrics from the counters, and full-scan storage
//! statistics computed by the store on demand.

use serde::Serialize;

// == Performance Counters ==
/// Cumulative hit/miss counters since construction.
///
/// Reset only by `clear`; never persisted across restarts.
#[derive(Debug, Clone, Default)]
pub struct PerfCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (absent, expired or undecodable)
    pub misses: u64,
    /// Total lookups observed (hits + misses)
    pub total_requests: u64,
}

impl PerfCounters {
    /// Creates counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_requests += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.total_requests += 1;
    }

    // == Reset ==
    /// Zeroes all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Hit Rate ==
    /// Hit rate as a percentage of total requests, 0.0 when idle.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64 * 100.0
        }
    }

    /// Miss rate as a percentage of total requests, 0.0 when idle.
    pub fn miss_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.misses as f64 / self.total_requests as f64 * 100.0
        }
    }

    /// Snapshot of the counters as a reporting payload.
    pub fn metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics {
            hits: self.hits,
            misses: self.misses,
            total_requests: self.total_requests,
            hit_rate: self.hit_rate(),
            miss_rate: self.miss_rate(),
        }
    }
}

// == Performance Metrics ==
/// Cumulative-since-start lookup metrics. O(1), no storage scan.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// Percentage of requests served from cache
    pub hit_rate: f64,
    /// Percentage of requests that fell through to the caller
    pub miss_rate: f64,
}

// == Cache Statistics ==
/// Storage-wide statistics recomputed by a full physical scan on every call.
///
/// `total_size` covers every physically present entry, expired ones included,
/// so it reflects true storage pressure between cleanup passes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStatistics {
    /// Number of physically present entries
    pub total_entries: usize,
    /// Sum of serialized payload sizes in bytes
    pub total_size: usize,
    /// Percentage of lifetime requests served from cache
    pub hit_rate: f64,
    /// Percentage of lifetime requests that missed
    pub miss_rate: f64,
    /// Creation timestamp of the oldest entry (Unix milliseconds)
    pub oldest_entry: Option<u64>,
    /// Creation timestamp of the newest entry (Unix milliseconds)
    pub newest_entry: Option<u64>,
}
