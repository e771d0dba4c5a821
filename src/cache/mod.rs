//! Cache Module
//!
//! Provides key-value caching over a storage adapter, with TTL expiration and
//! retention-scored eviction under size and count pressure.

mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{cache_key, is_entry_key, Namespace, KEY_PREFIX, METADATA_KEY};
pub use stats::{CacheStatistics, PerfCounters, PerformanceMetrics};
pub use store::{CacheMetadata, CacheStore, SetOutcome};

// == Public Constants ==
/// Persisted schema version recorded in the metadata record
pub const CACHE_VERSION: u32 = 1;

/// Cleanup targets this fraction of `max_entries` as post-eviction occupancy,
/// leaving headroom before the next pressure event
pub const LOW_WATER_RATIO: f64 = 0.8;
