//! Cache Store Module
//!
//! Main cache engine over a storage adapter: entry encoding/decoding, TTL
//! expiration, admission control and retention-scored cleanup.
//!
//! Failure semantics: storage and serialization failures never escape as
//! errors. Reads degrade to a miss, writes to a rejected set, and the caller
//! keeps working with un-cached data.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{
    cache_key, current_timestamp_ms, is_entry_key, CacheEntry, CacheStatistics, Namespace,
    PerfCounters, PerformanceMetrics, CACHE_VERSION, LOW_WATER_RATIO, METADATA_KEY,
};
use crate::config::CacheConfig;
use crate::storage::StorageAdapter;

/// Entry envelope with the payload left as raw JSON, used whenever the store
/// must read metadata without knowing the payload type (scans, cleanup).
type RawEntry = CacheEntry<Value>;

// == Set Outcome ==
/// Result of a `set`: the entry was written, or admission declined it.
///
/// Rejection is a soft outcome, never an error; the caller keeps using the
/// un-cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Entry was persisted
    Stored,
    /// Admission control or a storage failure skipped the write
    Rejected,
}

impl SetOutcome {
    /// Returns true if the entry was persisted.
    pub fn is_stored(&self) -> bool {
        matches!(self, SetOutcome::Stored)
    }
}

// == Cache Metadata ==
/// Store-wide metadata persisted under a fixed key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Persisted schema version; entry encoding is opaque across versions
    pub version: u32,
    /// When this store was first initialized
    pub created: DateTime<Utc>,
    /// When the last cleanup pass finished
    pub last_cleanup: DateTime<Utc>,
}

impl CacheMetadata {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: CACHE_VERSION,
            created: now,
            last_cleanup: now,
        }
    }
}

// == Cache Store ==
/// Cache engine over a storage adapter, with TTL expiration and
/// retention-scored eviction under size and count pressure.
#[derive(Debug)]
pub struct CacheStore<S: StorageAdapter> {
    /// Physical key-value store
    storage: S,
    /// Process-lifetime hit/miss counters
    counters: PerfCounters,
    /// Aggregate serialized payload budget in bytes
    max_cache_size: usize,
    /// Maximum number of entries
    max_entries: usize,
    /// TTL applied when the caller does not pass one
    default_ttl_ms: u64,
}

impl<S: StorageAdapter> CacheStore<S> {
    // == Constructor ==
    /// Creates a store over `storage` with limits taken from `config`.
    ///
    /// Writes the metadata record on first use of a storage area. A failed
    /// metadata write is logged and ignored; nothing else depends on it.
    pub fn new(storage: S, config: &CacheConfig) -> Self {
        let mut store = Self {
            storage,
            counters: PerfCounters::new(),
            max_cache_size: config.max_cache_size,
            max_entries: config.max_entries,
            default_ttl_ms: config.default_ttl_ms,
        };

        if store.storage.get_item(METADATA_KEY).is_none() {
            store.write_metadata(&CacheMetadata::new(Utc::now()));
        }
        store
    }

    // == Get ==
    /// Retrieves a live payload for `(namespace, identifier)`.
    ///
    /// Counts a miss and returns None when the record is absent, expired or
    /// undecodable; an expired record is physically removed on detection. On
    /// a hit the access metadata is bumped and persisted before the payload
    /// is returned.
    pub fn get<T: DeserializeOwned>(&mut self, namespace: Namespace, identifier: &str) -> Option<T> {
        self.get_at(namespace, identifier, current_timestamp_ms())
    }

    /// `get` against an explicit clock, for deterministic expiry in tests.
    pub fn get_at<T: DeserializeOwned>(
        &mut self,
        namespace: Namespace,
        identifier: &str,
        now: u64,
    ) -> Option<T> {
        let key = cache_key(namespace, identifier);

        let raw = match self.storage.get_item(&key) {
            Some(raw) => raw,
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        // Undecodable records count as misses and stay put; cleanup purges them
        let mut entry: RawEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Undecodable cache record under {}: {}", key, err);
                self.counters.record_miss();
                return None;
            }
        };

        if entry.is_expired_at(now) {
            self.storage.remove_item(&key);
            self.counters.record_miss();
            debug!("Removed expired entry {}", key);
            return None;
        }

        entry.record_access(now);
        self.persist_entry(&key, &entry);

        match serde_json::from_value(entry.data) {
            Ok(data) => {
                self.counters.record_hit();
                Some(data)
            }
            Err(err) => {
                warn!("Payload under {} does not match requested type: {}", key, err);
                self.counters.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a payload under `(namespace, identifier)` with an optional TTL
    /// in milliseconds (defaulted from configuration).
    ///
    /// Admission control may decline the write under size or count pressure
    /// after a cleanup attempt; serialization and quota failures are also
    /// soft. Never an error.
    pub fn set<T: Serialize>(
        &mut self,
        namespace: Namespace,
        identifier: &str,
        data: &T,
        ttl_ms: Option<u64>,
    ) -> SetOutcome {
        self.set_at(namespace, identifier, data, ttl_ms, current_timestamp_ms())
    }

    /// `set` against an explicit clock.
    pub fn set_at<T: Serialize>(
        &mut self,
        namespace: Namespace,
        identifier: &str,
        data: &T,
        ttl_ms: Option<u64>,
        now: u64,
    ) -> SetOutcome {
        let key = cache_key(namespace, identifier);

        let payload = match serde_json::to_value(data) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Payload for {} failed to serialize: {}", key, err);
                return SetOutcome::Rejected;
            }
        };
        // Size is the serialized payload, computed once at creation
        let size = payload.to_string().len();

        if !self.should_cache_at(size, now) {
            debug!("Admission declined for {} ({} bytes)", key, size);
            return SetOutcome::Rejected;
        }

        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms);
        let entry = CacheEntry::new(payload, size, ttl, now);

        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("Entry envelope for {} failed to encode: {}", key, err);
                return SetOutcome::Rejected;
            }
        };

        match self.storage.set_item(&key, &encoded) {
            Ok(()) => SetOutcome::Stored,
            Err(err) => {
                warn!("Cache write for {} rejected: {}", key, err);
                SetOutcome::Rejected
            }
        }
    }

    // == Admission Control ==
    /// Decides whether a candidate entry of `candidate_size` bytes may be
    /// written.
    ///
    /// Over the size budget: run a cleanup pass and re-check; still over,
    /// reject. Same for the entry-count ceiling. Otherwise accept.
    pub fn should_cache_at(&mut self, candidate_size: usize, now: u64) -> bool {
        let (size, count) = self.scan_pressure();
        let mut count = count;

        if size + candidate_size > self.max_cache_size {
            self.cleanup_at(now);
            let (size, recount) = self.scan_pressure();
            count = recount;
            if size + candidate_size > self.max_cache_size {
                return false;
            }
        }

        if count >= self.max_entries {
            self.cleanup_at(now);
            let (_, count) = self.scan_pressure();
            if count >= self.max_entries {
                return false;
            }
        }

        true
    }

    // == Cleanup ==
    /// Removes expired and undecodable records, then evicts the
    /// lowest-retention-score live entries until occupancy is back at the
    /// low-water mark. Returns the number of records removed.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_at(current_timestamp_ms())
    }

    /// `cleanup` against an explicit clock.
    pub fn cleanup_at(&mut self, now: u64) -> usize {
        let mut removed = 0;
        let mut live: Vec<(String, RawEntry)> = Vec::new();

        for (key, entry) in self.load_entries() {
            match entry {
                None => {
                    warn!("Purging undecodable cache record {}", key);
                    self.storage.remove_item(&key);
                    removed += 1;
                }
                Some(entry) if entry.is_expired_at(now) => {
                    self.storage.remove_item(&key);
                    removed += 1;
                }
                Some(entry) => live.push((key, entry)),
            }
        }

        // Under count pressure, rank live entries and drop the least valuable
        // until back at the low-water mark
        let low_water = (self.max_entries as f64 * LOW_WATER_RATIO) as usize;
        if live.len() > low_water {
            let mut scored: Vec<(String, f64)> = live
                .into_iter()
                .map(|(key, entry)| {
                    let score = entry.retention_score(now);
                    (key, score)
                })
                .collect();
            scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            let excess = scored.len() - low_water;
            for (key, _) in scored.into_iter().take(excess) {
                self.storage.remove_item(&key);
                removed += 1;
            }
        }

        self.touch_metadata(now);
        if removed > 0 {
            debug!("Cleanup removed {} records", removed);
        }
        removed
    }

    // == Clear ==
    /// Removes every record under the cache prefix and resets the lifetime
    /// counters. Idempotent. The metadata `created` stamp survives: it marks
    /// first initialization of the storage area, not the last wipe.
    pub fn clear(&mut self) {
        for key in self.entry_keys() {
            self.storage.remove_item(&key);
        }
        self.counters.reset();

        let now = Utc::now();
        let mut meta = self.metadata().unwrap_or_else(|| CacheMetadata::new(now));
        meta.last_cleanup = now;
        self.write_metadata(&meta);
    }

    // == Statistics ==
    /// Recomputes storage-wide statistics with a full physical scan.
    ///
    /// Expired-but-uncollected entries are counted: the scan reflects true
    /// storage pressure between cleanup passes, not logical liveness.
    pub fn statistics(&self) -> CacheStatistics {
        let mut stats = CacheStatistics {
            hit_rate: self.counters.hit_rate(),
            miss_rate: self.counters.miss_rate(),
            ..CacheStatistics::default()
        };

        for (_, entry) in self.load_entries() {
            stats.total_entries += 1;
            if let Some(entry) = entry {
                stats.total_size += entry.size;
                stats.oldest_entry = Some(match stats.oldest_entry {
                    Some(oldest) => oldest.min(entry.timestamp),
                    None => entry.timestamp,
                });
                stats.newest_entry = Some(match stats.newest_entry {
                    Some(newest) => newest.max(entry.timestamp),
                    None => entry.timestamp,
                });
            }
        }
        stats
    }

    /// Returns the O(1) lifetime lookup metrics from the in-memory counters.
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.counters.metrics()
    }

    /// Returns the persisted store-wide metadata record, if decodable.
    pub fn metadata(&self) -> Option<CacheMetadata> {
        let raw = self.storage.get_item(METADATA_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    // == Length ==
    /// Returns the number of physically present entry records.
    pub fn len(&self) -> usize {
        self.entry_keys().len()
    }

    /// Returns true if no entry records are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Internal Helpers ==
    /// Keys of every entry record this cache owns (metadata excluded).
    fn entry_keys(&self) -> Vec<String> {
        self.storage
            .keys()
            .into_iter()
            .filter(|key| is_entry_key(key))
            .collect()
    }

    /// Loads every entry record; None marks an undecodable one.
    fn load_entries(&self) -> Vec<(String, Option<RawEntry>)> {
        self.entry_keys()
            .into_iter()
            .filter_map(|key| {
                let raw = self.storage.get_item(&key)?;
                let entry = serde_json::from_str(&raw).ok();
                Some((key, entry))
            })
            .collect()
    }

    /// Aggregate (payload bytes, record count) across all physical records.
    fn scan_pressure(&self) -> (usize, usize) {
        let mut total_size = 0;
        let mut count = 0;
        for (_, entry) in self.load_entries() {
            count += 1;
            if let Some(entry) = entry {
                total_size += entry.size;
            }
        }
        (total_size, count)
    }

    /// Persists an updated entry envelope; failure is logged, not propagated.
    fn persist_entry(&mut self, key: &str, entry: &RawEntry) {
        match serde_json::to_string(entry) {
            Ok(encoded) => {
                if let Err(err) = self.storage.set_item(key, &encoded) {
                    warn!("Failed to persist access metadata for {}: {}", key, err);
                }
            }
            Err(err) => warn!("Failed to encode entry {}: {}", key, err),
        }
    }

    /// Stamps `last_cleanup` in the metadata record.
    fn touch_metadata(&mut self, now: u64) {
        let stamp = ms_to_datetime(now);
        let mut meta = self.metadata().unwrap_or_else(|| CacheMetadata::new(stamp));
        meta.last_cleanup = stamp;
        self.write_metadata(&meta);
    }

    fn write_metadata(&mut self, meta: &CacheMetadata) {
        match serde_json::to_string(meta) {
            Ok(encoded) => {
                if let Err(err) = self.storage.set_item(METADATA_KEY, &encoded) {
                    debug!("Metadata write failed: {}", err);
                }
            }
            Err(err) => debug!("Metadata failed to encode: {}", err),
        }
    }
}

/// Converts a Unix-millisecond instant to a UTC timestamp.
fn ms_to_datetime(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or_else(Utc::now)
}
