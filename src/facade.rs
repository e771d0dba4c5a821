//! Cache Facade Module
//!
//! `EsgCache` is the sole entry point callers use. It wires the store, the
//! rate limiter and the background cleanup task together, probes storage
//! availability once at construction, and guarantees that no internal failure
//! ever reaches the caller as an error: every operation has a safe fallback.
//!
//! When storage is unavailable the whole cache degrades to a pass-through:
//! `get` is always absent, `set` always rejected, `can_make_request` always
//! true. The rest of the system keeps functioning, only slower.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{
    current_timestamp_ms, CacheStatistics, CacheStore, Namespace, PerformanceMetrics, SetOutcome,
};
use crate::config::CacheConfig;
use crate::limiter::RateLimiter;
use crate::storage::StorageAdapter;
use crate::tasks::spawn_cleanup_task;

/// Key used for the one-time availability probe.
const PROBE_KEY: &str = "esg_cache_probe";

// == ESG Cache Facade ==
/// Process-wide cache handle: constructed once at startup, passed to all
/// callers, torn down with [`EsgCache::shutdown`].
pub struct EsgCache<S: StorageAdapter + Send + Sync + 'static> {
    /// Entry store behind a lock shared with the cleanup task
    cache: Arc<RwLock<CacheStore<S>>>,
    /// Per-endpoint request budgets
    limiter: Arc<Mutex<RateLimiter>>,
    /// Background cleanup task, aborted on shutdown
    cleanup_handle: Option<JoinHandle<()>>,
    /// Result of the one-time storage availability probe
    available: bool,
}

impl<S: StorageAdapter + Send + Sync + 'static> EsgCache<S> {
    // == Constructor ==
    /// Creates the facade over `storage`, probing availability and starting
    /// the periodic cleanup task.
    ///
    /// Must be called within a tokio runtime. A failed probe is logged once
    /// and yields a degraded no-op cache rather than an error.
    pub fn new(mut storage: S, config: &CacheConfig) -> Self {
        let available = probe_storage(&mut storage);
        if !available {
            warn!("Storage unavailable, cache degraded to pass-through");
        }

        let cache = Arc::new(RwLock::new(CacheStore::new(storage, config)));
        let limiter = Arc::new(Mutex::new(RateLimiter::new(config)));

        // No store to tend when storage is unavailable
        let cleanup_handle = if available {
            info!(
                "Cache initialized: {} entries / {} bytes max, cleanup every {}s",
                config.max_entries, config.max_cache_size, config.cleanup_interval
            );
            Some(spawn_cleanup_task(Arc::clone(&cache), config.cleanup_interval))
        } else {
            None
        };

        Self {
            cache,
            limiter,
            cleanup_handle,
            available,
        }
    }

    // == Get ==
    /// Retrieves a live cached payload, or None on any kind of miss.
    pub async fn get<T: DeserializeOwned>(&self, namespace: Namespace, identifier: &str) -> Option<T> {
        if !self.available {
            return None;
        }
        self.cache.write().await.get(namespace, identifier)
    }

    // == Set ==
    /// Stores a payload with an optional TTL in milliseconds. Fire-and-forget:
    /// rejection is a soft outcome the caller may ignore.
    pub async fn set<T: Serialize>(
        &self,
        namespace: Namespace,
        identifier: &str,
        data: &T,
        ttl_ms: Option<u64>,
    ) -> SetOutcome {
        if !self.available {
            return SetOutcome::Rejected;
        }
        self.cache.write().await.set(namespace, identifier, data, ttl_ms)
    }

    // == Clear ==
    /// Removes every entry under the cache prefix and resets the lifetime
    /// counters. Idempotent.
    pub async fn clear(&self) {
        if !self.available {
            return;
        }
        self.cache.write().await.clear();
    }

    // == Statistics ==
    /// Storage-wide statistics from a full physical scan.
    pub async fn stats(&self) -> CacheStatistics {
        if !self.available {
            return CacheStatistics::default();
        }
        self.cache.read().await.statistics()
    }

    /// O(1) lifetime lookup metrics from the in-memory counters.
    pub async fn performance_metrics(&self) -> PerformanceMetrics {
        self.cache.read().await.performance_metrics()
    }

    // == Rate Limiting ==
    /// Asks for one unit of request budget for `endpoint`.
    ///
    /// Advisory: `false` means the caller should serve stale or absent data
    /// instead of calling the provider. In degraded mode the cache cannot
    /// help reduce call volume, so the budget is always granted.
    pub async fn can_make_request(&self, endpoint: &str) -> bool {
        if !self.available {
            return true;
        }
        self.limiter.lock().await.try_acquire(endpoint)
    }

    /// Number of requests currently counted against `endpoint`'s window.
    ///
    /// Observational only; does not spend budget. Zero in degraded mode,
    /// where no budget is ever tracked.
    pub async fn active_requests(&self, endpoint: &str) -> usize {
        if !self.available {
            return 0;
        }
        self.limiter
            .lock()
            .await
            .active_requests(endpoint, current_timestamp_ms())
    }

    // == Shutdown ==
    /// Stops the background cleanup task so it cannot touch a torn-down
    /// store. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
            info!("Cleanup task stopped");
        }
    }

    /// Whether the storage probe succeeded at construction.
    pub fn is_available(&self) -> bool {
        self.available
    }
}

impl<S: StorageAdapter + Send + Sync + 'static> Drop for EsgCache<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
        }
    }
}

/// One-time availability probe: a write/read/remove round trip.
fn probe_storage<S: StorageAdapter>(storage: &mut S) -> bool {
    if storage.set_item(PROBE_KEY, "1").is_err() {
        return false;
    }
    let readable = storage.get_item(PROBE_KEY).as_deref() == Some("1");
    storage.remove_item(PROBE_KEY);
    readable
}
