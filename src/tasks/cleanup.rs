//! Cleanup Task
//!
//! Background task that periodically runs a cache cleanup pass: expired and
//! undecodable records are removed, and low-retention-score entries are
//! evicted back to the low-water mark.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::storage::StorageAdapter;

/// Spawns a background task that periodically runs cleanup passes.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between passes. It acquires a write lock on the cache store only for the
/// duration of one pass.
///
/// # Arguments
/// * `cache` - Shared reference to the cache store
/// * `cleanup_interval_secs` - Interval in seconds between cleanup passes
///
/// # Returns
/// A JoinHandle for the spawned task, which must be aborted on shutdown so
/// the task cannot reference a torn-down store.
pub fn spawn_cleanup_task<S: StorageAdapter + Send + Sync + 'static>(
    cache: Arc<RwLock<CacheStore<S>>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup()
            };

            if removed > 0 {
                info!("Cleanup pass removed {} records", removed);
            } else {
                debug!("Cleanup pass found nothing to remove");
            }
        }
    })
}
