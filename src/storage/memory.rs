//! In-Memory Storage Adapter
//!
//! Backs the cache with a HashMap plus an insertion-ordered key list so that
//! `key(index)` enumeration is stable, matching the behavior of host-provided
//! local stores. Enforces a configurable byte quota across keys and values.

use std::collections::HashMap;

use crate::error::{CacheError, Result};
use crate::storage::StorageAdapter;

/// Default quota matching common host local-store budgets (5 MB).
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

// == Memory Storage ==
/// In-memory key-value store with a byte quota and stable key enumeration.
#[derive(Debug)]
pub struct MemoryStorage {
    /// Key-value storage
    items: HashMap<String, String>,
    /// Keys in insertion order, for index-based enumeration
    order: Vec<String>,
    /// Total byte budget across all keys and values
    quota_bytes: usize,
    /// When set, every write fails; simulates a torn-down or denied host store
    fail_writes: bool,
}

impl MemoryStorage {
    // == Constructors ==
    /// Creates a storage adapter with the default 5 MB quota.
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Creates a storage adapter with an explicit byte quota.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            quota_bytes,
            fail_writes: false,
        }
    }

    /// Creates a storage adapter that refuses every write.
    ///
    /// Used to exercise the facade's degraded (no-storage) mode.
    pub fn unavailable() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            quota_bytes: 0,
            fail_writes: true,
        }
    }

    /// Returns the number of bytes currently occupied by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(CacheError::StorageUnavailable(
                "writes disabled".to_string(),
            ));
        }

        // Usage after the write, accounting for any value being replaced
        let replaced = self.items.get(key).map(|v| v.len() + key.len()).unwrap_or(0);
        let projected = self.used_bytes() - replaced + key.len() + value.len();
        if projected > self.quota_bytes {
            return Err(CacheError::QuotaExceeded(format!(
                "{} bytes needed, {} byte quota",
                projected, self.quota_bytes
            )));
        }

        if self.items.insert(key.to_string(), value.to_string()).is_none() {
            self.order.push(key.to_string());
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        if self.items.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.order.get(index).cloned()
    }
}
