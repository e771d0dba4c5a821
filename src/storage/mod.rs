//! Storage Module
//!
//! Defines the synchronous key-value contract the cache persists through,
//! plus an in-memory implementation with a byte quota.
//!
//! The contract is shaped like a web-style local store: string values only,
//! a bounded capacity the host enforces, and index-stable key enumeration.
//! Availability is not assumed; the facade probes it once at construction.

mod memory;

pub use memory::MemoryStorage;

use crate::error::Result;

// == Storage Adapter ==
/// Synchronous key-value store with enumerable keys and a host-set capacity.
///
/// Implementations may refuse writes at any time (quota exhaustion); callers
/// treat a refused write as a soft failure, never as fatal.
pub trait StorageAdapter {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// Fails with `CacheError::QuotaExceeded` when the host budget is spent.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`. Absent keys are a no-op.
    fn remove_item(&mut self, key: &str);

    /// Returns the number of keys currently stored.
    fn len(&self) -> usize;

    /// Returns true if the store holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the key at `index`, or None past the end.
    ///
    /// Enumeration order must be stable between mutations.
    fn key(&self, index: usize) -> Option<String>;

    /// Collects every stored key. Snapshot semantics: safe to mutate the
    /// store while iterating the returned list.
    fn keys(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.key(i)).collect()
    }
}
