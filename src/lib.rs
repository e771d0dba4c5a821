//! ESG Cache - a client-resident caching and request-governance layer
//!
//! Sits between a UI and a rate-limited ESG scoring provider. Provides TTL
//! expiration, value-scored eviction under size/count pressure, per-endpoint
//! sliding-window rate limiting and self-reporting statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod limiter;
pub mod storage;
pub mod tasks;

pub use cache::{CacheStatistics, CacheStore, Namespace, PerformanceMetrics, SetOutcome};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use facade::EsgCache;
pub use limiter::RateLimiter;
pub use storage::{MemoryStorage, StorageAdapter};
pub use tasks::spawn_cleanup_task;
