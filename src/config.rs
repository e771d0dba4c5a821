//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum aggregate serialized payload size in bytes
    pub max_cache_size: usize,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Sliding rate-limit window duration in milliseconds
    pub rate_window_ms: u64,
    /// Maximum requests allowed per endpoint within one window
    pub max_requests_per_window: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_SIZE` - Aggregate payload budget in bytes (default: 4 MB)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 24 hours)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 600)
    /// - `RATE_WINDOW_MS` - Rate-limit window in milliseconds (default: 60000)
    /// - `MAX_REQUESTS_PER_WINDOW` - Requests per window (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_cache_size: env::var("MAX_CACHE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_size),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            rate_window_ms: env::var("RATE_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_window_ms),
            max_requests_per_window: env::var("MAX_REQUESTS_PER_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_requests_per_window),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 4 * 1024 * 1024,
            max_entries: 100,
            default_ttl_ms: 24 * 60 * 60 * 1000,
            cleanup_interval: 600,
            rate_window_ms: 60_000,
            max_requests_per_window: 100,
        }
    }
}
