//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.
//!
//! Errors are internal plumbing only: every public facade method maps them to
//! a safe fallback value (absent, rejected, empty statistics) so the cache is
//! never a hard dependency for the caller's correctness.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Host storage failed the availability probe or a round trip
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Entry envelope failed to encode or decode
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Host storage rejected a write because its quota is exhausted
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
