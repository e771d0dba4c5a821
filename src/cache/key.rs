//! Cache Key Module
//!
//! Derives physical storage keys from a logical namespace and identifier.
//!
//! Keys take the form `esg_cache_{namespace}_{IDENTIFIER}`. The identifier is
//! upper-cased so lookups are insensitive to caller casing ("aapl" and "AAPL"
//! address the same entry). Namespaces let different logical data kinds share
//! one physical store without key collisions.

use std::fmt;

// == Key Constants ==
/// Prefix shared by every record this cache owns
pub const KEY_PREFIX: &str = "esg_cache";

/// Fixed key of the store-wide metadata record
pub const METADATA_KEY: &str = "esg_cache_meta";

// == Namespace ==
/// Logical data kinds sharing the physical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// ESG score payloads keyed by ticker
    Scores,
    /// Company search results keyed by query
    Search,
}

impl Namespace {
    /// Returns the key segment for this namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Scores => "scores",
            Namespace::Search => "search",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Key Derivation ==
/// Builds the physical storage key for `(namespace, identifier)`.
///
/// Deterministic and case-normalizing: the identifier is upper-cased.
pub fn cache_key(namespace: Namespace, identifier: &str) -> String {
    format!("{}_{}_{}", KEY_PREFIX, namespace, identifier.to_uppercase())
}

/// Returns true if `key` is a cache entry record (owned by this cache and
/// not the metadata record).
pub fn is_entry_key(key: &str) -> bool {
    key != METADATA_KEY && key.starts_with(KEY_PREFIX)
}
