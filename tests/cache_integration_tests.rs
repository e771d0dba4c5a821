//! Integration Tests for the Cache Layer
//!
//! Exercises the public facade and store end to end: entry lifecycle,
//! accounting, eviction under pressure, rate budgeting and degraded mode.

use esg_cache::{
    CacheConfig, CacheStore, EsgCache, MemoryStorage, Namespace, SetOutcome,
};
use serde::{Deserialize, Serialize};

const HOUR_MS: u64 = 3_600_000;

// == Helper Types ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EsgScore {
    ticker: String,
    environmental: f64,
    social: f64,
    governance: f64,
    total: f64,
}

fn score_for(ticker: &str) -> EsgScore {
    EsgScore {
        ticker: ticker.to_string(),
        environmental: 72.0,
        social: 64.5,
        governance: 58.1,
        total: 64.9,
    }
}

fn default_cache() -> EsgCache<MemoryStorage> {
    EsgCache::new(MemoryStorage::new(), &CacheConfig::default())
}

// == Entry Lifecycle ==

#[tokio::test]
async fn test_set_then_get_returns_deep_equal_payload() {
    let cache = default_cache();

    let outcome = cache
        .set(Namespace::Scores, "TSLA", &score_for("TSLA"), Some(HOUR_MS))
        .await;
    assert_eq!(outcome, SetOutcome::Stored);

    let retrieved: Option<EsgScore> = cache.get(Namespace::Scores, "TSLA").await;
    assert_eq!(retrieved, Some(score_for("TSLA")));
}

#[tokio::test]
async fn test_lookup_is_case_insensitive() {
    let cache = default_cache();

    cache
        .set(Namespace::Scores, "aapl", &score_for("AAPL"), None)
        .await;

    let retrieved: Option<EsgScore> = cache.get(Namespace::Scores, "AAPL").await;
    assert_eq!(retrieved, Some(score_for("AAPL")));
}

#[test]
fn test_ttl_scenario_with_virtual_clock() {
    // Cache a TSLA entry with a 24 h TTL and a 200-byte payload, then advance
    // a virtual clock past expiry
    let mut store = CacheStore::new(MemoryStorage::new(), &CacheConfig::default());

    // JSON string payload: 198 chars plus two quotes = 200 serialized bytes
    let payload = "x".repeat(198);
    let outcome = store.set_at(Namespace::Scores, "TSLA", &payload, Some(24 * HOUR_MS), 0);
    assert_eq!(outcome, SetOutcome::Stored);

    let stats = store.statistics();
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.total_size, 200);

    // 25 hours later the entry is absent and the lookup removes it
    let retrieved: Option<String> = store.get_at(Namespace::Scores, "TSLA", 25 * HOUR_MS);
    assert_eq!(retrieved, None);

    let stats = store.statistics();
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.total_size, 0);
}

// == Hit/Miss Accounting ==

#[tokio::test]
async fn test_hit_miss_accounting_is_exact() {
    let cache = default_cache();
    let tickers = ["TSLA", "AAPL", "MSFT", "NVDA", "AMZN"];

    for ticker in tickers {
        cache
            .set(Namespace::Scores, ticker, &score_for(ticker), None)
            .await;
    }
    for ticker in tickers {
        let hit: Option<EsgScore> = cache.get(Namespace::Scores, ticker).await;
        assert!(hit.is_some());
    }

    let metrics = cache.performance_metrics().await;
    assert_eq!(metrics.hits, 5);
    assert_eq!(metrics.misses, 0);
    assert_eq!(metrics.hit_rate, 100.0);

    for unknown in ["GME", "AMC", "BBBY"] {
        let miss: Option<EsgScore> = cache.get(Namespace::Scores, unknown).await;
        assert!(miss.is_none());
    }

    let metrics = cache.performance_metrics().await;
    assert_eq!(metrics.hits, 5);
    assert_eq!(metrics.misses, 3);
    assert_eq!(metrics.total_requests, 8);
}

// == Eviction Under Pressure ==

#[test]
fn test_entry_ceiling_holds_after_pressure() {
    let config = CacheConfig {
        max_entries: 10,
        ..CacheConfig::default()
    };
    let mut store = CacheStore::new(MemoryStorage::new(), &config);

    for i in 0..50 {
        let _ = store.set_at(
            Namespace::Scores,
            &format!("TICK{}", i),
            &score_for("X"),
            None,
            i as u64,
        );
        assert!(store.len() <= 10, "ceiling breached at set {}", i);
    }
}

#[test]
fn test_eviction_keeps_hot_entries() {
    let day = 24 * HOUR_MS;
    let config = CacheConfig {
        max_entries: 2,
        ..CacheConfig::default()
    };
    let mut store = CacheStore::new(MemoryStorage::new(), &config);
    let now = 30 * day;

    store.set_at(Namespace::Scores, "COLD", &score_for("COLD"), Some(90 * day), 0);
    store.set_at(Namespace::Scores, "HOT", &score_for("HOT"), Some(90 * day), 0);
    for _ in 0..100 {
        let _: Option<EsgScore> = store.get_at(Namespace::Scores, "HOT", now - 60_000);
    }

    store.cleanup_at(now);

    let hot: Option<EsgScore> = store.get_at(Namespace::Scores, "HOT", now);
    assert!(hot.is_some(), "frequently and recently used entry must survive");
    let cold: Option<EsgScore> = store.get_at(Namespace::Scores, "COLD", now);
    assert!(cold.is_none(), "stale single-hit entry must be evicted first");
}

// == Rate Budgeting ==

#[tokio::test]
async fn test_rate_budget_per_endpoint() {
    let config = CacheConfig {
        max_requests_per_window: 5,
        ..CacheConfig::default()
    };
    let cache = EsgCache::new(MemoryStorage::new(), &config);

    for _ in 0..5 {
        assert!(cache.can_make_request("esg-scores").await);
    }
    assert!(!cache.can_make_request("esg-scores").await);

    // A different endpoint has an untouched budget
    assert!(cache.can_make_request("company-search").await);
}

// == Clear & Statistics ==

#[tokio::test]
async fn test_clear_is_idempotent_and_resets_counters() {
    let cache = default_cache();

    cache
        .set(Namespace::Scores, "TSLA", &score_for("TSLA"), None)
        .await;
    let _: Option<EsgScore> = cache.get(Namespace::Scores, "TSLA").await;

    cache.clear().await;

    let stats = cache.stats().await;
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.total_size, 0);
    let metrics = cache.performance_metrics().await;
    assert_eq!(metrics.total_requests, 0);

    // Clearing an empty cache is a no-op
    cache.clear().await;
    assert_eq!(cache.stats().await.total_entries, 0);
}

#[tokio::test]
async fn test_stats_report_entry_ages() {
    let cache = default_cache();

    cache
        .set(Namespace::Scores, "TSLA", &score_for("TSLA"), None)
        .await;
    cache
        .set(Namespace::Search, "solar", &vec!["TSLA", "ENPH"], None)
        .await;

    let stats = cache.stats().await;
    assert_eq!(stats.total_entries, 2);
    assert!(stats.total_size > 0);

    let oldest = stats.oldest_entry.expect("oldest entry timestamp");
    let newest = stats.newest_entry.expect("newest entry timestamp");
    assert!(oldest <= newest);
}

// == Degraded Mode ==

#[tokio::test]
async fn test_unavailable_storage_degrades_to_pass_through() {
    let cache = EsgCache::new(MemoryStorage::unavailable(), &CacheConfig::default());
    assert!(!cache.is_available());

    let outcome = cache
        .set(Namespace::Scores, "TSLA", &score_for("TSLA"), None)
        .await;
    assert_eq!(outcome, SetOutcome::Rejected);

    let retrieved: Option<EsgScore> = cache.get(Namespace::Scores, "TSLA").await;
    assert_eq!(retrieved, None);

    // Without a cache to absorb traffic, the budget gate never blocks
    for _ in 0..500 {
        assert!(cache.can_make_request("esg-scores").await);
    }

    // All reporting surfaces stay safe
    let stats = cache.stats().await;
    assert_eq!(stats.total_entries, 0);
    cache.clear().await;
}

// == Quota Pressure ==

#[tokio::test]
async fn test_quota_exhaustion_is_soft() {
    // Storage quota far below the cache's own size budget: writes fail at the
    // adapter, sets come back rejected, nothing panics
    let storage = MemoryStorage::with_quota(128);
    let cache = EsgCache::new(storage, &CacheConfig::default());
    assert!(cache.is_available());

    let mut stored = 0;
    for i in 0..20 {
        let outcome = cache
            .set(Namespace::Scores, &format!("T{}", i), &score_for("X"), None)
            .await;
        if outcome.is_stored() {
            stored += 1;
        }
    }
    assert!(stored < 20, "quota should have rejected some writes");

    let stats = cache.stats().await;
    assert!(stats.total_entries <= stored);
}
