//! Rate Limiter Module
//!
//! Per-endpoint sliding-window request budgeting, independent of storage.
//!
//! Advisory only: `try_acquire` tells the caller whether an external call fits
//! the self-imposed budget. It never blocks, retries or touches the network;
//! a caller that receives `false` is expected to serve stale or absent data.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::current_timestamp_ms;
use crate::config::CacheConfig;

// == Request Window ==
/// Sliding-window state for one endpoint.
///
/// Every retained timestamp satisfies `now - t < window_duration`; pruning is
/// lazy, on each check, never eager.
#[derive(Debug)]
struct RequestWindow {
    /// Instant the current window began
    window_start: u64,
    /// Timestamps of requests admitted within the window
    requests: Vec<u64>,
}

// == Rate Limiter ==
/// Sliding-window request counter per logical endpoint.
#[derive(Debug)]
pub struct RateLimiter {
    /// Window state per endpoint name
    windows: HashMap<String, RequestWindow>,
    /// Window length in milliseconds
    window_duration_ms: u64,
    /// Maximum admitted requests per window
    max_requests: usize,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter with the window parameters from `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            windows: HashMap::new(),
            window_duration_ms: config.rate_window_ms,
            max_requests: config.max_requests_per_window,
        }
    }

    // == Try Acquire ==
    /// Requests one unit of budget for `endpoint`.
    ///
    /// Returns `true` and records the request if the window has room, `false`
    /// if the caller must not call the network now.
    pub fn try_acquire(&mut self, endpoint: &str) -> bool {
        self.try_acquire_at(endpoint, current_timestamp_ms())
    }

    /// `try_acquire` against an explicit clock.
    pub fn try_acquire_at(&mut self, endpoint: &str, now: u64) -> bool {
        let window = self
            .windows
            .entry(endpoint.to_string())
            .or_insert_with(|| RequestWindow {
                window_start: now,
                requests: Vec::new(),
            });

        // Hard reset past the boundary rather than a rolling log across it;
        // slightly bursty at window edges, acceptable because the provider's
        // own limiter is coarser-grained
        if now.saturating_sub(window.window_start) > self.window_duration_ms {
            window.window_start = now;
            window.requests.clear();
        }

        let horizon = self.window_duration_ms;
        window.requests.retain(|&t| now.saturating_sub(t) < horizon);

        if window.requests.len() >= self.max_requests {
            debug!("Rate budget exhausted for endpoint {}", endpoint);
            return false;
        }

        window.requests.push(now);
        true
    }

    // == Active Requests ==
    /// Number of requests currently counted against `endpoint`'s window.
    pub fn active_requests(&self, endpoint: &str, now: u64) -> usize {
        self.windows
            .get(endpoint)
            .map(|w| {
                w.requests
                    .iter()
                    .filter(|&&t| now.saturating_sub(t) < self.window_duration_ms)
                    .count()
            })
            .unwrap_or(0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_ms: u64) -> RateLimiter {
        RateLimiter::new(&CacheConfig {
            max_requests_per_window: max_requests,
            rate_window_ms: window_ms,
            ..CacheConfig::default()
        })
    }

    #[test]
    fn test_limiter_admits_up_to_budget() {
        let mut limiter = limiter(100, 60_000);

        for i in 0..100 {
            assert!(limiter.try_acquire_at("esg-scores", i), "request {} should pass", i);
        }
        // The 101st within the window fails
        assert!(!limiter.try_acquire_at("esg-scores", 100));
    }

    #[test]
    fn test_limiter_recovers_after_window() {
        let mut limiter = limiter(100, 60_000);

        for i in 0..100 {
            assert!(limiter.try_acquire_at("esg-scores", i));
        }
        assert!(!limiter.try_acquire_at("esg-scores", 1_000));

        // Past the window, the budget is available again
        assert!(limiter.try_acquire_at("esg-scores", 61_001));
    }

    #[test]
    fn test_limiter_prunes_lazily_within_window() {
        let mut limiter = limiter(2, 60_000);

        assert!(limiter.try_acquire_at("e", 0));
        assert!(limiter.try_acquire_at("e", 1_000));
        assert!(!limiter.try_acquire_at("e", 2_000));

        // The request at t=0 ages out of the trailing window before the
        // window_start reset triggers
        assert!(limiter.try_acquire_at("e", 60_000));
    }

    #[test]
    fn test_limiter_endpoints_are_independent() {
        let mut limiter = limiter(1, 60_000);

        assert!(limiter.try_acquire_at("scores", 0));
        assert!(!limiter.try_acquire_at("scores", 1));
        assert!(limiter.try_acquire_at("news", 1));
    }

    #[test]
    fn test_limiter_active_requests() {
        let mut limiter = limiter(10, 60_000);

        assert_eq!(limiter.active_requests("e", 0), 0);
        limiter.try_acquire_at("e", 0);
        limiter.try_acquire_at("e", 1_000);
        assert_eq!(limiter.active_requests("e", 2_000), 2);

        // One request has aged out of the trailing window
        assert_eq!(limiter.active_requests("e", 60_500), 1);
    }
}
