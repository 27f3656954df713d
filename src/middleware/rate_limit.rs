use std::sync::Arc;

use chrono::Utc;

use crate::infrastructure::cache::{Cache, keys::CacheKey};

#[derive(Debug, Clone)]
pub struct SlidingWindowConfig {
    pub max_requests_per_window: u32,
    pub window_duration_secs: u64,
    pub key_prefix: String,
}

/// Weighted sliding-window limiter over the in-process cache, scoped to the OAuth
/// callback (the one unauthenticated, externally reachable route — authenticated
/// scheduler routes are already self-limiting). Same weighting scheme as a
/// Redis-backed limiter, but reading/writing window counters through `Cache` instead
/// of a round trip to Redis.
#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<Cache>,
    config: SlidingWindowConfig,
}

impl RateLimiter {
    pub fn new(cache: Arc<Cache>, config: SlidingWindowConfig) -> Self {
        Self { cache, config }
    }

    /// Returns (allowed, remaining, reset_at).
    pub async fn check(&self, key: &str) -> (bool, u32, u64) {
        let window_secs = self.config.window_duration_secs;
        let now = Utc::now().timestamp() as u64;

        let current_window = now / window_secs;
        let previous_window = current_window.saturating_sub(1);

        let current_key = CacheKey::rate_window(&self.config.key_prefix, key, current_window);
        let previous_key = CacheKey::rate_window(&self.config.key_prefix, key, previous_window);

        let current_count = self.cache.get_window_count(&current_key).await;
        let previous_count = self.cache.get_window_count(&previous_key).await;

        let seconds_into_current = now % window_secs;
        let previous_weight = 1.0 - (seconds_into_current as f64 / window_secs as f64);

        let weighted_count =
            (previous_count as f64 * previous_weight + current_count as f64).ceil() as u32;

        let reset_at = (current_window + 1) * window_secs;

        if weighted_count >= self.config.max_requests_per_window {
            return (false, 0, reset_at);
        }

        self.cache
            .set_window_count(&current_key, current_count + 1)
            .await;

        let remaining = self
            .config
            .max_requests_per_window
            .saturating_sub(weighted_count + 1);

        (true, remaining, reset_at)
    }
}

pub fn create_limiter(cache: Arc<Cache>, limit: u32, prefix: &str) -> RateLimiter {
    RateLimiter::new(
        cache,
        SlidingWindowConfig {
            max_requests_per_window: limit,
            window_duration_secs: 60,
            key_prefix: prefix.to_string(),
        },
    )
}
