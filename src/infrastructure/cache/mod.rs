pub mod keys;

use moka::future::Cache as MokaCache;

use crate::{config::CacheConfig, infrastructure::cache::keys::CacheKey};

/// In-process cache for the two things that don't belong in the Task Store's lock:
/// OAuth CSRF-state nonces, and the sliding-window counters backing the login rate
/// limiter. Neither needs cross-process coordination, so a local `moka` cache is
/// enough — no distributed cache tier required.
pub struct Cache {
    oauth_state: MokaCache<String, ()>,
    rate_windows: MokaCache<String, u32>,
}

impl Cache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            oauth_state: MokaCache::builder()
                .max_capacity(config.oauth_state_max_capacity)
                .time_to_live(config.oauth_state_ttl)
                .build(),
            rate_windows: MokaCache::builder()
                .max_capacity(config.rate_limit_max_capacity)
                .time_to_live(std::time::Duration::from_secs(120))
                .build(),
        }
    }

    pub async fn issue_oauth_state(&self, nonce: &str) {
        self.oauth_state.insert(CacheKey::oauth_state(nonce), ()).await;
    }

    /// Returns true iff the nonce was outstanding, consuming it so it can't be replayed.
    pub async fn consume_oauth_state(&self, nonce: &str) -> bool {
        let key = CacheKey::oauth_state(nonce);
        let existed = self.oauth_state.get(&key).await.is_some();
        self.oauth_state.invalidate(&key).await;
        existed
    }

    pub async fn get_window_count(&self, key: &str) -> u32 {
        self.rate_windows.get(key).await.unwrap_or(0)
    }

    pub async fn set_window_count(&self, key: &str, count: u32) {
        self.rate_windows.insert(key.to_string(), count).await;
    }
}
