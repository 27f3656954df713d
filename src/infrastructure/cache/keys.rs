pub struct CacheKey;

impl CacheKey {
    pub fn oauth_state(nonce: &str) -> String {
        format!("oauth:state:{nonce}")
    }

    pub fn rate_window(prefix: &str, key: &str, window: u64) -> String {
        format!("rate:{prefix}:{key}:{window}")
    }
}
