use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{
    config::CanvasConfig,
    error::{AppError, Result},
    services::{image, scheduler::types::{Rgb, Snapshot}},
};

#[derive(Debug, Deserialize)]
struct PixelResponse {
    rgb: String,
}

/// Tracks when the next `get_pixel` call is allowed to run without violating the
/// upstream's advertised rate limit: a cached value behind a lock, refreshed from
/// response headers, where the "value" is just a deadline.
struct RateLimitWindow {
    available_at: Instant,
}

/// Component A: thin wrapper over the remote pixel service. All failure modes (I/O,
/// upstream 5xx, rate-limit exhaustion) are surfaced as `AppError::CanvasUnavailable`;
/// callers retry with backoff (the refresh loop) or fall back to the snapshot (the
/// submission validator).
pub struct CanvasClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    rate_limit: RwLock<RateLimitWindow>,
}

impl CanvasClient {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            rate_limit: RwLock::new(RateLimitWindow {
                available_at: Instant::now(),
            }),
        }
    }

    pub async fn get_canvas(&self) -> Result<Snapshot> {
        let response = self
            .http
            .get(format!("{}/get_pixels", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|_| AppError::CanvasUnavailable)?;

        self.record_rate_limit_headers(response.headers()).await;

        if !response.status().is_success() {
            return Err(AppError::CanvasUnavailable);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|_| AppError::CanvasUnavailable)?;

        let decoded =
            image::decode_png_bytes(&bytes).map_err(|_| AppError::CanvasUnavailable)?;

        Ok(Snapshot {
            width: decoded.width,
            height: decoded.height,
            pixels: decoded.pixels,
            fetched_at: Instant::now(),
        })
    }

    pub async fn get_pixel(&self, x: i32, y: i32) -> Result<Rgb> {
        let response = self
            .http
            .get(format!("{}/get_pixel", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("x", x), ("y", y)])
            .send()
            .await
            .map_err(|_| AppError::CanvasUnavailable)?;

        self.record_rate_limit_headers(response.headers()).await;

        if !response.status().is_success() {
            return Err(AppError::CanvasUnavailable);
        }

        let body: PixelResponse = response
            .json()
            .await
            .map_err(|_| AppError::CanvasUnavailable)?;

        Rgb::from_hex(&body.rgb).map_err(|_| AppError::CanvasUnavailable)
    }

    /// Side-effect-only preflight: reads the rate-limit headers a `HEAD` would return
    /// without spending the request budget of a full `get_pixel`.
    pub async fn head_pixel(&self, x: i32, y: i32) -> Result<()> {
        let response = self
            .http
            .head(format!("{}/get_pixel", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("x", x), ("y", y)])
            .send()
            .await
            .map_err(|_| AppError::CanvasUnavailable)?;

        self.record_rate_limit_headers(response.headers()).await;
        Ok(())
    }

    pub async fn pixel_wait_time(&self) -> Duration {
        let window = self.rate_limit.read().await;
        window
            .available_at
            .saturating_duration_since(Instant::now())
    }

    async fn record_rate_limit_headers(&self, headers: &reqwest::header::HeaderMap) {
        let remaining: Option<u32> = headers
            .get("requests-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let reset_secs: Option<u64> = headers
            .get("requests-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        if let (Some(0), Some(reset_secs)) = (remaining, reset_secs) {
            let mut window = self.rate_limit.write().await;
            window.available_at = Instant::now() + Duration::from_secs(reset_secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue};

    use super::*;
    use crate::config::CanvasConfig;

    fn client() -> CanvasClient {
        CanvasClient::new(&CanvasConfig {
            api_token: "token".into(),
            api_base_url: "http://localhost".into(),
        })
    }

    #[tokio::test]
    async fn pixel_wait_time_is_zero_before_any_rate_limit_seen() {
        let client = client();
        assert_eq!(client.pixel_wait_time().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn exhausted_rate_limit_headers_arm_the_wait_window() {
        let client = client();
        let mut headers = HeaderMap::new();
        headers.insert("requests-remaining", HeaderValue::from_static("0"));
        headers.insert("requests-reset", HeaderValue::from_static("30"));

        client.record_rate_limit_headers(&headers).await;
        let wait = client.pixel_wait_time().await;
        assert!(wait > Duration::ZERO && wait <= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn nonzero_remaining_does_not_arm_the_wait_window() {
        let client = client();
        let mut headers = HeaderMap::new();
        headers.insert("requests-remaining", HeaderValue::from_static("5"));
        headers.insert("requests-reset", HeaderValue::from_static("30"));

        client.record_rate_limit_headers(&headers).await;
        assert_eq!(client.pixel_wait_time().await, Duration::ZERO);
    }
}
