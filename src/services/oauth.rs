use serde::Deserialize;

use crate::{
    config::OAuthConfig,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The external identity provider's `/users/@me`-equivalent response. `id` is accepted
/// as either a JSON string or number since providers are inconsistent about it (Discord
/// sends snowflakes as strings); `username` falls back to `id` if the provider omits it.
#[derive(Debug, Deserialize)]
struct RawOAuthUser {
    #[serde(deserialize_with = "id_from_str_or_number")]
    id: i64,
    username: Option<String>,
}

fn id_from_str_or_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => s.parse().map_err(D::Error::custom),
        serde_json::Value::Number(n) => n.as_i64().ok_or_else(|| D::Error::custom("id out of range")),
        _ => Err(D::Error::custom("id must be a string or number")),
    }
}

#[derive(Debug, Clone)]
pub struct OAuthUser {
    pub id: i64,
    pub username: String,
}

/// Thin wrapper over the external OAuth provider's authorization-code flow. Grounded
/// on `get_oauth_user` from the system this was distilled from: exchange the code for
/// a provider access token, then use that token to fetch the identity.
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=identify&state={}",
            self.config.authorize_url,
            self.config.client_id,
            urlencoding_redirect(&self.config.redirect_url),
            state
        )
    }

    pub async fn exchange_and_identify(&self, code: &str) -> Result<OAuthUser> {
        let token_response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("scope", "identify"),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuthFailed(e.to_string()))?;

        if !token_response.status().is_success() {
            return Err(AppError::OAuthFailed(format!(
                "token exchange returned {}",
                token_response.status()
            )));
        }

        let token: TokenResponse = token_response
            .json()
            .await
            .map_err(|e| AppError::OAuthFailed(e.to_string()))?;

        let user_response = self
            .http
            .get(&self.config.user_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuthFailed(e.to_string()))?;

        if !user_response.status().is_success() {
            return Err(AppError::OAuthFailed(format!(
                "user info fetch returned {}",
                user_response.status()
            )));
        }

        let raw: RawOAuthUser = user_response
            .json()
            .await
            .map_err(|e| AppError::OAuthFailed(e.to_string()))?;

        Ok(OAuthUser {
            id: raw.id,
            username: raw.username.unwrap_or_else(|| raw.id.to_string()),
        })
    }
}

fn urlencoding_redirect(url: &str) -> String {
    url.replace(':', "%3A").replace('/', "%2F")
}
