use std::{env, str::FromStr, time::Duration};

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub oauth: OAuthConfig,
    pub canvas: CanvasConfig,
    pub scheduler: SchedulerConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub moderator_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub redirect_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub api_token: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub lease_duration: Duration,
    pub refresh_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_limit: u32,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub oauth_state_max_capacity: u64,
    pub oauth_state_ttl: Duration,
    pub rate_limit_max_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env_or_default("HOST", "127.0.0.1"),
                port: env_or_parse("PORT", 8080)?,
                base_url: env_required("BASE_URL")?,
                cors_allowed_origins: env_list("CORS_ALLOWED_ORIGINS", vec!["".into()]),
                max_concurrent_requests: env_or_parse("SERVER_MAX_CONCURRENT_REQUESTS", 100)?,
            },
            database: DatabaseConfig {
                url: env_required("DATABASE_URL")?,
                max_connections: env_or_parse("DB_MAX_CONNECTIONS", 5)?,
                min_connections: env_or_parse("DB_MIN_CONNECTIONS", 2)?,
                connect_timeout: Duration::from_secs(env_or_parse("DB_CONNECT_TIMEOUT_SECS", 10)?),
                idle_timeout: Duration::from_secs(env_or_parse("DB_IDLE_TIMEOUT_SECS", 300)?),
            },
            jwt: JwtConfig {
                secret: env_required("JWT_SECRET")?,
            },
            oauth: OAuthConfig {
                redirect_url: env_required("OAUTH_REDIRECT_URL")?,
                authorize_url: env_required("OAUTH_AUTHORIZE_URL")?,
                token_url: env_required("OAUTH_TOKEN_URL")?,
                user_url: env_required("OAUTH_USER_URL")?,
                client_id: env_required("CLIENT_ID")?,
                client_secret: env_required("CLIENT_SECRET")?,
            },
            canvas: CanvasConfig {
                api_token: env_required("PIXELS_API_TOKEN")?,
                api_base_url: env_required("PIXELS_API_BASE_URL")?,
            },
            scheduler: SchedulerConfig {
                lease_duration: Duration::from_secs_f64(env_or_parse(
                    "TASK_PENDING_DELAY",
                    5.0,
                )?),
                refresh_interval: Duration::from_secs_f64(env_or_parse(
                    "TASK_REFRESH_TIME",
                    2.0,
                )?),
            },
            rate_limit: RateLimitConfig {
                login_limit: env_or_parse("RATE_LIMIT_LOGIN", 10)?,
            },
            cache: CacheConfig {
                oauth_state_max_capacity: env_or_parse("CACHE_OAUTH_STATE_MAX_CAPACITY", 10_000)?,
                oauth_state_ttl: Duration::from_secs(env_or_parse(
                    "CACHE_OAUTH_STATE_TTL_SECS",
                    600,
                )?),
                rate_limit_max_capacity: env_or_parse("CACHE_RATE_LIMIT_MAX_CAPACITY", 10_000)?,
            },
            moderator_ids: env_list("MODERATOR_IDS", vec![])
                .iter()
                .filter_map(|id| id.parse::<i64>().ok())
                .collect(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.len() < 32 {
            return Err(AppError::InvalidParams(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        if self.scheduler.lease_duration.is_zero() {
            return Err(AppError::InvalidParams(
                "TASK_PENDING_DELAY must be positive".into(),
            ));
        }

        if self.scheduler.refresh_interval.is_zero() {
            return Err(AppError::InvalidParams(
                "TASK_REFRESH_TIME must be positive".into(),
            ));
        }

        Ok(())
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|_| AppError::InvalidParams(format!("Invalid value for {key}"))),
        Err(_) => Ok(default),
    }
}

fn env_required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::InvalidParams(format!("{key} is required")))
}

fn env_list(key: &str, default: Vec<String>) -> Vec<String> {
    env::var(key)
        .map(|val| {
            val.split(|c: char| c == ',' || c.is_whitespace())
                .map(|str_val| str_val.trim().to_string())
                .filter(|str_val| !str_val.is_empty())
                .collect()
        })
        .unwrap_or(default)
}
