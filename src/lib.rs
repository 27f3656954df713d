pub mod api;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    infrastructure::{cache::Cache, db::Database},
    middleware::rate_limit::RateLimiter,
    services::{auth::JwtService, canvas::CanvasClient, oauth::OAuthClient, scheduler::TaskStore},
};

#[derive(Clone)]
pub struct RateLimiters {
    pub login: RateLimiter,
}

/// Everything a request handler needs, grouped behind `Arc`s so `AppState` itself stays
/// a cheap `Clone` for axum's `with_state`. `task_store` is the one piece of mutable
/// state that lives outside a database — it's already internally an `Arc<Mutex<_>>`
/// (§5), so it's held directly rather than double-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Database>,
    pub cache: Arc<Cache>,
    pub jwt_service: Arc<JwtService>,
    pub oauth_client: Arc<OAuthClient>,
    pub canvas_client: Arc<CanvasClient>,
    pub task_store: TaskStore,
    pub rate_limiters: Arc<RateLimiters>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .server
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .nest("/api", api::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::logging::make_log_span)
                .on_request(())
                .on_eos(()),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(
            state.config.server.max_concurrent_requests,
        ))
        .with_state(state)
}
