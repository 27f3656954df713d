pub mod extractors;
pub mod methods;
pub mod types;

use std::net::SocketAddr;

use axum::{
    Router,
    extract::{ConnectInfo, State},
    routing::{get, post, put},
};

use crate::{AppState, error::AppError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task", get(methods::scheduler::get_task).post(methods::scheduler::submit_task))
        .route("/projects", get(methods::scheduler::list_projects).post(methods::projects::create_project))
        .route(
            "/projects/{name}",
            put(methods::projects::update_project).delete(methods::projects::delete_project),
        )
        .route("/users/{id}/banned", put(methods::users::set_banned))
        .route("/users/{id}/moderator", put(methods::users::set_moderator))
        .route("/auth/login", get(methods::auth::login))
        .route("/auth/callback", get(oauth_callback_rate_limited))
}

/// Wraps the OAuth callback with the sliding-window login limiter (§9 — the one
/// unauthenticated, externally reachable route; everything past this point requires a
/// bearer token and is self-limiting by construction).
async fn oauth_callback_rate_limited(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    query: axum::extract::Query<crate::api::types::OAuthCallbackQuery>,
) -> Result<axum::response::Response, AppError> {
    let (allowed, _, _) = state.rate_limiters.login.check(&addr.ip().to_string()).await;
    if !allowed {
        return Err(AppError::RateLimitExceeded);
    }
    methods::auth::callback(State(state), query).await
}
