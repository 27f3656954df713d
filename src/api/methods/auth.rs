use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    api::types::{LoginResponse, OAuthCallbackQuery, UserSummary},
    error::{AppError, Result},
    infrastructure::db::repositories::UserRepository,
    services::auth::cookie::create_token_cookie,
};

/// `GET /auth/login`. Issues a CSRF-state nonce and redirects to the external
/// provider's authorization endpoint, mirroring `get_oauth_user`'s call site in the
/// system this was distilled from.
pub async fn login(State(state): State<AppState>) -> Redirect {
    let nonce = Uuid::new_v4().to_string();

    state.cache.issue_oauth_state(&nonce).await;
    Redirect::to(&state.oauth_client.authorize_url(&nonce))
}

/// `GET /auth/callback?code=&state=`. Exchanges the code, rotates the user's salt
/// (creating the row on first sign-in, seeding `is_moderator` from the configured
/// moderator list), issues a JWT, and sets it both in the response body and as a
/// cookie for browser-based clients.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response> {
    if !state.cache.consume_oauth_state(&query.state).await {
        return Err(AppError::InvalidToken);
    }

    let identity = state.oauth_client.exchange_and_identify(&query.code).await?;
    let is_moderator_seed = state.config.moderator_ids.contains(&identity.id);

    let user = UserRepository::rotate_salt(
        state.db.get_connection(),
        identity.id,
        &identity.username,
        is_moderator_seed,
    )
    .await?;

    let token = state.jwt_service.create_token(user.user_id, &user.key_salt)?;
    let secure = state.config.server.base_url.starts_with("https://");
    let (cookie_name, cookie_value) = create_token_cookie(&token, secure);

    let body = Json(LoginResponse {
        token,
        user: UserSummary::from(user),
    });

    Ok((axum::http::StatusCode::OK, [(cookie_name, cookie_value)], body).into_response())
}
