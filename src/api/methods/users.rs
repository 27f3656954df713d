use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::{
        extractors::ModeratorUser,
        types::{SetBannedRequest, SetModeratorRequest, UserSummary},
    },
    error::Result,
    infrastructure::db::repositories::UserRepository,
};

/// `PUT /users/{id}/banned` (moderator only). Banning rotates `key_salt`, invalidating
/// every token the user currently holds in O(1) — the same mechanism logout uses.
pub async fn set_banned(
    State(state): State<AppState>,
    _moderator: ModeratorUser,
    Path(user_id): Path<i64>,
    Json(body): Json<SetBannedRequest>,
) -> Result<Json<UserSummary>> {
    let user =
        UserRepository::set_banned(state.db.get_connection(), user_id, body.is_banned).await?;
    Ok(Json(user.into()))
}

/// `PUT /users/{id}/moderator` (moderator only).
pub async fn set_moderator(
    State(state): State<AppState>,
    _moderator: ModeratorUser,
    Path(user_id): Path<i64>,
    Json(body): Json<SetModeratorRequest>,
) -> Result<Json<UserSummary>> {
    let user = UserRepository::set_moderator(state.db.get_connection(), user_id, body.is_moderator)
        .await?;
    Ok(Json(user.into()))
}
