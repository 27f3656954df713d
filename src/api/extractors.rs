use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState,
    error::AppError,
    infrastructure::db::entities::user,
    infrastructure::db::repositories::UserRepository,
};

/// An authenticated, non-banned caller. Grounded on the system's `authorized` check:
/// decode the bearer JWT, then confirm `salt == users.key_salt && !is_banned` against
/// the database rather than trusting the token's claims alone — salt rotation is the
/// sole revocation mechanism (§6), so every request must hit the DB to honor it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let TypedHeader(auth) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    AppError::NoToken
                } else {
                    AppError::BadHeader
                }
            })?;

        let claims = app_state.jwt_service.decode_token(auth.token())?;

        let connection = app_state.db.get_connection();
        let user = UserRepository::find_by_id(connection, claims.id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if user.key_salt != claims.salt {
            return Err(AppError::InvalidToken);
        }
        if user.is_banned {
            return Err(AppError::Banned);
        }

        Ok(AuthUser(user))
    }
}

/// Same as `AuthUser` but additionally requires `is_moderator` (§4.H moderator-only
/// endpoints: project CRUD, user ban/mod flags).
#[derive(Debug, Clone)]
pub struct ModeratorUser(pub user::Model);

impl<S> FromRequestParts<S> for ModeratorUser
where
    AppState: FromRef<S>,
    S: Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_moderator {
            return Err(AppError::NotModerator);
        }
        Ok(ModeratorUser(user))
    }
}
