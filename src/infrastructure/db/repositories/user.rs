use rand::{Rng, distr::Alphanumeric};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};

use crate::{
    error::{AppError, Result},
    infrastructure::db::entities::{User, user},
};

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id<C: ConnectionTrait>(
        connection: &C,
        user_id: i64,
    ) -> Result<Option<user::Model>> {
        Ok(User::find_by_id(user_id).one(connection).await?)
    }

    /// Ensures a user row exists for `user_id`, rotating its `key_salt` so that any
    /// previously issued token is invalidated. Mirrors `reset_user_token` from the
    /// system this was distilled from, minus its two SQL bugs: a trailing comma in the
    /// user-state SELECT, and an `ON CONFLICT` VALUES clause that referenced the user id
    /// parameter twice instead of the salt parameter.
    pub async fn rotate_salt<C: ConnectionTrait>(
        connection: &C,
        user_id: i64,
        display_name_seed: &str,
        is_moderator_seed: bool,
    ) -> Result<user::Model> {
        let existing = Self::find_by_id(connection, user_id).await?;
        if let Some(ref user) = existing
            && user.is_banned
        {
            return Err(AppError::Banned);
        }

        let key_salt = generate_salt();
        let active = user::ActiveModel {
            user_id: Set(user_id),
            display_name: Set(existing
                .as_ref()
                .map(|u| u.display_name.clone())
                .unwrap_or_else(|| display_name_seed.to_string())),
            key_salt: Set(key_salt),
            is_moderator: Set(existing
                .as_ref()
                .map(|u| u.is_moderator)
                .unwrap_or(is_moderator_seed)),
            is_banned: Set(false),
            pixels_completed: Set(existing.as_ref().map(|u| u.pixels_completed).unwrap_or(0)),
        };

        User::insert(active)
            .on_conflict(
                OnConflict::column(user::Column::UserId)
                    .update_column(user::Column::KeySalt)
                    .to_owned(),
            )
            .exec_with_returning(connection)
            .await
            .map_err(AppError::from)
    }

    pub async fn set_banned<C: ConnectionTrait>(
        connection: &C,
        user_id: i64,
        banned: bool,
    ) -> Result<user::Model> {
        let user = Self::find_by_id(connection, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let mut active: user::ActiveModel = user.into();
        active.is_banned = Set(banned);
        if banned {
            active.key_salt = Set(generate_salt());
        }
        Ok(active.update(connection).await?)
    }

    pub async fn set_moderator<C: ConnectionTrait>(
        connection: &C,
        user_id: i64,
        is_moderator: bool,
    ) -> Result<user::Model> {
        let user = Self::find_by_id(connection, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let mut active: user::ActiveModel = user.into();
        active.is_moderator = Set(is_moderator);
        Ok(active.update(connection).await?)
    }

    pub async fn increment_pixels_completed<C: ConnectionTrait>(
        connection: &C,
        user_id: i64,
    ) -> Result<()> {
        if let Some(user) = Self::find_by_id(connection, user_id).await? {
            let mut active: user::ActiveModel = user.into();
            active.pixels_completed = Set(active.pixels_completed.unwrap() + 1);
            active.update(connection).await?;
        }
        Ok(())
    }
}

/// 22-character URL-safe salt, matching `secrets.token_urlsafe(16)` from the system this
/// was distilled from.
fn generate_salt() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(22)
        .map(char::from)
        .collect()
}
