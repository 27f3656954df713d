use serde::{Deserialize, Serialize};

use crate::infrastructure::db::entities::user;

/// Summary returned by moderator user-management endpoints and embedded in the OAuth
/// callback response.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: i64,
    pub display_name: String,
    pub is_moderator: bool,
    pub is_banned: bool,
    pub pixels_completed: i64,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            user_id: model.user_id,
            display_name: model.display_name,
            is_moderator: model.is_moderator,
            is_banned: model.is_banned,
            pixels_completed: model.pixels_completed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetBannedRequest {
    pub is_banned: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetModeratorRequest {
    pub is_moderator: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}
