use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Flat `Message` wire body (§6) — never a JSON-RPC envelope.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid params - {0}")]
    InvalidParams(String),

    #[error("Internal server error - {0}")]
    InternalServerError(String),

    #[error("Database error - {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Serialization error - {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed project image - {0}")]
    BadImage(String),

    #[error("No token supplied")]
    NoToken,

    #[error("Malformed authorization header")]
    BadHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account is banned")]
    Banned,

    #[error("Moderator-only endpoint")]
    NotModerator,

    #[error("User not found")]
    UserNotFound,

    #[error("Project not found")]
    ProjectNotFound,

    #[error("A project with this name already exists")]
    ProjectNameExists,

    #[error("You already have a task assigned")]
    AlreadyAssigned,

    #[error("No tasks available right now")]
    NoTasksAvailable,

    #[error("This task doesn't exist, it was likely already completed by someone else")]
    UnknownTask,

    #[error("This task doesn't belong to you")]
    NotYourTask,

    #[error("Submitted pixel does not match the canvas yet")]
    Unverified,

    #[error("Validation timed out, your lease may have expired")]
    ValidationTimeout,

    #[error("Upstream canvas service is temporarily unavailable")]
    CanvasUnavailable,

    #[error("Sign-in with the external provider failed - {0}")]
    OAuthFailed(String),

    #[error("Too many requests, try again in a moment")]
    RateLimitExceeded,

    #[error("TryInitError - {0}")]
    TryInitError(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NoToken | Self::BadHeader | Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::Banned => StatusCode::UNAUTHORIZED,
            Self::NotModerator => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::ProjectNotFound => StatusCode::NOT_FOUND,
            Self::ProjectNameExists => StatusCode::CONFLICT,
            Self::AlreadyAssigned
            | Self::NoTasksAvailable
            | Self::UnknownTask
            | Self::NotYourTask
            | Self::Unverified
            | Self::ValidationTimeout => StatusCode::CONFLICT,
            Self::InvalidParams(_) | Self::BadImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CanvasUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::OAuthFailed(_) => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::InternalServerError(_)
            | Self::TryInitError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_safe_message(&self) -> String {
        match self {
            Self::DatabaseError(error) => {
                tracing::error!(error = %error, "database error");
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            Self::SerializationError(error) => {
                tracing::error!(error = %error, "serialization error");
                "Internal server error".to_string()
            }
            Self::InternalServerError(error) => {
                tracing::error!(error = %error, "internal server error");
                "Internal server error".to_string()
            }
            Self::TryInitError(error) => {
                tracing::error!(error = %error, "tracing init error");
                "Internal server error".to_string()
            }
            Self::OAuthFailed(error) => {
                tracing::error!(error = %error, "oauth exchange failed");
                "Sign-in failed. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.user_safe_message();
        let body = serde_json::to_string(&Message { message })
            .unwrap_or_else(|_| r#"{"message":"Internal server error"}"#.to_string());

        (status, [("content-type", "application/json")], body).into_response()
    }
}
