use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::core::{TweetId, UserId};

#[derive(Debug)]
pub enum AppError {
    // Expected, user-facing failures
    Unauthorized,
    NoSuchUser(UserId),
    NoSuchTweet(TweetId),
    NoSuchLike(TweetId),
    NoSuchFollow(UserId),
    SelfFollow,
    DuplicateFollow(UserId),
    DuplicateLike(TweetId),
    DuplicateApiKey,
    Forbidden(TweetId),
    BadMedia(String),
    Validation(String),
    // Internal failures, never shown to the caller
    DatabaseError(String),
    Internal(String),
}

impl AppError {
    /// Stable name of the failure kind, sent as `error_type`
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Unauthorized",
            AppError::NoSuchUser(_) => "NoSuchUser",
            AppError::NoSuchTweet(_) => "NoSuchTweet",
            AppError::NoSuchLike(_) => "NoSuchLike",
            AppError::NoSuchFollow(_) => "NoSuchFollow",
            AppError::SelfFollow => "SelfFollow",
            AppError::DuplicateFollow(_) => "DuplicateFollow",
            AppError::DuplicateLike(_) => "DuplicateLike",
            AppError::DuplicateApiKey => "DuplicateApiKey",
            AppError::Forbidden(_) => "Forbidden",
            AppError::BadMedia(_) => "BadMedia",
            AppError::Validation(_) => "Validation",
            AppError::DatabaseError(_) | AppError::Internal(_) => "Internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NoSuchUser(_)
            | AppError::NoSuchTweet(_)
            | AppError::NoSuchLike(_)
            | AppError::NoSuchFollow(_) => StatusCode::NOT_FOUND,
            AppError::SelfFollow
            | AppError::DuplicateFollow(_)
            | AppError::DuplicateLike(_)
            | AppError::DuplicateApiKey
            | AppError::BadMedia(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::Internal(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "Missing or invalid API key"),
            AppError::NoSuchUser(id) => write!(f, "User {} not found", id),
            AppError::NoSuchTweet(id) => write!(f, "Tweet {} not found", id),
            AppError::NoSuchLike(id) => write!(f, "Tweet {} is not liked by this user", id),
            AppError::NoSuchFollow(id) => write!(f, "Not following user {}", id),
            AppError::SelfFollow => write!(f, "A user cannot follow themselves"),
            AppError::DuplicateFollow(id) => write!(f, "Already following user {}", id),
            AppError::DuplicateLike(id) => write!(f, "Tweet {} is already liked", id),
            AppError::DuplicateApiKey => write!(f, "API key is already registered"),
            AppError::Forbidden(id) => write!(f, "Tweet {} belongs to another user", id),
            AppError::BadMedia(msg) => write!(f, "Unsupported media: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = if self.is_internal() {
            tracing::error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "result": false,
            "error_type": self.kind(),
            "error_message": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
