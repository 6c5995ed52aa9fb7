use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::application::services::media::MediaError;
use crate::application::use_cases::auth::AccountError;

/// Error returned by JSON handlers. Rendered as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,
    #[error("Not found.")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("Upload exceeds the maximum request size.")]
    PayloadTooLarge,
    #[error("File storage is unavailable.")]
    Storage(#[source] anyhow::Error),
    #[error("Internal server error.")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage(err) => tracing::error!(error = ?err, "request_storage_error"),
            ApiError::Internal(err) => tracing::error!(error = ?err, "request_internal_error"),
            _ => {}
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Validation(msg) => ApiError::BadRequest(msg),
            MediaError::OwnerNotFound => ApiError::NotFound,
            MediaError::Persistence(e) => ApiError::Internal(e),
            MediaError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Invalid(msg) => ApiError::BadRequest(msg),
            AccountError::UsernameTaken => {
                ApiError::Conflict("A user with that username already exists.".into())
            }
            AccountError::EmailTaken => {
                ApiError::Conflict("A user with that email already exists.".into())
            }
            AccountError::InvalidToken => {
                ApiError::BadRequest("Invalid or expired reset token.".into())
            }
            AccountError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            StatusCode::BAD_REQUEST => ApiError::BadRequest("Malformed request.".into()),
            other => ApiError::Internal(anyhow::anyhow!("unexpected status {other}")),
        }
    }
}
