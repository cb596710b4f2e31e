//! Error types for cms-admin
//!
//! Every handler returns [`ApiResult`]. Errors render as
//! `{"error": {"code", "message", ...}}` with extra members for the
//! variants that carry structured detail (field errors, blocking
//! containers, retry hints).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cms_common::bulk::BlockedDelete;
use cms_common::validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No valid session (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Action not legal for the current state (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Containers still holding children were selected for deletion (409)
    #[error("Delete blocked for {} item(s)", .0.len())]
    DeleteBlocked(Vec<BlockedDelete>),

    /// Form validation failed (422)
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Content API call failed (502)
    #[error("Content API error: {0}")]
    Upstream(#[from] BackendError),

    /// Upload could not be forwarded; the client may retry (502)
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Draft database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<cms_common::Error> for ApiError {
    fn from(err: cms_common::Error) -> Self {
        use cms_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Validation(errors) => ApiError::Validation(errors),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Serialization(e) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error) = match self {
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                json!({"code": "BAD_REQUEST", "message": message}),
            ),
            ApiError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                json!({"code": "UNAUTHORIZED", "message": message}),
            ),
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({"code": "NOT_FOUND", "message": message}),
            ),
            ApiError::Conflict(_) => (
                StatusCode::CONFLICT,
                json!({"code": "CONFLICT", "message": message}),
            ),
            ApiError::DeleteBlocked(blocked) => (
                StatusCode::CONFLICT,
                json!({"code": "DELETE_BLOCKED", "message": message, "blocked": blocked}),
            ),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"code": "VALIDATION_FAILED", "message": message, "fields": errors}),
            ),
            ApiError::Upstream(err) => {
                tracing::warn!(error = %err, "Content API call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({"code": "UPSTREAM_ERROR", "message": message, "details": err.details()}),
                )
            }
            ApiError::UploadFailed(_) => (
                StatusCode::BAD_GATEWAY,
                json!({"code": "UPLOAD_FAILED", "message": message, "retry": true}),
            ),
            ApiError::Database(ref err) => {
                tracing::error!(error = %err, "Draft database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"code": "DATABASE_ERROR", "message": message}),
                )
            }
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"code": "INTERNAL_ERROR", "message": message}),
            ),
        };

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
