use axum::{Json,
    http::StatusCode,
    response::IntoResponse
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unconfigured => {
                AppError::Configuration("Storage credentials are not configured".to_string())
            }
            other => AppError::Upload(format!("Upload failed: {other}")),
        }
    }
}

/// Convert `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Map application errors to HTTP status codes and messages
        let (status, detail) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Multipart(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Upload(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Database(err) => {
                tracing::error!("Database Error: {:}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        // Return standardized JSON error response
        let body = Json(json!({"detail": detail}));
        (status, body).into_response()
    }
}
