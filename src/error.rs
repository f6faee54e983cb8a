use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    /// The mutation was applied in memory but could not be saved.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Course store is not initialized")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        AppError::BadRequest(format!("missing required fields: {}", fields.join(", ")))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotInitialized => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Course store is not initialized".to_string(),
            ),
            AppError::Storage(e) => {
                error!("storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Change applied but could not be saved".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::missing_fields(&["title"]), StatusCode::BAD_REQUEST),
            (AppError::NotInitialized, StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Storage(StorageError::Closed), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Config("bad".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
