//! Error types for gra-api
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}` with
//! the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::ImportError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// CSV import failure
    #[error(transparent)]
    Import(#[from] ImportError),

    /// gra-common error (store, config, validation)
    #[error(transparent)]
    Common(#[from] gra_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Import(ImportError::MissingColumns(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_CSV")
            }
            ApiError::Import(ImportError::Store(err)) | ApiError::Common(err) => {
                match err {
                    gra_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                    gra_common::Error::Database(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
                }
            }
            ApiError::Import(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IMPORT_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = match &self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!(code = error_code, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
