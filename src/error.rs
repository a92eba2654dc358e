//! Error types for the target router

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes returned in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    InvalidEvent = 2,
    NoSuchTarget = 3,
    BadValue = 4,
    StoreFailure = 5,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Decision request with a missing or malformed timestamp or geo state
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The target repository or counter store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidEvent(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidEvent, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchTarget, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::StoreFailure,
                    "Store unavailable".to_string(),
                )
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreFailure,
                    "Stored record could not be decoded".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
