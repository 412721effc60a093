//! Unified error handling
//!
//! Provides the application error type and response envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response structure
//!
//! # Error code scheme
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E1xxx  | Authentication | E1001 not logged in |
//! | E2xxx  | Authorization | E2001 permission denied |
//! | E4xxx-E8xxx | Business rules | E6001 insufficient copies |
//! | E9xxx  | System | E9002 database error |
//!
//! Business-rule errors carry a [`shared::ErrorCode`] so API clients can
//! branch on the numeric code instead of the message text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ErrorCode;
use tracing::error;

use crate::db::repository::RepoError;

/// Unified API response structure
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 means success)
    pub code: String,
    /// Message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{1}")]
    Business(ErrorCode, String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_code(ErrorCode::NotAuthenticated),
                "Please login first".to_string(),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                error_code(ErrorCode::TokenExpired),
                "Token expired".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                error_code(ErrorCode::TokenInvalid),
                "Invalid token".to_string(),
            ),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                error_code(ErrorCode::PermissionDenied),
                msg.clone(),
            ),

            // Not found (404)
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                error_code(ErrorCode::NotFound),
                msg.clone(),
            ),

            // Conflict (409)
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                error_code(ErrorCode::AlreadyExists),
                msg.clone(),
            ),

            // Validation (400)
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                error_code(ErrorCode::ValidationFailed),
                msg.clone(),
            ),

            // Business rule (422)
            AppError::Business(code, msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, error_code(*code), msg.clone())
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_code(ErrorCode::DatabaseError),
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_code(ErrorCode::InternalError),
                    "Internal server error".to_string(),
                )
            }

            // Invalid request (400)
            AppError::Invalid(msg) => (
                StatusCode::BAD_REQUEST,
                error_code(ErrorCode::InvalidRequest),
                msg.clone(),
            ),
        };

        let body = Json(AppResponse::<()> {
            code,
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

fn error_code(code: ErrorCode) -> String {
    format!("E{:04}", code.code())
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token() -> Self {
        Self::InvalidToken
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn business(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::Business(code, msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create an invalid credentials error with unified message
    /// Used to prevent username enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::Business(
            ErrorCode::InvalidCredentials,
            "Invalid username or password".to_string(),
        )
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Business(code, msg) => AppError::Business(code, msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}
