use crate::middleware::error_handling;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_handling::into_response(self).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("corrupt ciphertext")]
    CorruptCiphertext,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::InvalidState(_) => 409,
            AppError::Database(_)
            | AppError::Encryption(_)
            | AppError::CorruptCiphertext
            | AppError::Internal
            | AppError::Config(_)
            | AppError::StartServer(_) => 500,
        }
    }
}

/// Uniform API error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short HTTP reason phrase
    pub error: String,
    /// Human-readable description
    pub message: String,
    /// HTTP status code
    pub status: u16,
    /// Error family for client-side routing (e.g. "authorization_error")
    pub error_type: String,
    /// Stable machine code (e.g. "EXCHANGE_NOT_FOUND")
    pub code: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(AppError::Unauthorized.status_code(), 401);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
        assert_eq!(AppError::InvalidState("x".into()).status_code(), 409);
        assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::Internal.status_code(), 500);
        assert_eq!(AppError::CorruptCiphertext.status_code(), 500);
    }

    #[test]
    fn not_found_and_forbidden_are_distinguishable() {
        let not_found = AppError::NotFound("listing not found".into()).to_string();
        let forbidden = AppError::Forbidden("only the listing owner may accept".into()).to_string();
        assert_ne!(not_found, forbidden);
        assert!(not_found.contains("listing not found"));
        assert!(forbidden.contains("owner"));
    }
}
