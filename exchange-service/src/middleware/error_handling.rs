use crate::error::{AppError, ErrorResponse};
use axum::{http::StatusCode, response::IntoResponse, Json};

/// Map domain errors to HTTP responses
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => ("validation_error", "INVALID_REQUEST"),
        AppError::Unauthorized => ("authentication_error", "INVALID_CREDENTIALS"),
        AppError::Forbidden(_) => ("authorization_error", "FORBIDDEN"),
        AppError::NotFound(_) => ("not_found_error", "RESOURCE_NOT_FOUND"),
        AppError::InvalidState(_) => ("conflict_error", "INVALID_STATE_TRANSITION"),
        AppError::Database(_) => ("server_error", "DATABASE_ERROR"),
        AppError::Encryption(_) | AppError::CorruptCiphertext => {
            ("server_error", "ENCRYPTION_ERROR")
        }
        AppError::Config(_) | AppError::StartServer(_) | AppError::Internal => {
            ("server_error", "INTERNAL_SERVER_ERROR")
        }
    };

    let message = err.to_string();
    let response = ErrorResponse::new(
        match status {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        },
        &message,
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

pub fn into_response(err: AppError) -> impl IntoResponse {
    let (status, response) = map_error(&err);
    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_maps_to_conflict() {
        let (status, body) = map_error(&AppError::InvalidState(
            "cannot accept an exchange in status REJECTED".into(),
        ));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error_type, "conflict_error");
        assert!(body.message.contains("REJECTED"));
    }

    #[test]
    fn internal_details_do_not_leak_taxonomy() {
        let (status, body) = map_error(&AppError::Internal);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_SERVER_ERROR");
    }
}
