//! Unified API error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::api::models::ErrorResponse;
use crate::error::RelayError;

/// API-specific error type.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Invalid request parameters or body.
    BadRequest(String),
    /// Internal server error.
    InternalError(String),
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Booking directory operation failed.
    DirectoryError(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::DirectoryError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message) = match self {
            Self::NotFound(msg) => ("not_found", msg),
            Self::BadRequest(msg) => ("bad_request", msg),
            Self::RateLimitExceeded => (
                "rate_limit_exceeded",
                "Rate limit exceeded. Please try again later.".to_string(),
            ),
            Self::DirectoryError(msg) => {
                error!(error = %msg, "Directory error in API handler");
                ("directory_error", "Booking directory operation failed".to_string())
            }
            Self::InternalError(msg) => {
                error!(error = %msg, "Internal error in API handler");
                ("internal_error", "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::DirectoryError { message, .. } => Self::DirectoryError(message),
            RelayError::ProtocolError { .. } | RelayError::HandshakeError { .. } => {
                Self::BadRequest(err.to_string())
            }
            _ => Self::InternalError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::RateLimitExceeded.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::DirectoryError(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_relay_error_conversion() {
        let err: ApiError = RelayError::directory("locked", None).into();
        assert!(matches!(err, ApiError::DirectoryError(msg) if msg == "locked"));

        let err: ApiError = RelayError::protocol("bad frame", None).into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = RelayError::config("bad port", None).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::NotFound("Professional 9 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
