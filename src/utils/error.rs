//! Error Handling Utilities
//!
//! The HTTP-facing error envelope shared by every handler. Domain errors
//! (auth, tracks, storage) live next to the services that raise them and
//! convert into [`AppError`] at the API boundary, so this is the only place
//! that knows about status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

/// Application error type that every handler funnels into
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-policy input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or failed credentials, including session tokens
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// No account or resource matches the request
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A unique field (email, username) is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Well-formed request that cannot be honored (bad code, dead token)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Media storage or mail relay failure
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Anything that should never reach users in detail
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status the error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients to branch on
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show the caller
    ///
    /// Internal and upstream failures are masked; the original text goes to
    /// the log instead.
    fn client_message(self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg,
            AppError::ExternalService(msg) => {
                warn!("external service failure: {}", msg);
                "External service unavailable".to_string()
            }
            AppError::Internal(msg) => {
                error!("internal error: {}", msg);
                "An internal server error occurred".to_string()
            }
        }
    }
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details, e.g. per-field validation findings
    pub fn detailed(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = ErrorResponse::new(code, self.client_message());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let (status, body) = response_parts(AppError::Conflict("The email is taken".into())).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");
        assert_eq!(body["message"], "The email is taken");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let (status, body) =
            response_parts(AppError::Internal("connection pool exhausted".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_upstream_failures_read_as_bad_gateway() {
        let (status, body) =
            response_parts(AppError::ExternalService("smtp timeout".into())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "EXTERNAL_SERVICE_ERROR");
        assert_eq!(body["message"], "External service unavailable");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Authentication("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_response_details() {
        let details = serde_json::json!({"field": "email"});
        let body = ErrorResponse::new("VALIDATION_ERROR", "Invalid input")
            .detailed(details.clone());

        assert_eq!(body.error, "VALIDATION_ERROR");
        assert_eq!(body.details, Some(details));
    }
}
