//! # API Errors
//!
//! HTTP rendering of [`SimulatorError`]. Every error body carries a
//! `message`; validation failures add the per-field `errors` list.
//! Server-side failures are logged with their details and answered with a
//! generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use momo_core::{FieldError, SimulatorError};
use serde::Serialize;
use std::any::Any;
use tracing::error;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Handler-level error, rendered as a JSON response
#[derive(Debug)]
pub struct ApiError(pub SimulatorError);

impl From<SimulatorError> for ApiError {
    fn from(err: SimulatorError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self.0);
        }

        let mut body = ErrorResponse::new(self.0.public_message());
        if let SimulatorError::Validation(errors) = self.0 {
            body = body.with_errors(errors);
        }

        (status, Json(body)).into_response()
    }
}

/// Response for a panicking handler
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ApiError(SimulatorError::Internal(format!("handler panicked: {}", detail))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let body = serde_json::to_value(ErrorResponse::new("Test error")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Test error" }));
    }

    #[test]
    fn test_status_conversion() {
        assert_eq!(
            ApiError(SimulatorError::Validation(vec![])).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(SimulatorError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(SimulatorError::RateLimited {
                retry_after_secs: 1
            })
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError(SimulatorError::PayloadTooLarge { limit: 1 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError(SimulatorError::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_panic_response_is_generic() {
        let response = panic_response(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
