//! # Simulator Error Types
//!
//! Typed error handling for the payment simulator.
//! Every failure a caller can observe maps to exactly one HTTP status.

use serde::Serialize;
use thiserror::Error;

/// A single rejected field in a payment request body.
///
/// Serialized in the same shape for every field so clients can key
/// error messages by `path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Always `"field"`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Where the field was read from (`"body"`)
    pub location: &'static str,
    /// Field name (`phone`, `amount`, `provider`, or `body` for the whole payload)
    pub path: String,
    /// Human readable reason
    pub msg: String,
    /// The sanitized value that was received, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            kind: "field",
            location: "body",
            path: path.into(),
            msg: msg.into(),
            value: None,
        }
    }

    /// Builder: attach the offending value
    pub fn with_value(mut self, value: Option<&serde_json::Value>) -> Self {
        self.value = value.cloned();
        self
    }
}

/// Core error type for all simulator operations
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// One or more request fields failed validation
    #[error("Invalid payment data")]
    Validation(Vec<FieldError>),

    /// Access gate rejected the request
    #[error("Access denied: invalid API key.")]
    Unauthorized,

    /// Client exceeded its request ceiling for the current window
    #[error("Too many requests. Try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    /// Request body exceeded the configured limit
    #[error("Request body too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    /// Configuration errors (bad rules file, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unexpected failure; details are logged, never returned to clients
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimulatorError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SimulatorError::Validation(_) => 400,
            SimulatorError::Unauthorized => 401,
            SimulatorError::RateLimited { .. } => 429,
            SimulatorError::PayloadTooLarge { .. } => 413,
            SimulatorError::Configuration(_) => 500,
            SimulatorError::Internal(_) => 500,
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Server-side failures collapse to a generic text.
    pub fn public_message(&self) -> String {
        match self {
            SimulatorError::Configuration(_) | SimulatorError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Field errors for validation failures, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SimulatorError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

/// Result type alias for simulator operations
pub type SimulatorResult<T> = Result<T, SimulatorError>;
