//! # Request Handlers
//!
//! Axum request handlers for the simulator API.

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use momo_core::{
    sanitize, validate_request, FieldError, SimulatedTransaction, SimulatorError,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

/// Plain-text banner served at `/`
pub const BANNER: &str = "Mobile Money payment simulator (secured)";

// =============================================================================
// Response Types
// =============================================================================

/// Simulated payment response: the transaction plus a client message
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub transaction: SimulatedTransaction,
    pub message: String,
}

impl From<SimulatedTransaction> for PaymentResponse {
    fn from(transaction: SimulatedTransaction) -> Self {
        let message = transaction.message();
        Self {
            transaction,
            message,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness banner
pub async fn banner() -> &'static str {
    BANNER
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let access = if state.config.access_gate_enabled() {
        "api-key"
    } else {
        "open"
    };

    Json(serde_json::json!({
        "status": "healthy",
        "service": "momo-sim",
        "version": env!("CARGO_PKG_VERSION"),
        "access": access
    }))
}

/// Simulate a mobile-money payment.
///
/// Sanitizes and validates the body, draws an outcome and answers with
/// 200 (`SUCCESS`), 402 (`FAILED`) or 202 (`PENDING`).
#[instrument(skip_all)]
pub async fn simulate_payment(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let body = body.map_err(|rejection| body_rejection(rejection, state.config.body_limit))?;
    let mut payload = parse_body(&body)?;
    sanitize(&mut payload);

    let request = validate_request(&payload, &state.rules)?;

    let status = state.outcomes.next_outcome();
    let transaction = SimulatedTransaction::new(request, status, chrono::Utc::now());

    info!(
        transaction_id = %transaction.transaction_id,
        phone = %transaction.phone,
        amount = %transaction.amount,
        provider = %transaction.provider,
        status = %transaction.status,
        timestamp = %transaction.timestamp,
        "simulated transaction"
    );

    let code = StatusCode::from_u16(transaction.http_status())
        .map_err(|e| SimulatorError::Internal(e.to_string()))?;

    Ok((code, Json(PaymentResponse::from(transaction))))
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

/// Fallback for known routes called with the wrong method
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

/// Empty bodies count as `{}` so the validator reports each missing field
fn parse_body(body: &[u8]) -> Result<Value, SimulatorError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_slice(body).map_err(|_| {
        SimulatorError::Validation(vec![FieldError::new(
            "body",
            "Request body must be valid JSON.",
        )])
    })
}

fn body_rejection(rejection: BytesRejection, limit: usize) -> SimulatorError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SimulatorError::PayloadTooLarge { limit }
    } else {
        SimulatorError::Validation(vec![FieldError::new(
            "body",
            "Request body could not be read.",
        )])
    }
}
