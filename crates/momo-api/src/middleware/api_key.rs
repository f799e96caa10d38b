//! # Access Gate
//!
//! Static API-key check for the payment route.
//!
//! When `API_KEY` is unset the gate lets everything through. That is the
//! development default and must not ship to production: the server logs a
//! warning at startup whenever it runs without a key.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use momo_core::SimulatorError;
use serde::Deserialize;
use tracing::warn;

/// Header carrying the client key
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Default, Deserialize)]
struct ApiKeyParams {
    #[serde(default)]
    api_key: Option<String>,
}

/// Key presented by the client: the header if non-empty, else `?api_key=`
pub fn presented_key(request: &Request) -> Option<String> {
    let from_header = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        Query::<ApiKeyParams>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(params)| params.api_key)
            .filter(|v| !v.is_empty())
    })
}

/// Middleware: reject requests whose key does not match the configured secret
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(request).await;
    };

    match presented_key(&request) {
        Some(key) if key == expected => next.run(request).await,
        presented => {
            warn!(
                path = %request.uri().path(),
                key_present = presented.is_some(),
                "rejected request with invalid API key"
            );
            ApiError::from(SimulatorError::Unauthorized).into_response()
        }
    }
}
