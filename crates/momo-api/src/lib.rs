//! # momo-api
//!
//! HTTP API layer for the momo-sim mobile-money payment simulator.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Per-client rate limiting and an optional API-key gate
//! - The payment simulation endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Banner |
//! | GET | `/health` | Health check |
//! | POST | `/api/payments/simulate` | Simulate a payment |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::{AppConfig, AppState, ConfigError, LogFormat};
