//! # Middleware
//!
//! Request gates that run before the payment handler:
//! the per-client rate limiter (every route) and the API-key gate
//! (payment route only).

pub mod api_key;
pub mod rate_limit;

pub use api_key::require_api_key;
pub use rate_limit::{enforce_rate_limit, spawn_purge_task, RateLimitConfig, RateLimiter};
