//! # momo-core
//!
//! Core types for the momo-sim mobile-money payment simulator.
//!
//! This crate provides:
//! - `PaymentRequest` and `SimulatedTransaction` for the request/response cycle
//! - `ValidationRules` and `validate_request` for body validation
//! - `sanitize` for stripping operator keys and markup from raw JSON
//! - `decide_outcome` and the `OutcomeSource` trait for the random draw
//! - `SimulatorError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use momo_core::{decide_outcome, validate_request, SimulatedTransaction, ValidationRules};
//!
//! let rules = ValidationRules::default();
//! let request = validate_request(&body, &rules)?;
//!
//! let status = decide_outcome(0.42);
//! let transaction = SimulatedTransaction::new(request, status, chrono::Utc::now());
//!
//! assert_eq!(transaction.status.http_status(), 200);
//! ```

pub mod error;
pub mod outcome;
pub mod rules;
pub mod sanitize;
pub mod transaction;
pub mod validate;

// Re-exports for convenience
pub use error::{FieldError, SimulatorError, SimulatorResult};
pub use outcome::{
    decide_outcome, FixedOutcomeSource, OutcomeSource, PaymentStatus, SharedOutcomeSource,
    ThreadRngOutcomeSource,
};
pub use rules::ValidationRules;
pub use sanitize::sanitize;
pub use transaction::{PaymentRequest, SimulatedTransaction, TRANSACTION_ID_PREFIX};
pub use validate::validate_request;
