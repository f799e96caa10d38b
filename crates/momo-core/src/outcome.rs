//! # Outcome Draw
//!
//! Decides how a simulated payment ends.
//!
//! A single uniform draw in `[0, 1)` is compared against two fixed
//! thresholds:
//!
//! ```text
//!  0.0                         0.80          0.95     1.0
//!   ├────────── SUCCESS ─────────┼── FAILED ───┼─PENDING─┤
//! ```
//!
//! The draw itself comes from an [`OutcomeSource`], so callers can swap the
//! thread RNG for a fixed value when they need a deterministic outcome.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Draws below this value succeed
pub const SUCCESS_THRESHOLD: f64 = 0.80;

/// Draws below this value (and not below [`SUCCESS_THRESHOLD`]) fail
pub const FAILURE_THRESHOLD: f64 = 0.95;

/// Final state of a simulated payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment confirmed
    Success,
    /// Payment declined by the operator
    Failed,
    /// Neither confirmed nor declined yet
    Pending,
}

impl PaymentStatus {
    /// HTTP status code returned for this outcome
    pub fn http_status(&self) -> u16 {
        match self {
            PaymentStatus::Success => 200,
            PaymentStatus::Failed => 402,
            PaymentStatus::Pending => 202,
        }
    }

    /// Wire name (`SUCCESS`, `FAILED`, `PENDING`)
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Pending => "PENDING",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a uniform draw to an outcome.
///
/// Values outside `[0, 1)` are not rejected: anything at or above
/// [`FAILURE_THRESHOLD`] (and NaN) is `Pending`.
pub fn decide_outcome(draw: f64) -> PaymentStatus {
    if draw < SUCCESS_THRESHOLD {
        PaymentStatus::Success
    } else if draw < FAILURE_THRESHOLD {
        PaymentStatus::Failed
    } else {
        PaymentStatus::Pending
    }
}

/// Source of uniform draws in `[0, 1)`.
pub trait OutcomeSource: Send + Sync {
    /// Produce the next draw
    fn draw(&self) -> f64;

    /// Draw and map to an outcome
    fn next_outcome(&self) -> PaymentStatus {
        decide_outcome(self.draw())
    }
}

/// Type alias for a shared outcome source (dynamic dispatch)
pub type SharedOutcomeSource = Arc<dyn OutcomeSource>;

/// Production source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngOutcomeSource;

impl OutcomeSource for ThreadRngOutcomeSource {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Source that always returns the same draw
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcomeSource(pub f64);

impl FixedOutcomeSource {
    /// A source whose draw lands on `status`
    pub fn always(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Success => Self(0.0),
            PaymentStatus::Failed => Self(SUCCESS_THRESHOLD),
            PaymentStatus::Pending => Self(FAILURE_THRESHOLD),
        }
    }
}

impl OutcomeSource for FixedOutcomeSource {
    fn draw(&self) -> f64 {
        self.0
    }
}
