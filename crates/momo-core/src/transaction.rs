//! # Transaction Types
//!
//! Validated payment requests and the simulated transactions built from them.
//! Nothing here is persisted; a transaction lives for one request.

use crate::outcome::PaymentStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every generated transaction id
pub const TRANSACTION_ID_PREFIX: &str = "TX-";

/// A payment request that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Trimmed phone number (prefix + digits)
    pub phone: String,

    /// Strictly positive amount, kept as a JSON number so it echoes unchanged
    pub amount: serde_json::Number,

    /// Provider from the allow-list
    pub provider: String,
}

/// Outcome of one simulated payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedTransaction {
    /// `TX-` followed by the Unix time in milliseconds
    pub transaction_id: String,

    pub phone: String,

    pub amount: serde_json::Number,

    pub provider: String,

    pub status: PaymentStatus,

    /// ISO-8601 UTC, millisecond precision
    pub timestamp: String,
}

impl SimulatedTransaction {
    /// Build a transaction for `request` with the drawn `status`.
    ///
    /// The id and the timestamp are both derived from `now`.
    pub fn new(request: PaymentRequest, status: PaymentStatus, now: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction_id_at(now),
            phone: request.phone,
            amount: request.amount,
            provider: request.provider,
            status,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Client-facing message for this outcome
    pub fn message(&self) -> String {
        match self.status {
            PaymentStatus::Success => format!(
                "Payment of {} via {} succeeded.",
                self.amount, self.provider
            ),
            PaymentStatus::Failed => "Payment declined.".to_string(),
            PaymentStatus::Pending => "Payment in progress (PENDING).".to_string(),
        }
    }

    /// HTTP status code for this outcome
    pub fn http_status(&self) -> u16 {
        self.status.http_status()
    }
}

/// Transaction id for a given instant
pub fn transaction_id_at(now: DateTime<Utc>) -> String {
    format!("{}{}", TRANSACTION_ID_PREFIX, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> PaymentRequest {
        PaymentRequest {
            phone: "22912345678".to_string(),
            amount: serde_json::Number::from(5000),
            provider: "MTN".to_string(),
        }
    }

    fn at_millis(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_id_and_timestamp_share_clock() {
        let now = at_millis(1_735_732_800_123);
        let tx = SimulatedTransaction::new(request(), PaymentStatus::Success, now);

        assert_eq!(tx.transaction_id, "TX-1735732800123");
        assert_eq!(tx.timestamp, "2025-01-01T12:00:00.123Z");
    }

    #[test]
    fn test_ids_differ_across_milliseconds() {
        let a = transaction_id_at(at_millis(1_000));
        let b = transaction_id_at(at_millis(1_001));
        assert_ne!(a, b);
        assert!(a.starts_with(TRANSACTION_ID_PREFIX));
    }

    #[test]
    fn test_messages() {
        let now = at_millis(0);
        let ok = SimulatedTransaction::new(request(), PaymentStatus::Success, now);
        assert_eq!(ok.message(), "Payment of 5000 via MTN succeeded.");
        assert_eq!(ok.http_status(), 200);

        let declined = SimulatedTransaction::new(request(), PaymentStatus::Failed, now);
        assert_eq!(declined.message(), "Payment declined.");
        assert_eq!(declined.http_status(), 402);

        let pending = SimulatedTransaction::new(request(), PaymentStatus::Pending, now);
        assert_eq!(pending.message(), "Payment in progress (PENDING).");
        assert_eq!(pending.http_status(), 202);
    }

    #[test]
    fn test_fractional_amount_in_message() {
        let mut req = request();
        req.amount = serde_json::Number::from_f64(12.5).unwrap();
        let tx = SimulatedTransaction::new(req, PaymentStatus::Success, at_millis(0));
        assert_eq!(tx.message(), "Payment of 12.5 via MTN succeeded.");
    }

    #[test]
    fn test_wire_shape() {
        let tx = SimulatedTransaction::new(request(), PaymentStatus::Pending, at_millis(0));
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["transactionId"], "TX-0");
        assert_eq!(json["phone"], "22912345678");
        assert_eq!(json["amount"], 5000);
        assert_eq!(json["provider"], "MTN");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00.000Z");
    }
}
