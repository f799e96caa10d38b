//! # Request Validation
//!
//! Turns a sanitized JSON body into a [`PaymentRequest`], or collects one
//! [`FieldError`] per rejected field.

use crate::error::{FieldError, SimulatorError, SimulatorResult};
use crate::rules::ValidationRules;
use crate::transaction::PaymentRequest;
use serde_json::{Number, Value};

const AMOUNT_MESSAGE: &str = "Amount must be a number greater than 0.";

/// Validate a payment request body.
///
/// Every field is checked even after the first failure, so clients see
/// all problems at once.
pub fn validate_request(body: &Value, rules: &ValidationRules) -> SimulatorResult<PaymentRequest> {
    let Some(fields) = body.as_object() else {
        return Err(SimulatorError::Validation(vec![FieldError::new(
            "body",
            "Request body must be a JSON object.",
        )]));
    };

    let mut errors = Vec::new();

    let phone = fields.get("phone");
    let phone = match phone.and_then(Value::as_str).map(str::trim) {
        Some(p) if rules.phone_matches(p) => Some(p.to_string()),
        _ => {
            errors.push(FieldError::new("phone", rules.phone_message()).with_value(phone));
            None
        }
    };

    let amount = fields.get("amount");
    let parsed_amount = amount.and_then(parse_amount);
    if parsed_amount.is_none() {
        errors.push(FieldError::new("amount", AMOUNT_MESSAGE).with_value(amount));
    }

    let provider = fields.get("provider");
    let provider = match provider.and_then(Value::as_str) {
        Some(p) if rules.provider_allowed(p) => Some(p.to_string()),
        _ => {
            errors.push(FieldError::new("provider", rules.provider_message()).with_value(provider));
            None
        }
    };

    match (phone, parsed_amount, provider) {
        (Some(phone), Some(amount), Some(provider)) if errors.is_empty() => Ok(PaymentRequest {
            phone,
            amount,
            provider,
        }),
        _ => Err(SimulatorError::Validation(errors)),
    }
}

/// Largest integer an `f64` holds exactly (2^53)
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Accept a positive finite JSON number or numeric string
fn parse_amount(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) if n.is_f64() => n.as_f64().and_then(positive_number),
        Value::Number(n) => (n.as_f64()? > 0.0).then(|| n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(whole) = s.parse::<u64>() {
                return (whole > 0).then(|| Number::from(whole));
            }
            s.parse::<f64>().ok().and_then(positive_number)
        }
        _ => None,
    }
}

/// Integral values come back as JSON integers, so `"1e3"` echoes as `1000`
fn positive_number(v: f64) -> Option<Number> {
    if !v.is_finite() || v <= 0.0 {
        return None;
    }
    if v.fract() == 0.0 && v <= MAX_EXACT_INTEGER {
        return Some(Number::from(v as u64));
    }
    Number::from_f64(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    fn errors_of(body: Value) -> Vec<FieldError> {
        match validate_request(&body, &rules()) {
            Err(SimulatorError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn paths(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_valid_request() {
        let req = validate_request(
            &json!({ "phone": "22912345678", "amount": 5000, "provider": "MTN" }),
            &rules(),
        )
        .unwrap();

        assert_eq!(req.phone, "22912345678");
        assert_eq!(req.amount, Number::from(5000));
        assert_eq!(req.provider, "MTN");
    }

    #[test]
    fn test_phone_is_trimmed() {
        let req = validate_request(
            &json!({ "phone": "  22912345678 ", "amount": 1, "provider": "Moov" }),
            &rules(),
        )
        .unwrap();
        assert_eq!(req.phone, "22912345678");
    }

    #[test]
    fn test_empty_body_reports_every_field() {
        let errors = errors_of(json!({}));
        assert_eq!(paths(&errors), vec!["phone", "amount", "provider"]);
        assert!(errors.iter().all(|e| e.value.is_none()));
    }

    #[test]
    fn test_non_object_body() {
        for body in [json!([1, 2]), json!("text"), json!(null), json!(42)] {
            let errors = errors_of(body);
            assert_eq!(paths(&errors), vec!["body"]);
        }
    }

    #[test]
    fn test_bad_phone() {
        for phone in [
            json!("12345678"),
            json!("2291234567"),
            json!("22912345678a"),
            json!("+22912345678"),
            json!(22912345678u64),
        ] {
            let errors = errors_of(json!({ "phone": phone.clone(), "amount": 10, "provider": "MTN" }));
            assert_eq!(paths(&errors), vec!["phone"]);
            assert_eq!(errors[0].value, Some(phone));
            assert_eq!(
                errors[0].msg,
                "Phone number must start with 229 followed by 8 digits."
            );
        }
    }

    #[test]
    fn test_bad_amount() {
        for amount in [
            json!(0),
            json!(-5),
            json!(-0.01),
            json!("0"),
            json!("abc"),
            json!("NaN"),
            json!("inf"),
            json!(""),
            json!(true),
            json!(null),
            json!([100]),
        ] {
            let errors = errors_of(json!({ "phone": "22912345678", "amount": amount.clone(), "provider": "MTN" }));
            assert_eq!(paths(&errors), vec!["amount"], "amount {:?}", amount);
        }
    }

    #[test]
    fn test_numeric_string_amount() {
        let req = validate_request(
            &json!({ "phone": "22912345678", "amount": "2500", "provider": "MTN" }),
            &rules(),
        )
        .unwrap();
        assert_eq!(req.amount, Number::from(2500));

        let req = validate_request(
            &json!({ "phone": "22912345678", "amount": " 99.5 ", "provider": "MTN" }),
            &rules(),
        )
        .unwrap();
        assert_eq!(req.amount.as_f64(), Some(99.5));
    }

    #[test]
    fn test_integral_amount_stays_integral() {
        for amount in [json!("1e3"), json!("1000.0"), json!(1e3), json!(1000.0)] {
            let req = validate_request(
                &json!({ "phone": "22912345678", "amount": amount.clone(), "provider": "MTN" }),
                &rules(),
            )
            .unwrap();
            assert_eq!(req.amount, Number::from(1000u64), "amount {:?}", amount);
            assert_eq!(req.amount.to_string(), "1000");
        }
    }

    #[test]
    fn test_fractional_amount() {
        let req = validate_request(
            &json!({ "phone": "22912345678", "amount": 0.5, "provider": "Moov" }),
            &rules(),
        )
        .unwrap();
        assert_eq!(req.amount.as_f64(), Some(0.5));
    }

    #[test]
    fn test_bad_provider() {
        for provider in [json!("Orange"), json!("mtn"), json!(" MTN"), json!(1)] {
            let errors = errors_of(json!({ "phone": "22912345678", "amount": 10, "provider": provider }));
            assert_eq!(paths(&errors), vec!["provider"]);
            assert_eq!(errors[0].msg, "Invalid provider (Moov or MTN).");
        }
    }

    #[test]
    fn test_multiple_failures() {
        let errors = errors_of(json!({ "phone": "1", "amount": -1, "provider": "X" }));
        assert_eq!(paths(&errors), vec!["phone", "amount", "provider"]);
    }

    #[test]
    fn test_custom_rules() {
        let rules = ValidationRules {
            phone_prefix: "221".into(),
            phone_digits: 9,
            providers: vec!["Wave".into()],
        };
        let req = validate_request(
            &json!({ "phone": "221771234567", "amount": 100, "provider": "Wave" }),
            &rules,
        )
        .unwrap();
        assert_eq!(req.provider, "Wave");
    }
}
