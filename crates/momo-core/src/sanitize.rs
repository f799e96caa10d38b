//! # Input Sanitization
//!
//! Scrubs a parsed JSON body before validation:
//! - object keys starting with `$` or containing `.` are dropped, at any depth
//! - `<` and `>` inside strings are HTML-escaped

use serde_json::Value;

/// Sanitize a JSON value in place
pub fn sanitize(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !is_operator_key(key));
            for child in map.values_mut() {
                sanitize(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize(item);
            }
        }
        Value::String(text) => {
            if text.contains(['<', '>']) {
                *text = escape_markup(text);
            }
        }
        _ => {}
    }
}

fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_drops_operator_keys() {
        let mut body = json!({
            "phone": "22912345678",
            "$where": "1 == 1",
            "a.b": 1,
            "nested": { "$gt": "", "ok": true }
        });
        sanitize(&mut body);

        assert_eq!(
            body,
            json!({ "phone": "22912345678", "nested": { "ok": true } })
        );
    }

    #[test]
    fn test_escapes_markup() {
        let mut body = json!({
            "provider": "<script>alert(1)</script>",
            "list": ["<b>", "plain"]
        });
        sanitize(&mut body);

        assert_eq!(body["provider"], "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert_eq!(body["list"], json!(["&lt;b&gt;", "plain"]));
    }

    #[test]
    fn test_leaves_clean_values_alone() {
        let original = json!({ "phone": "22912345678", "amount": 5000, "provider": "MTN" });
        let mut body = original.clone();
        sanitize(&mut body);
        assert_eq!(body, original);
    }
}
