//! Strategy 1: strict JSON (spec §4.1.1).
//!
//! The fast path. If `serde_json` accepts the entire input as one document,
//! that reading is authoritative and short-circuits the rest of the cascade.

use crate::value::Value;

/// Attempts to parse `input` as a complete, well-formed JSON document.
/// Returns `None` on any trailing data or syntax error, leaving recovery to
/// the later strategies.
pub fn try_parse(input: &str) -> Option<Value> {
    serde_json::from_str::<serde_json::Value>(input.trim())
        .ok()
        .map(Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_object() {
        let v = try_parse(r#"{"a": 1, "b": [true, null]}"#).unwrap();
        assert!(matches!(v, Value::Object(..)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(try_parse(r#"{"a": 1} extra"#).is_none());
    }

    #[test]
    fn rejects_unquoted_keys() {
        assert!(try_parse(r#"{a: 1}"#).is_none());
    }
}
