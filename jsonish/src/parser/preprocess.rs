//! Text-level preprocessing that runs ahead of the strategy cascade.
//!
//! None of this is named by the spec directly, but it's the ambient cleanup
//! the Raw Parser needs to be robust to the same noise every strategy would
//! otherwise have to special-case individually: zero-width/invisible Unicode
//! characters LLMs sometimes emit, and double-escaped JSON (a JSON document
//! that was itself JSON-string-encoded by an upstream step). Grounded in the
//! teacher's `GarbageCleaner`.

/// Strips invisible/formatting Unicode characters that break structural
/// scanning without being visible in a rendered transcript.
pub fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{200E}', '\u{200F}', '\u{202A}',
            '\u{202B}', '\u{202C}', '\u{202D}', '\u{202E}',
        ],
        "",
    )
}

/// Unwraps JSON that was serialized as a JSON string (`"{\"a\":1}"` →
/// `{"a":1}`), a pattern that shows up when an upstream step re-encodes an
/// already-JSON payload.
pub fn unwrap_double_escaped(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.len() < 4 {
        return None;
    }
    let looks_wrapped =
        (trimmed.starts_with("\"{") || trimmed.starts_with("\"["))
            && (trimmed.ends_with("}\"") || trimmed.ends_with("]\""));
    if !looks_wrapped {
        return None;
    }
    let unescaped = serde_json::from_str::<String>(trimmed).ok()?;
    serde_json::from_str::<serde_json::Value>(&unescaped).ok()?;
    Some(unescaped)
}

/// If `input` is more deeply nested than `max_depth` braces/brackets (a
/// pathological or adversarial input), returns the innermost substring at
/// that depth so the cascade can still extract something without risking a
/// stack overflow in the recursive strategies.
pub fn extract_from_deep_nesting(input: &str, max_depth: usize) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return None;
    }

    let mut depth: usize = 0;
    let mut max_seen: usize = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in trimmed.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => {
                depth += 1;
                max_seen = max_seen.max(depth);
            }
            '}' | ']' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if max_seen <= max_depth {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_zero_width_space() {
        assert_eq!(remove_invisible_chars("a\u{200B}b"), "ab");
    }

    #[test]
    fn unwraps_double_escaped_object() {
        let input = r#""{\"a\":1}""#;
        assert_eq!(unwrap_double_escaped(input).as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn leaves_plain_json_alone() {
        assert_eq!(unwrap_double_escaped(r#"{"a":1}"#), None);
    }
}
