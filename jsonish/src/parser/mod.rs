//! The Raw Parser: a fixed five-strategy cascade that turns noisy text into a
//! [`Value`] (spec §4.1.1).
//!
//! Order is fixed, not configurable, and is not a priority list to be
//! reordered per-input: strict JSON, then markdown fences, then a multi-object
//! scan, then the Fixing State Machine, then (only if nothing else produced
//! anything) a raw-string fallback. Every strategy that produces a candidate
//! contributes to the result; more than one candidate becomes `Value::AnyOf`
//! and the coercer picks among them.

pub mod preprocess;
pub mod quoting;
pub mod state_machine;
pub mod strategies;

use crate::error::{JsonishError, Result};
use crate::value::Value;

/// Per-call parsing knobs (spec §4.1.3).
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub allow_markdown: bool,
    pub allow_multi_object: bool,
    pub allow_fixes: bool,
    pub allow_as_string: bool,
    pub is_done: bool,
    /// Raw Parser nesting cap. Exceeding this is fatal (spec §4.1.4).
    pub max_depth: usize,
    /// Union-resolution recursion cap; exceeding this fails only the current
    /// branch (spec §4.2.5).
    pub max_union_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_markdown: true,
            allow_multi_object: true,
            allow_fixes: true,
            allow_as_string: true,
            is_done: true,
            max_depth: 100,
            max_union_depth: 25,
        }
    }
}

/// Runs the five-strategy cascade over `input`, producing a single `Value`
/// (collapsing to `AnyOf` when more than one strategy succeeds).
pub fn parse(input: &str, options: &ParseOptions) -> Result<Value> {
    parse_at_depth(input, options, 0)
}

fn parse_at_depth(input: &str, options: &ParseOptions, depth: usize) -> Result<Value> {
    if depth > options.max_depth {
        return Err(JsonishError::DepthExceeded {
            max_depth: options.max_depth,
        });
    }

    let cleaned = preprocess::remove_invisible_chars(input);
    let candidate_source = preprocess::unwrap_double_escaped(&cleaned).unwrap_or(cleaned);

    let mut candidates: Vec<Value> = Vec::new();

    // Strategy 1: strict JSON. A full-input exact parse is authoritative;
    // nothing else can improve on it, so short-circuit immediately.
    if let Some(v) = strategies::direct_json::try_parse(&candidate_source) {
        return Ok(v);
    }

    // Strategy 2: markdown fences.
    if options.allow_markdown {
        let (fences, prose) = strategies::markdown::split(&candidate_source);
        if !fences.is_empty() {
            let mut sub_options = options.clone();
            sub_options.allow_markdown = false;
            for fence in fences {
                if let Ok(inner) = parse_at_depth(&fence.body, &sub_options, depth + 1) {
                    candidates.push(Value::Markdown(fence.lang, Box::new(inner)));
                }
            }
            for text in prose {
                if !text.is_empty() {
                    candidates.push(Value::String(text));
                }
            }
        }
    }

    // Strategy 3: multi-object scan.
    if options.allow_multi_object {
        let spans = strategies::multi_object::top_level_spans(&candidate_source);
        if spans.len() > 1 {
            let mut objects = Vec::new();
            for span in &spans {
                if let Some(v) = strategies::direct_json::try_parse(span) {
                    objects.push(v);
                } else if options.allow_fixes {
                    if let Ok(v) = state_machine::fix_parse(span, options.max_depth) {
                        objects.push(v);
                    }
                }
            }
            if objects.len() > 1 {
                candidates.push(Value::Array(objects, crate::value::CompletionState::Complete));
            }
        }
    }

    // Strategy 4: Fixing State Machine. Always attempted when allowed; it
    // rarely fails outright (incomplete input is recovered, not rejected).
    if options.allow_fixes {
        if let Ok(v) = state_machine::fix_parse(&candidate_source, options.max_depth) {
            candidates.push(v);
        }
    }

    // Strategy 5: raw-string fallback, only if nothing else produced a usable
    // reading.
    if candidates.is_empty() && options.allow_as_string {
        candidates.push(Value::String(candidate_source.clone()));
    }

    match candidates.len() {
        0 => Err(JsonishError::Coerce(crate::error::CoerceError::coercion_failed(
            "Value",
            "no strategy produced a usable value",
        ))),
        1 => Ok(candidates.into_iter().next().unwrap()),
        _ => Ok(Value::AnyOf(candidates, candidate_source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn strict_json_short_circuits() {
        let v = parse(r#"{"a": 1}"#, &opts()).unwrap();
        assert!(matches!(v, Value::Object(..)));
    }

    #[test]
    fn multi_object_and_single_object_both_present_as_candidates() {
        let input = r#"{"key":"v1"} {"key":"v2"}"#;
        let v = parse(input, &opts()).unwrap();
        match v {
            Value::AnyOf(candidates, _) => {
                assert!(candidates
                    .iter()
                    .any(|c| matches!(c, Value::Array(items, _) if items.len() == 2)));
            }
            other => panic!("expected AnyOf, got {other:?}"),
        }
    }

    #[test]
    fn markdown_fence_recovered_with_prose_candidate() {
        let input = "Sure, here you go:\n```json\n{\"a\": 1}\n```";
        let v = parse(input, &opts()).unwrap();
        match v {
            Value::AnyOf(candidates, _) => {
                assert!(candidates.iter().any(|c| matches!(c, Value::Markdown(..))));
                assert!(candidates.iter().any(|c| matches!(c, Value::String(_))));
            }
            other => panic!("expected AnyOf, got {other:?}"),
        }
    }

    #[test]
    fn malformed_object_recovered_by_fixer() {
        let v = parse(r#"{name: "Alice", age: 30,}"#, &opts()).unwrap();
        let (inner, fixes) = v.unwrap_layers();
        assert!(matches!(inner, Value::Object(..)));
        assert!(!fixes.is_empty());
    }

    #[test]
    fn depth_cap_is_fatal() {
        let mut o = opts();
        o.max_depth = 1;
        let err = parse_at_depth("x", &o, 5).unwrap_err();
        assert!(matches!(err, JsonishError::DepthExceeded { max_depth: 1 }));
    }
}
