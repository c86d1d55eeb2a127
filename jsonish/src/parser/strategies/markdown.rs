//! Strategy 2: markdown fence extraction (spec §4.1.1).
//!
//! LLMs routinely wrap JSON in ` ```json ... ``` ` fences, often with prose
//! before or after. This strategy finds every fenced block and hands its body
//! back to the caller for a recursive cascade parse (with markdown disabled,
//! so a fence can't nest into itself forever); the caller wraps each result in
//! `Value::Markdown` and also keeps the non-fence prose as its own candidate,
//! since a schema that just wants a string shouldn't be starved by fences it
//! doesn't care about.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```([a-zA-Z0-9_+-]*)\n?(.*?)```").unwrap());

/// One fenced block: an optional language tag and its raw body.
pub struct Fence {
    pub lang: Option<String>,
    pub body: String,
}

/// Splits `input` into its fenced blocks and the remaining non-fence text
/// (trimmed, empty segments dropped).
pub fn split(input: &str) -> (Vec<Fence>, Vec<String>) {
    let mut fences = Vec::new();
    let mut prose = Vec::new();
    let mut last_end = 0;

    for cap in FENCE.captures_iter(input) {
        let whole = cap.get(0).unwrap();
        let before = &input[last_end..whole.start()];
        if !before.trim().is_empty() {
            prose.push(before.trim().to_string());
        }
        let lang = cap.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty());
        let body = cap.get(2).map(|m| m.as_str()).unwrap_or("");
        fences.push(Fence {
            lang: lang.map(str::to_string),
            body: body.to_string(),
        });
        last_end = whole.end();
    }

    let tail = &input[last_end..];
    if !tail.trim().is_empty() {
        prose.push(tail.trim().to_string());
    }

    (fences, prose)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_fence_with_lang() {
        let (fences, prose) = split("here:\n```json\n{\"a\":1}\n```\nthanks");
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].lang.as_deref(), Some("json"));
        assert_eq!(fences[0].body.trim(), r#"{"a":1}"#);
        assert_eq!(prose, vec!["here:", "thanks"]);
    }

    #[test]
    fn extracts_fence_with_no_lang() {
        let (fences, _) = split("```\n[1,2,3]\n```");
        assert_eq!(fences.len(), 1);
        assert!(fences[0].lang.is_none());
    }

    #[test]
    fn no_fences_is_all_prose() {
        let (fences, prose) = split("just some plain text");
        assert!(fences.is_empty());
        assert_eq!(prose, vec!["just some plain text"]);
    }

    #[test]
    fn multiple_fences_each_captured() {
        let (fences, _) = split("```json\n{\"a\":1}\n```\nmiddle\n```json\n{\"b\":2}\n```");
        assert_eq!(fences.len(), 2);
    }
}
