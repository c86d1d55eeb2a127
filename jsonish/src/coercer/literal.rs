//! Literal and enum matching tiers (spec §4.2.6).
//!
//! Used by the derive crate's generated impls for `#[derive(FromValue)]`
//! enums carrying string-valued variants/aliases. The five match layers run
//! in order and the first to succeed wins; each layer past exact match adds
//! its flag. A long string that doesn't match any layer falls back to a
//! whole-word substring search.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::object;
use crate::error::CoerceError;
use crate::value::{Flag, Value};

/// Strips characters that aren't alphanumeric or whitespace, then collapses
/// runs of whitespace to a single space.
pub fn strip_punctuation(s: &str) -> String {
    let stripped: String = s
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips combining diacritical marks after NFD decomposition (`café` → `cafe`).
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F)
}

/// Tries the five literal-match tiers of spec §4.2.6 against one candidate
/// string. Returns the flags accumulated by whichever tier matched.
pub fn match_tiers(candidate: &str, input: &str) -> Option<Vec<Flag>> {
    if input == candidate {
        return Some(vec![]);
    }

    let trimmed = input.trim_matches(|c| c == '"' || c == '\'');
    if trimmed == candidate {
        return Some(vec![]);
    }

    if trimmed.eq_ignore_ascii_case(candidate) {
        return Some(vec![Flag::CaseCoerced]);
    }

    let stripped_input = strip_punctuation(trimmed);
    let stripped_candidate = strip_punctuation(candidate);
    if stripped_input == stripped_candidate {
        return Some(vec![Flag::PunctuationStripped]);
    }
    if stripped_input.eq_ignore_ascii_case(&stripped_candidate) {
        return Some(vec![Flag::CaseCoerced, Flag::PunctuationStripped]);
    }

    let diacritic_input = strip_diacritics(&stripped_input).to_lowercase();
    let diacritic_candidate = strip_diacritics(&stripped_candidate).to_lowercase();
    if diacritic_input == diacritic_candidate {
        return Some(vec![Flag::CaseCoerced, Flag::PunctuationStripped]);
    }

    None
}

/// Object single-value extraction (spec §4.2.6): a single-entry object
/// unwraps to its lone value with an `ObjectToPrimitive` flag before literal
/// matching runs. A multi-entry (or empty) object is rejected outright
/// rather than falling through to the whole-word substring tier.
pub fn extract_scalar(value: &Value) -> Result<(Value, Vec<Flag>), CoerceError> {
    let (inner, fixes) = value.unwrap_layers();
    let mut flags: Vec<Flag> = fixes.iter().map(|f| f.flag()).collect();
    match inner {
        Value::Object(entries, _) => {
            let consolidated = object::consolidate_duplicates(entries);
            match object::sole_entry(&consolidated) {
                Some((_, v)) => {
                    flags.push(Flag::ObjectToPrimitive);
                    Ok((v.clone(), flags))
                }
                None => Err(CoerceError::coercion_failed(
                    "Literal",
                    format!(
                        "object with {} keys cannot match a literal/enum value",
                        consolidated.len()
                    ),
                )),
            }
        }
        other => Ok((other.clone(), flags)),
    }
}

fn whole_word_regex(candidate: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(candidate))).ok()
}

/// Searches `input` for `candidate` as a whole word. Used when none of the
/// five match tiers fire and the input is prose containing the literal.
pub fn find_substring(candidate: &str, input: &str) -> bool {
    whole_word_regex(candidate).is_some_and(|re| re.is_match(input))
}

/// Resolves a single `Literal(string)` schema against `input`: the five
/// tiers, then a whole-word substring search (unambiguous since there's only
/// one candidate to search for).
pub fn match_literal(candidate: &str, input: &str) -> Result<Vec<Flag>, CoerceError> {
    if let Some(flags) = match_tiers(candidate, input) {
        return Ok(flags);
    }
    if find_substring(candidate, input) {
        return Ok(vec![Flag::SubstringMatch]);
    }
    Err(CoerceError::coercion_failed(
        "Literal",
        format!("`{input}` does not match `{candidate}`"),
    ))
}

/// Resolves an `Enum`/multi-option literal match: runs the five tiers
/// against every candidate, preferring the lowest tier reached; ties at the
/// same tier are ambiguous. Falls back to whole-word substring search,
/// failing with `AmbiguousLiteral` if more than one candidate is found in
/// the text.
pub fn match_enum(candidates: &[&str], input: &str) -> Result<(usize, Vec<Flag>), CoerceError> {
    let tiered: Vec<(usize, usize, Vec<Flag>)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match_tiers(c, input).map(|flags| (tier_rank(&flags), i, flags)))
        .collect();

    if let Some(best_rank) = tiered.iter().map(|(r, ..)| *r).min() {
        let at_best: Vec<&(usize, usize, Vec<Flag>)> =
            tiered.iter().filter(|(r, ..)| *r == best_rank).collect();
        if at_best.len() == 1 {
            let (_, idx, flags) = at_best[0];
            return Ok((*idx, flags.clone()));
        }
        return Err(CoerceError::AmbiguousLiteral { text: input.to_string() });
    }

    let found: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| find_substring(c, input))
        .map(|(i, _)| i)
        .collect();
    match found.len() {
        0 => Err(CoerceError::coercion_failed(
            "Enum",
            format!("no option matched `{input}`"),
        )),
        1 => Ok((found[0], vec![Flag::SubstringMatch])),
        _ => Err(CoerceError::AmbiguousLiteral { text: input.to_string() }),
    }
}

#[inline]
fn tier_rank(flags: &[Flag]) -> usize {
    flags.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_has_no_flags() {
        assert_eq!(match_tiers("Active", "Active"), Some(vec![]));
    }

    #[test]
    fn case_insensitive_match_flagged() {
        assert_eq!(match_tiers("Active", "active"), Some(vec![Flag::CaseCoerced]));
    }

    #[test]
    fn punctuation_stripped_match() {
        assert_eq!(
            match_tiers("in progress", "in-progress"),
            Some(vec![Flag::PunctuationStripped])
        );
    }

    #[test]
    fn substring_extraction_from_prose() {
        let flags = match_literal("Active", "the current status is Active today").unwrap();
        assert_eq!(flags, vec![Flag::SubstringMatch]);
    }

    #[test]
    fn enum_ambiguous_when_two_values_both_present() {
        let err = match_enum(&["Active", "Pending"], "Active or Pending, unclear").unwrap_err();
        assert!(matches!(err, CoerceError::AmbiguousLiteral { .. }));
    }

    #[test]
    fn extract_scalar_unwraps_single_entry_object() {
        let v = Value::Object(
            vec![("status".to_string(), Value::string("pending"))],
            crate::value::CompletionState::Complete,
        );
        let (scalar, flags) = extract_scalar(&v).unwrap();
        assert_eq!(scalar, Value::string("pending"));
        assert!(flags.contains(&Flag::ObjectToPrimitive));
    }

    #[test]
    fn extract_scalar_rejects_multi_entry_object() {
        let v = Value::Object(
            vec![
                ("status".to_string(), Value::string("pending")),
                ("note".to_string(), Value::string("not active")),
            ],
            crate::value::CompletionState::Complete,
        );
        assert!(extract_scalar(&v).is_err());
    }

    #[test]
    fn extract_scalar_passes_non_object_through_unchanged() {
        let v = Value::string("Active");
        let (scalar, flags) = extract_scalar(&v).unwrap();
        assert_eq!(scalar, Value::string("Active"));
        assert!(flags.is_empty());
    }

    #[test]
    fn enum_resolves_unique_substring() {
        let (idx, flags) = match_enum(&["Active", "Pending"], "status: Active").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(flags, vec![Flag::SubstringMatch]);
    }

}
