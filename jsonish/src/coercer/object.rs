//! Object/struct field-matching algorithm (spec §4.2.4).
//!
//! This module is deliberately type-erased: it works over `&str` keys and
//! raw `Value`s so the derive crate's generated `FromValue::coerce` impl for
//! a struct can call it once per declared field without this crate needing
//! to know the field's Rust type. The derive-generated code supplies the
//! field's type-specific coercion as a closure.

use crate::error::CoerceError;
use crate::value::{CompletionState, Flag, Value};

/// One declared struct field as the derive crate sees it.
pub struct FieldSpec<'a> {
    pub name: &'a str,
    pub aliases: &'a [&'a str],
    pub required: bool,
}

/// Strips everything but letters/digits and lowercases, so `popularity_data`,
/// `popularityData`, and `popularity-data` all collapse to the same key.
/// This is the tier-4 "semantic field alias" match of spec §4.2.4 point 4,
/// covering case-convention variance without a dedicated camelCase/snake_case
/// converter pair.
fn canonical_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Consolidates duplicate keys (spec §4.2.4 point 2): entries whose raw key
/// is identical after trimming are merged into one entry holding a
/// `Value::Array` of their values, in encounter order. Keys that appear once
/// pass through unchanged.
pub fn consolidate_duplicates(entries: &[(String, Value)]) -> Vec<(String, Value)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<Value>> = std::collections::HashMap::new();

    for (k, v) in entries {
        let norm = k.trim().to_string();
        if !groups.contains_key(&norm) {
            order.push(norm.clone());
        }
        groups.entry(norm).or_default().push(v.clone());
    }

    order
        .into_iter()
        .map(|k| {
            let mut values = groups.remove(&k).unwrap_or_default();
            if values.len() == 1 {
                (k, values.pop().unwrap())
            } else {
                (k, Value::Array(values, CompletionState::Complete))
            }
        })
        .collect()
}

/// Finds the best-matching entry for `field` among `entries`, trying tiers
/// in order: exact, trimmed, case-insensitive, declared alias, then the
/// case-convention-insensitive semantic tier. Returns the entry's index.
pub fn find_best_key(entries: &[(String, Value)], field: &FieldSpec) -> Option<usize> {
    if let Some(i) = entries.iter().position(|(k, _)| k == field.name) {
        return Some(i);
    }
    if let Some(i) = entries
        .iter()
        .position(|(k, _)| k.trim() == field.name.trim())
    {
        return Some(i);
    }
    if let Some(i) = entries
        .iter()
        .position(|(k, _)| k.trim().eq_ignore_ascii_case(field.name.trim()))
    {
        return Some(i);
    }
    if let Some(i) = entries
        .iter()
        .position(|(k, _)| field.aliases.iter().any(|a| *a == k))
    {
        return Some(i);
    }
    let canon_name = canonical_key(field.name);
    let canon_aliases: Vec<String> = field.aliases.iter().map(|a| canonical_key(a)).collect();
    entries.iter().position(|(k, _)| {
        let canon_key = canonical_key(k);
        canon_key == canon_name || canon_aliases.contains(&canon_key)
    })
}

/// If `entries` has exactly one entry, returns it — used for both the
/// implied-key rescue (a required field missing, one leftover entry remains)
/// and the single-value-to-object rescue (the whole input isn't an object).
pub fn sole_entry(entries: &[(String, Value)]) -> Option<&(String, Value)> {
    match entries {
        [only] => Some(only),
        _ => None,
    }
}

/// The flag for a key present in the input but not claimed by any declared
/// field: always recorded, but only penalized (spec §3.2) when the schema
/// is `strict`.
pub fn extra_key_flag(strict: bool) -> Option<Flag> {
    Some(if strict { Flag::StrictExtraKey } else { Flag::ExtraKey })
}

pub fn required_field_missing(field: &str) -> CoerceError {
    CoerceError::RequiredFieldMissing {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, i64)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Number((*v).into())))
            .collect()
    }

    #[test]
    fn exact_match_wins() {
        let e = entries(&[("name", 1)]);
        let f = FieldSpec { name: "name", aliases: &[], required: true };
        assert_eq!(find_best_key(&e, &f), Some(0));
    }

    #[test]
    fn case_convention_tier_matches_camel_to_snake() {
        let e = entries(&[("popularityData", 1)]);
        let f = FieldSpec { name: "popularity_data", aliases: &[], required: true };
        assert_eq!(find_best_key(&e, &f), Some(0));
    }

    #[test]
    fn declared_alias_matches() {
        let e = entries(&[("full_name", 1)]);
        let f = FieldSpec { name: "name", aliases: &["full_name"], required: true };
        assert_eq!(find_best_key(&e, &f), Some(0));
    }

    #[test]
    fn duplicate_keys_consolidate_into_array() {
        let input = vec![
            ("tag".to_string(), Value::string("a")),
            ("tag".to_string(), Value::string("b")),
        ];
        let out = consolidate_duplicates(&input);
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0].1, Value::Array(items, _) if items.len() == 2));
    }

    #[test]
    fn sole_entry_detects_single_field_object() {
        let e = entries(&[("value", 42)]);
        assert!(sole_entry(&e).is_some());
        let e2 = entries(&[("a", 1), ("b", 2)]);
        assert!(sole_entry(&e2).is_none());
    }
}
