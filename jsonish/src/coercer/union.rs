//! Union coercer: two-phase resolution across alternative schemas (spec §4.2.5).
//!
//! A Rust `enum` with data-carrying variants maps onto `Schema::Union`. The
//! derive crate generates one [`UnionBranch`] per variant — a pair of
//! closures wrapping that variant's own `try_cast`/`coerce` — and this module
//! runs the shared algorithm: an optional discriminator short-circuit, a
//! zero-penalty try-cast sweep, then a full coerce sweep, each scored and
//! tie-broken by [`crate::scoring`].

use crate::error::CoerceError;
use crate::scoring::{self, Candidate, Provenance};
use crate::value::{Flag, Value};

use super::CoerceCtx;

/// One union variant's resolution behavior, supplied by derive-generated code.
pub struct UnionBranch<'a, T> {
    /// Position among the enum's declared variants; used as the final
    /// tie-breaker when nothing else distinguishes two branches.
    pub declaration_index: usize,
    /// Stable name identifying this branch's schema node to the recursion
    /// guard — typically `"EnumName::VariantName"`.
    pub schema_node: &'a str,
    /// If this variant is reachable by discriminator, the literal tag value
    /// that selects it.
    pub discriminator_tag: Option<&'a str>,
    pub try_cast: Box<dyn Fn(&Value, &mut CoerceCtx) -> Option<T> + 'a>,
    pub coerce: Box<dyn Fn(&Value, &mut CoerceCtx) -> Result<(T, Vec<Flag>), CoerceError> + 'a>,
}

/// Reads a discriminator field's value out of an object, as a plain string,
/// for comparison against each branch's `discriminator_tag`. Returns `None`
/// if `value` isn't (or doesn't unwrap to) an object, or the field is absent
/// or not a plain string.
pub fn discriminator_value(value: &Value, field: &str) -> Option<String> {
    let (inner, _) = value.unwrap_layers();
    match inner {
        Value::Object(entries, _) => entries.iter().find_map(|(k, v)| {
            (k == field).then(|| match v.unwrap_layers().0 {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })?
        }),
        _ => None,
    }
}

/// Runs the union algorithm over `branches` against `value`.
///
/// `discriminator_field`, when present, is checked first: if exactly one
/// branch's `discriminator_tag` matches the field's value, that branch is
/// coerced directly, skipping both the try-cast and coerce sweeps.
pub fn resolve<T>(
    value: &Value,
    ctx: &mut CoerceCtx,
    discriminator_field: Option<&str>,
    branches: &[UnionBranch<'_, T>],
) -> Result<(T, Vec<Flag>), CoerceError> {
    if let Some(field) = discriminator_field {
        if let Some(tag) = discriminator_value(value, field) {
            let matches: Vec<&UnionBranch<T>> = branches
                .iter()
                .filter(|b| b.discriminator_tag == Some(tag.as_str()))
                .collect();
            if let [only] = matches.as_slice() {
                return (only.coerce)(value, ctx);
            }
        }
    }

    if let Some(result) = try_cast_phase(value, ctx, branches) {
        return Ok(result);
    }

    coerce_phase(value, ctx, branches)
}

fn try_cast_phase<T>(
    value: &Value,
    ctx: &mut CoerceCtx,
    branches: &[UnionBranch<'_, T>],
) -> Option<(T, Vec<Flag>)> {
    let mut scored = Vec::new();
    for branch in branches {
        let _guard = ctx.enter_union(branch.schema_node, value).ok()?;
        if let Some(v) = (branch.try_cast)(value, ctx) {
            let prov = Provenance {
                declaration_index: branch.declaration_index,
                is_container_result: matches!(value.unwrap_layers().0, Value::Object(..) | Value::Array(..)),
                used_single_to_array: false,
                ..Default::default()
            };
            scored.push(Candidate::new(v, Vec::new(), &[], prov));
        }
    }
    scoring::select_best(scored, false).map(|c| (c.value, c.flags))
}

fn coerce_phase<T>(
    value: &Value,
    ctx: &mut CoerceCtx,
    branches: &[UnionBranch<'_, T>],
) -> Result<(T, Vec<Flag>), CoerceError> {
    let mut scored = Vec::new();
    for branch in branches {
        let guard = match ctx.enter_union(branch.schema_node, value) {
            Ok(g) => g,
            Err(_) => continue,
        };
        if let Ok((v, flags)) = (branch.coerce)(value, ctx) {
            let prov = Provenance {
                declaration_index: branch.declaration_index,
                is_container_result: matches!(value.unwrap_layers().0, Value::Object(..) | Value::Array(..)),
                used_single_to_array: flags.contains(&Flag::SingleToArray),
                ..Default::default()
            };
            scored.push(Candidate::new(v, flags, &[], prov));
        }
        drop(guard);
    }
    scoring::select_best(scored, false)
        .map(|c| (c.value, c.flags))
        .ok_or(CoerceError::NoUnionMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CompletionState;

    fn int_branch<'a>(idx: usize) -> UnionBranch<'a, String> {
        UnionBranch {
            declaration_index: idx,
            schema_node: "Shape::Int",
            discriminator_tag: None,
            try_cast: Box::new(|v, _| match v {
                Value::Number(n) => Some(format!("int:{n}")),
                _ => None,
            }),
            coerce: Box::new(|v, _| match v {
                Value::Number(n) => Ok((format!("int:{n}"), vec![])),
                _ => Err(CoerceError::coercion_failed("Int", "not a number")),
            }),
        }
    }

    fn string_branch<'a>(idx: usize) -> UnionBranch<'a, String> {
        UnionBranch {
            declaration_index: idx,
            schema_node: "Shape::Str",
            discriminator_tag: None,
            try_cast: Box::new(|v, _| match v {
                Value::String(s) => Some(format!("str:{s}")),
                _ => None,
            }),
            coerce: Box::new(|v, _| match v {
                Value::String(s) => Ok((format!("str:{s}"), vec![])),
                _ => Err(CoerceError::coercion_failed("String", "not a string")),
            }),
        }
    }

    #[test]
    fn try_cast_phase_resolves_exact_type_without_flags() {
        let mut ctx = CoerceCtx::new(crate::parser::ParseOptions::default());
        let branches = vec![int_branch(0), string_branch(1)];
        let (v, flags) = resolve(&Value::Number(5.into()), &mut ctx, None, &branches).unwrap();
        assert_eq!(v, "int:5");
        assert!(flags.is_empty());
    }

    #[test]
    fn no_branch_matches_is_no_union_match() {
        let mut ctx = CoerceCtx::new(crate::parser::ParseOptions::default());
        let branches = vec![int_branch(0), string_branch(1)];
        let err = resolve(&Value::Boolean(true), &mut ctx, None, &branches).unwrap_err();
        assert!(matches!(err, CoerceError::NoUnionMatch));
    }

    fn object_branch<'a>(idx: usize, tag: &'a str) -> UnionBranch<'a, String> {
        UnionBranch {
            declaration_index: idx,
            schema_node: "Shape::Text",
            discriminator_tag: Some(tag),
            try_cast: Box::new(|_, _| None),
            coerce: Box::new(|v, _| match v.unwrap_layers().0 {
                Value::Object(entries, _) => entries
                    .iter()
                    .find(|(k, _)| k == "value")
                    .and_then(|(_, v)| match v {
                        Value::String(s) => Some((format!("text:{s}"), vec![])),
                        _ => None,
                    })
                    .ok_or_else(|| CoerceError::coercion_failed("Text", "missing `value` field")),
                _ => Err(CoerceError::coercion_failed("Text", "not an object")),
            }),
        }
    }

    #[test]
    fn discriminator_short_circuits_to_matching_branch() {
        let mut ctx = CoerceCtx::new(crate::parser::ParseOptions::default());
        let branches = vec![int_branch(0), object_branch(1, "text")];
        let value = Value::Object(
            vec![
                ("kind".into(), Value::string("text")),
                ("value".into(), Value::string("hello")),
            ],
            CompletionState::Complete,
        );
        assert_eq!(discriminator_value(&value, "kind"), Some("text".to_string()));
        let (v, _) = resolve(&value, &mut ctx, Some("kind"), &branches).unwrap();
        assert_eq!(v, "text:hello");
    }
}
