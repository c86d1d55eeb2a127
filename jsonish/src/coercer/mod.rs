//! The Coercer: schema-driven conversion from [`Value`] to typed output (spec §4.2).
//!
//! Dispatch is by schema kind, not by matching on the Value's own shape first
//! — a schema of `String` accepts a Value of any shape, a schema of `Object`
//! rejects a bare `Number`, and so on. Each concrete Rust type that wants to
//! participate implements [`FromValue`]; the derive crate generates these
//! impls for structs and enums the way `serde_derive` generates `Deserialize`.

pub mod array;
pub mod literal;
pub mod map;
pub mod object;
pub mod optional;
pub mod primitives;
pub mod union;

use std::collections::HashSet;

use crate::error::CoerceError;
use crate::parser::ParseOptions;
use crate::schema::Schema;
use crate::scoring::{self, Candidate, Provenance};
use crate::value::{CompletionState, Fix, Flag, Value};

/// Recursion and depth-guard state threaded through a single coercion call
/// (spec §4.2.5, §5 — lives on the call, never shared or cached globally).
pub struct CoerceCtx {
    pub options: ParseOptions,
    visited: HashSet<(String, String)>,
    union_depth: usize,
    raw_input: String,
    at_root: bool,
}

impl CoerceCtx {
    pub fn new(options: ParseOptions) -> Self {
        Self::with_raw_input(options, String::new())
    }

    /// `raw_input` is the untouched text handed to `parse`. Dispatch rule 1
    /// (spec §4.2.1) uses it, the first time `coerce` is entered, to return
    /// structured-looking input verbatim instead of re-serializing it.
    pub fn with_raw_input(options: ParseOptions, raw_input: String) -> Self {
        Self {
            options,
            visited: HashSet::new(),
            union_depth: 0,
            raw_input,
            at_root: true,
        }
    }

    /// Enters a union-resolution frame identified by `schema_node` and the
    /// Value being resolved. Returns a guard that pops the frame on drop.
    /// Fails with `DepthExceeded` (non-fatal, caller tries the next branch)
    /// or `RecursionDetected` if the same frame is already on the stack.
    pub fn enter_union(
        &mut self,
        schema_node: &str,
        value: &Value,
    ) -> Result<UnionGuard<'_>, CoerceError> {
        if self.union_depth >= self.options.max_union_depth {
            return Err(CoerceError::DepthExceeded {
                max_depth: self.options.max_union_depth,
            });
        }
        let key = (schema_node.to_string(), fingerprint(value));
        if self.visited.contains(&key) {
            return Err(CoerceError::RecursionDetected {
                schema_node: schema_node.to_string(),
            });
        }
        self.visited.insert(key.clone());
        self.union_depth += 1;
        Ok(UnionGuard { ctx: self, key })
    }
}

/// RAII guard popping a union-recursion frame when the branch attempt ends
/// (success or failure alike), so sibling union options can still try.
pub struct UnionGuard<'a> {
    ctx: &'a mut CoerceCtx,
    key: (String, String),
}

impl Drop for UnionGuard<'_> {
    fn drop(&mut self) {
        self.ctx.visited.remove(&self.key);
        self.ctx.union_depth = self.ctx.union_depth.saturating_sub(1);
    }
}

/// Content-based identity for the recursion guard. Not a performance-grade
/// hash, just cheap structural equality good enough to catch `(schema_node,
/// value)` re-entry in a union-resolution stack that's at most `max_union_depth` deep.
fn fingerprint(value: &Value) -> String {
    format!("{value:?}")
}

/// A type that can be produced from a [`Value`] against its own declared
/// schema. Mirrors BAML's `try_cast`/`coerce` split (spec §4.2.5): `try_cast`
/// is the zero-penalty exact-shape fast path, `coerce` is the full algorithm.
pub trait FromValue: Sized {
    fn schema() -> Schema;

    /// Zero-penalty exact-type match. Returning `Some` must never apply a
    /// transformation; when in doubt, return `None` and let `coerce` run.
    fn try_cast(_value: &Value, _ctx: &mut CoerceCtx) -> Option<Self> {
        None
    }

    fn coerce(value: &Value, ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError>;
}

/// Top-level coercion entry point implementing the dispatch rules of §4.2.1.
pub fn coerce<T: FromValue + 'static>(
    value: &Value,
    ctx: &mut CoerceCtx,
) -> Result<(T, Vec<Flag>), CoerceError> {
    // Only the call `parse_with_flags` itself makes is "the whole document
    // requested as T"; every recursive descent from here on (struct fields,
    // array elements, union branches) is a nested call and sees `is_root`
    // already consumed.
    let is_root = ctx.at_root;
    ctx.at_root = false;

    // Rule 1: string-schema short-circuit.
    if T::schema() == Schema::String {
        let root_raw = is_root.then_some(ctx.raw_input.as_str());
        return primitives::coerce_string_value_rooted(value, root_raw).and_then(|(s, flags)| {
            // SAFETY-free: String -> T is only reachable when T::schema() is
            // String, so T is String (no other Rust type declares that kind).
            let boxed: Box<dyn std::any::Any> = Box::new(s);
            match boxed.downcast::<T>() {
                Ok(t) => Ok((*t, flags)),
                Err(_) => Err(CoerceError::coercion_failed("String", "schema/type mismatch")),
            }
        });
    }

    // Rule 2: AnyOf fans out, coerces each candidate, and lets scoring pick.
    if let Value::AnyOf(candidates, _original) = value {
        let mut scored = Vec::new();
        for (i, cand) in candidates.iter().enumerate() {
            if let Ok((v, flags)) = T::coerce(cand, ctx) {
                let prov = Provenance {
                    used_single_to_array: flags.contains(&Flag::SingleToArray),
                    is_container_result: matches!(
                        cand.unwrap_layers().0,
                        Value::Object(..) | Value::Array(..)
                    ),
                    from_markdown_string: matches!(cand, Value::Markdown(_, inner) if matches!(inner.as_ref(), Value::String(_))),
                    declaration_index: i,
                    ..Default::default()
                };
                scored.push(Candidate::new(v, flags, &[], prov));
            }
        }
        return scoring::select_best(scored, false)
            .map(|c| (c.value, c.flags))
            .ok_or(CoerceError::NoUnionMatch);
    }

    // Rule 3: unwrap Markdown/Fixed transparently, propagating their flags.
    let (inner, fixes) = value.unwrap_layers();
    let mut flags: Vec<Flag> = fixes.iter().map(|f| f.flag()).collect();
    if matches!(value, Value::Markdown(..)) {
        flags.push(Flag::ObjectFromMarkdown);
    }
    if value.completion_state() == CompletionState::Incomplete {
        flags.push(Flag::Incomplete);
    }

    let (v, mut own_flags) = T::coerce(inner, ctx)?;
    own_flags.append(&mut flags);
    Ok((v, own_flags))
}

/// Helper for leaf coercers: true if the flag vec should include `Incomplete`.
pub(crate) fn completion_flag(value: &Value) -> Option<Flag> {
    (value.completion_state() == CompletionState::Incomplete).then_some(Flag::Incomplete)
}

/// Collapses `Fixed`'s applied repairs into their flags, used by coercers
/// that need to inspect the unwrapped Value directly rather than going
/// through [`coerce`] (e.g. object/array coercers recursing into children).
pub(crate) fn unwrap_fixes(value: &Value) -> (&Value, Vec<Flag>) {
    let (inner, fixes) = value.unwrap_layers();
    (inner, fixes.into_iter().map(Fix::flag).collect())
}

/// Transparent indirection for self-referential schemas (spec §4.2.7): a
/// recursive struct/enum field spelled `Box<Self>` delegates schema and
/// coercion straight through to `T`, only adding the heap indirection Rust's
/// type system requires for a type to contain itself.
impl<T: FromValue + 'static> FromValue for Box<T> {
    fn schema() -> Schema {
        T::schema()
    }

    fn try_cast(value: &Value, ctx: &mut CoerceCtx) -> Option<Self> {
        T::try_cast(value, ctx).map(Box::new)
    }

    fn coerce(value: &Value, ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        let (v, flags) = coerce::<T>(value, ctx)?;
        Ok((Box::new(v), flags))
    }
}
