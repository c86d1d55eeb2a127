//! Primitive coercers (spec §4.2.2): String, Number, Boolean, Null, and the
//! integer/float Rust types built on top of Number.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Number;

use super::{CoerceCtx, FromValue};
use crate::error::CoerceError;
use crate::schema::Schema;
use crate::value::{Flag, Value};

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-+]?)\$?(?:\d+(?:,\d+)*(?:\.\d+)?|\d+\.\d+|\d+|\.\d+)(?:[eE][-+]?\d+)?%?")
        .expect("valid number regex")
});
static CURRENCY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Sc}").expect("valid regex"));
static BOOL_WORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(true|false)\b").expect("valid regex"));

/// Extracts the single leading/embedded numeric token from prose, per
/// spec §4.2.2 (`"1 cup butter"` → `1`, `"$1,234.56"` → `1234.56`,
/// `"1/2"` → `0.5`).
pub(crate) fn extract_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();

    if let Some((num, denom)) = trimmed.split_once('/') {
        if let (Ok(n), Ok(d)) = (num.trim().parse::<f64>(), denom.trim().parse::<f64>()) {
            if d != 0.0 {
                return Some(n / d);
            }
        }
    }

    let m = NUMBER_REGEX.find(trimmed)?;
    let without_commas = m.as_str().replace(',', "");
    let without_currency = CURRENCY_REGEX.replace_all(&without_commas, "");
    let without_percent = without_currency.trim_end_matches('%');
    without_percent.parse::<f64>().ok()
}

/// The coercer's own stringification of a Value for the String schema
/// (dispatch rule 1, spec §4.2.1 and §4.2.2). `AnyOf` returns its attached
/// original input text verbatim — the coercer must never invent string
/// content.
pub fn coerce_string_value(value: &Value) -> Result<(String, Vec<Flag>), CoerceError> {
    coerce_string_value_rooted(value, None)
}

/// Same as [`coerce_string_value`], but `root_raw`, when present, is the
/// original top-level input text: a bare (non-`AnyOf`) `Object`/`Array` that
/// looks structured returns it verbatim instead of being re-serialized
/// through `to_json_text`, per dispatch rule 1 — the coercer must never
/// invent string content.
pub fn coerce_string_value_rooted(
    value: &Value,
    root_raw: Option<&str>,
) -> Result<(String, Vec<Flag>), CoerceError> {
    match value {
        Value::AnyOf(_, original) => Ok((original.clone(), vec![])),
        Value::Markdown(_, inner) => {
            let (s, mut flags) = coerce_string_value_rooted(inner, root_raw)?;
            if matches!(inner.as_ref(), Value::Object(..) | Value::Array(..)) {
                flags.push(Flag::ObjectFromMarkdown);
            }
            Ok((s, flags))
        }
        Value::Fixed(inner, fixes) => {
            let (s, mut flags) = coerce_string_value_rooted(inner, root_raw)?;
            flags.extend(fixes.iter().map(|f| f.flag()));
            Ok((s, flags))
        }
        Value::String(s) => Ok((s.clone(), vec![])),
        Value::Number(n) => Ok((n.to_string(), vec![Flag::StringToNumber])),
        Value::Boolean(b) => Ok((b.to_string(), vec![Flag::StringToBool])),
        Value::Null => Ok(("null".to_string(), vec![])),
        Value::Object(..) | Value::Array(..) => match root_raw {
            Some(raw) if Value::looks_structured(raw) => Ok((raw.trim().to_string(), vec![])),
            _ => Ok((to_json_text(value), vec![])),
        },
    }
}

fn to_json_text(value: &Value) -> String {
    fn walk(value: &Value) -> serde_json::Value {
        match value {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
            Value::Object(entries, _) => serde_json::Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), walk(v))).collect(),
            ),
            Value::Array(items, _) => serde_json::Value::Array(items.iter().map(walk).collect()),
            Value::Markdown(_, inner) | Value::Fixed(inner, _) => walk(inner),
            Value::AnyOf(candidates, _) => {
                candidates.first().map(walk).unwrap_or(serde_json::Value::Null)
            }
        }
    }
    walk(value).to_string()
}

fn coerce_number(value: &Value) -> Result<(f64, Vec<Flag>), CoerceError> {
    match value {
        Value::Number(n) => Ok((n.as_f64().unwrap_or(0.0), vec![])),
        Value::String(s) => extract_number(s)
            .map(|n| (n, vec![Flag::StringToNumber]))
            .ok_or_else(|| CoerceError::coercion_failed("Number", format!("no number in `{s}`"))),
        Value::Array(items, _) if items.len() == 1 => {
            let (n, mut flags) = coerce_number(&items[0])?;
            flags.push(Flag::SingleToArray);
            Ok((n, flags))
        }
        Value::Object(entries, _) if entries.len() == 1 => {
            let (n, mut flags) = coerce_number(&entries[0].1)?;
            flags.push(Flag::ObjectToPrimitive);
            Ok((n, flags))
        }
        other => Err(CoerceError::coercion_failed(
            "Number",
            format!("cannot coerce {other:?} to a number"),
        )),
    }
}

macro_rules! impl_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromValue for $t {
                fn schema() -> Schema { Schema::Int }

                fn try_cast(value: &Value, _ctx: &mut CoerceCtx) -> Option<Self> {
                    match value {
                        Value::Number(n) => n.as_i64().and_then(|i| <$t>::try_from(i).ok()),
                        _ => None,
                    }
                }

                fn coerce(value: &Value, _ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
                    let (n, mut flags) = coerce_number(value)?;
                    if n.fract() != 0.0 {
                        flags.push(Flag::FloatToInt);
                    }
                    if !n.is_finite() {
                        return Err(CoerceError::InvalidNumber { text: n.to_string() });
                    }
                    let truncated = n.trunc();
                    if truncated < (<$t>::MIN as f64) || truncated > (<$t>::MAX as f64) {
                        return Err(CoerceError::InvalidNumber { text: n.to_string() });
                    }
                    Ok((truncated as $t, flags))
                }
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromValue for $t {
                fn schema() -> Schema { Schema::Float }

                fn try_cast(value: &Value, _ctx: &mut CoerceCtx) -> Option<Self> {
                    match value {
                        Value::Number(n) => n.as_f64().map(|f| f as $t),
                        _ => None,
                    }
                }

                fn coerce(value: &Value, _ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
                    let (n, flags) = coerce_number(value)?;
                    Ok((n as $t, flags))
                }
            }
        )+
    };
}

impl_float!(f32, f64);

impl FromValue for bool {
    fn schema() -> Schema {
        Schema::Bool
    }

    fn try_cast(value: &Value, _ctx: &mut CoerceCtx) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn coerce(value: &Value, _ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        match value {
            Value::Boolean(b) => Ok((*b, vec![])),
            Value::String(s) => {
                let lower = s.trim().to_lowercase();
                match lower.as_str() {
                    "true" | "yes" | "1" => Ok((true, vec![Flag::StringToBool])),
                    "false" | "no" | "0" => Ok((false, vec![Flag::StringToBool])),
                    _ => {
                        let words: Vec<&str> =
                            BOOL_WORD_REGEX.find_iter(s).map(|m| m.as_str()).collect();
                        let has_true = words.iter().any(|w| w.eq_ignore_ascii_case("true"));
                        let has_false = words.iter().any(|w| w.eq_ignore_ascii_case("false"));
                        match (has_true, has_false) {
                            (true, true) => Err(CoerceError::AmbiguousBoolean { text: s.clone() }),
                            (true, false) => Ok((true, vec![Flag::StringToBool])),
                            (false, true) => Ok((false, vec![Flag::StringToBool])),
                            (false, false) => Err(CoerceError::coercion_failed(
                                "Boolean",
                                format!("no boolean word in `{s}`"),
                            )),
                        }
                    }
                }
            }
            other => Err(CoerceError::coercion_failed(
                "Boolean",
                format!("cannot coerce {other:?} to a boolean"),
            )),
        }
    }
}

impl FromValue for String {
    fn schema() -> Schema {
        Schema::String
    }

    fn try_cast(value: &Value, _ctx: &mut CoerceCtx) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn coerce(value: &Value, _ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        coerce_string_value(value)
    }
}

/// Unit type maps onto the Null schema kind; only accepts a literal Null.
impl FromValue for () {
    fn schema() -> Schema {
        Schema::Null
    }

    fn try_cast(value: &Value, _ctx: &mut CoerceCtx) -> Option<Self> {
        matches!(value, Value::Null).then_some(())
    }

    fn coerce(value: &Value, _ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        match value {
            Value::Null => Ok(((), vec![])),
            other => Err(CoerceError::coercion_failed(
                "Null",
                format!("cannot coerce {other:?} to null"),
            )),
        }
    }
}
