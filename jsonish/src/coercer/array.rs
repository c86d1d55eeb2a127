//! Array coercer (spec §4.2.3).

use super::{CoerceCtx, FromValue};
use crate::error::CoerceError;
use crate::schema::Schema;
use crate::scoring::flag_penalty_sum;
use crate::value::{CompletionState, Flag, Value};

impl<T: FromValue + 'static> FromValue for Vec<T> {
    fn schema() -> Schema {
        Schema::Array(Box::new(T::schema()))
    }

    fn try_cast(value: &Value, ctx: &mut CoerceCtx) -> Option<Self> {
        match value {
            Value::Array(items, CompletionState::Complete) => {
                items.iter().map(|i| T::try_cast(i, ctx)).collect()
            }
            _ => None,
        }
    }

    fn coerce(value: &Value, ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        match value {
            Value::Array(items, completion) => {
                let incomplete = *completion == CompletionState::Incomplete;
                let mut out = Vec::with_capacity(items.len());
                let mut child_scores = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    match super::coerce::<T>(item, ctx) {
                        Ok((v, flags)) => {
                            child_scores.push(flag_penalty_sum(&flags));
                            out.push(v);
                        }
                        Err(_) if incomplete && idx + 1 == items.len() => {
                            // Partial semantics (spec §4.3): an Incomplete
                            // array's failing tail element is dropped rather
                            // than failing the whole array.
                        }
                        Err(e) => return Err(e),
                    }
                }
                let mut flags = Vec::new();
                if incomplete {
                    flags.push(Flag::Incomplete);
                }
                Ok((out, flags))
            }
            other => {
                // Single non-array input: wrap as a length-1 array.
                let (v, mut flags) = super::coerce::<T>(other, ctx)?;
                flags.push(Flag::SingleToArray);
                Ok((vec![v], flags))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_array_of_ints() {
        let mut ctx = CoerceCtx::new(crate::parser::ParseOptions::default());
        let v = Value::Array(
            vec![Value::Number(1.into()), Value::Number(2.into())],
            CompletionState::Complete,
        );
        let (out, flags): (Vec<i64>, _) = Vec::<i64>::coerce(&v, &mut ctx).unwrap();
        assert_eq!(out, vec![1, 2]);
        assert!(flags.is_empty());
    }

    #[test]
    fn wraps_scalar_as_single_element_array() {
        let mut ctx = CoerceCtx::new(crate::parser::ParseOptions::default());
        let v = Value::Number(7.into());
        let (out, flags): (Vec<i64>, _) = Vec::<i64>::coerce(&v, &mut ctx).unwrap();
        assert_eq!(out, vec![7]);
        assert!(flags.contains(&Flag::SingleToArray));
    }

    #[test]
    fn incomplete_array_drops_failing_tail() {
        let mut ctx = CoerceCtx::new(crate::parser::ParseOptions::default());
        let v = Value::Array(
            vec![
                Value::Number(1.into()),
                Value::String("not-a-number-at-all-xyz".into()),
            ],
            CompletionState::Incomplete,
        );
        let (out, flags): (Vec<i64>, _) = Vec::<i64>::coerce(&v, &mut ctx).unwrap();
        assert_eq!(out, vec![1]);
        assert!(flags.contains(&Flag::Incomplete));
    }
}
