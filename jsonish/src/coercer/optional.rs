//! Optional/nullable coercion (spec §4.2.7).
//!
//! The schema model distinguishes `Optional` (field may be absent) from
//! `Nullable` (field may be explicitly `null`), but a Rust `Option<T>` field
//! is the natural spelling of both at once: a missing field and an explicit
//! `Null` both produce `None`. Resolved open question (see DESIGN.md): the
//! derive crate marks fields `Optional` by default and additionally treats an
//! incoming `Null` as a missing value, so one Rust type serves either
//! schema-level meaning without the caller needing a second wrapper type.

use super::{CoerceCtx, FromValue};
use crate::error::CoerceError;
use crate::schema::Schema;
use crate::value::{Flag, Value};

impl<T: FromValue + 'static> FromValue for Option<T> {
    fn schema() -> Schema {
        Schema::Optional(Box::new(T::schema()))
    }

    fn try_cast(value: &Value, ctx: &mut CoerceCtx) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::try_cast(other, ctx).map(Some),
        }
    }

    fn coerce(value: &Value, ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        match value {
            Value::Null => Ok((None, vec![Flag::OptionalDefaultFromNoValue])),
            other => {
                let (v, flags) = super::coerce::<T>(other, ctx)?;
                Ok((Some(v), flags))
            }
        }
    }
}
