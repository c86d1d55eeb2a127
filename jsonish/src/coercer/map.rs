//! Map/record coercer (spec §4.2.4, final paragraph).

use std::collections::HashMap;

use super::{CoerceCtx, FromValue};
use crate::error::CoerceError;
use crate::schema::Schema;
use crate::value::{Flag, Value};

impl<V: FromValue + 'static> FromValue for HashMap<String, V> {
    fn schema() -> Schema {
        Schema::Map {
            key: Box::new(Schema::String),
            value: Box::new(V::schema()),
        }
    }

    fn try_cast(value: &Value, ctx: &mut CoerceCtx) -> Option<Self> {
        match value {
            Value::Object(entries, crate::value::CompletionState::Complete) => {
                let mut map = HashMap::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k.clone(), V::try_cast(v, ctx)?);
                }
                Some(map)
            }
            _ => None,
        }
    }

    fn coerce(value: &Value, ctx: &mut CoerceCtx) -> Result<(Self, Vec<Flag>), CoerceError> {
        match value {
            Value::Object(entries, _) => {
                let mut map = HashMap::with_capacity(entries.len());
                let mut flags = Vec::new();
                for (key, v) in entries {
                    let (coerced_value, mut value_flags) = super::coerce::<V>(v, ctx)?;
                    if map.insert(key.clone(), coerced_value).is_some() {
                        flags.push(Flag::DuplicateKey);
                    }
                    flags.append(&mut value_flags);
                }
                Ok((map, flags))
            }
            other => Err(CoerceError::coercion_failed(
                "Map",
                format!("cannot coerce {other:?} to a map"),
            )),
        }
    }
}
