//! # jsonish
//!
//! A forgiving parser that converts messy LLM responses into strongly-typed
//! Rust values.
//!
//! This library handles common issues in LLM outputs like:
//! - JSON wrapped in markdown code blocks
//! - Multiple JSON objects back to back, with prose in between
//! - Trailing commas, unquoted keys, single quotes, unterminated strings
//! - Type mismatches (string numbers, a single object where a list was
//!   expected, an enum value buried in a sentence)
//!
//! Parsing runs in two stages. The Raw Parser (spec'd in [`parser`]) turns
//! raw text into a schema-agnostic [`value::Value`] tree, trying a fixed
//! cascade of strategies and keeping every reading that worked. The Coercer
//! ([`coercer`]) then matches that tree against the target type's schema,
//! penalizing each transformation it has to apply, and picks the
//! lowest-penalty result.
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonish::{parse, FromValue};
//!
//! #[derive(Debug, PartialEq, FromValue)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! // Parse messy LLM output with unquoted keys and a string number.
//! let messy_response = r#"{name: "Alice", age: "30"}"#;
//!
//! let user: User = parse(messy_response).unwrap();
//! assert_eq!(user.name, "Alice");
//! assert_eq!(user.age, 30);
//! ```
//!
//! ## Advanced usage
//!
//! [`parse_with_flags`] exposes which coercions were applied, and
//! [`ParseOptions`] controls which Raw Parser strategies run:
//!
//! ```rust
//! use jsonish::{parse_with_flags, ParseOptions, FromValue};
//!
//! #[derive(FromValue)]
//! struct Data {
//!     value: i32,
//! }
//!
//! let response = r#"{"value": "42"}"#;
//! let (data, flags) = parse_with_flags::<Data>(response, ParseOptions::default()).unwrap();
//! assert_eq!(data.value, 42);
//! assert!(!flags.is_empty());
//! ```

pub mod coercer;
pub mod constraints;
pub mod error;
pub mod parser;
pub mod schema;
pub mod scoring;
pub mod value;

pub use coercer::{CoerceCtx, FromValue};
pub use error::{JsonishError, Result};
pub use parser::ParseOptions;
pub use schema::{Schema, SchemaInfo};
pub use value::Flag;

#[cfg(feature = "derive")]
pub use jsonish_derive::FromValue;

/// Parses `input` into `T` using [`ParseOptions::default`].
///
/// This is the main entry point: run the Raw Parser, then coerce the result
/// against `T`'s schema.
///
/// # Errors
///
/// Returns [`JsonishError::DepthExceeded`] if the input nests past the Raw
/// Parser's depth cap, or [`JsonishError::CoercionFailed`] if nothing the
/// parser produced could be matched against `T`'s schema.
pub fn parse<T: FromValue>(input: &str) -> Result<T> {
    let (value, flags) = parse_with_flags(input, ParseOptions::default())?;
    let _ = flags;
    Ok(value)
}

/// Parses `input` into `T` with caller-supplied [`ParseOptions`].
pub fn parse_with_options<T: FromValue>(input: &str, options: ParseOptions) -> Result<T> {
    let (value, _flags) = parse_with_flags(input, options)?;
    Ok(value)
}

/// Parses `input` into `T`, also returning every [`Flag`] the coercion
/// accumulated — one per transformation applied along the way (case folding,
/// a single value wrapped into a one-element array, a default substituted
/// for a missing field, and so on).
pub fn parse_with_flags<T: FromValue>(
    input: &str,
    options: ParseOptions,
) -> Result<(T, Vec<Flag>)> {
    let raw = parser::parse(input, &options)?;
    let mut ctx = CoerceCtx::with_raw_input(options, input.to_string());
    coercer::coerce::<T>(&raw, &mut ctx).map_err(|source| JsonishError::CoercionFailed {
        schema_kind: T::schema().type_name(),
        source,
    })
}
