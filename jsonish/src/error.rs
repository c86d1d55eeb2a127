//! Error taxonomy (spec §7).
//!
//! Local failures inside the coercer — a union option that doesn't match, a
//! required field with no rescue — are never thrown. They are represented as
//! `Err(CoerceError)` returned up the call stack and converted to a
//! `Flag::NoMatch` on that branch by the caller; only the outermost `parse`
//! call turns a failure into a surfaced [`JsonishError`].

use std::fmt;

/// Result type alias for the public API.
pub type Result<T> = std::result::Result<T, JsonishError>;

/// Errors that can escape the public `parse` boundary.
#[derive(Debug, thiserror::Error)]
pub enum JsonishError {
    /// Raw Parser recursion exceeded the depth-100 cap (fatal, spec §4.1.4).
    #[error("input nesting exceeded maximum depth of {max_depth}")]
    DepthExceeded {
        /// The configured cap that was exceeded.
        max_depth: usize,
    },

    /// The outermost coercion could not produce a value satisfying the schema.
    #[error("failed to coerce value into schema `{schema_kind}`: {source}")]
    CoercionFailed {
        /// The top-level schema kind that rejected every candidate.
        schema_kind: String,
        #[source]
        source: CoerceError,
    },

    /// Convenience conversion for a bare coercer error escaping uncaught.
    #[error(transparent)]
    Coerce(#[from] CoerceError),
}

/// Internal coercer failure taxonomy (spec §7).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoerceError {
    /// No union option coerced successfully.
    #[error("no union option matched the input")]
    NoUnionMatch,

    /// Required field absent and no implied-key/single-value rescue applied.
    #[error("required field `{field}` is missing and no rescue was available")]
    RequiredFieldMissing {
        /// Name of the missing field.
        field: String,
    },

    /// Both `true` and `false` appear as whole words in the source text.
    #[error("ambiguous boolean: both `true` and `false` appear in `{text}`")]
    AmbiguousBoolean {
        /// The text that contained both readings.
        text: String,
    },

    /// A non-string literal/enum matched more than one candidate value.
    #[error("ambiguous literal: `{text}` matches more than one option")]
    AmbiguousLiteral {
        /// The text that matched multiple options.
        text: String,
    },

    /// The same (schema node, value) frame was re-entered during union
    /// resolution.
    #[error("recursion detected: schema node `{schema_node}` re-entered with the same value")]
    RecursionDetected {
        /// Identity of the schema node that was re-entered.
        schema_node: String,
    },

    /// Number coercion target is integer but the value is non-finite or
    /// non-integral without a `FloatToInt` allowance.
    #[error("invalid number: `{text}` is not finite/integral as required")]
    InvalidNumber {
        /// The offending textual or numeric representation.
        text: String,
    },

    /// Union recursion exceeded the depth-25 cap; fails only the current
    /// branch (non-fatal — the caller tries the next union option).
    #[error("union recursion depth {max_depth} exceeded")]
    DepthExceeded {
        /// The configured union-recursion cap.
        max_depth: usize,
    },

    /// Generic catch-all: a schema-type that cannot accept the given Value.
    #[error("cannot coerce value into `{kind}`: {reason}")]
    CoercionFailed {
        /// The schema kind that rejected the value.
        kind: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl CoerceError {
    #[inline]
    pub fn coercion_failed(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CoercionFailed {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

impl serde::de::Error for CoerceError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::CoercionFailed {
            kind: "unknown".into(),
            reason: msg.to_string(),
        }
    }
}
