//! The intermediate value model produced by the Raw Parser and consumed by the Coercer.
//!
//! Unlike a `serde_json::Value`, this tagged union keeps the provenance a noisy
//! input carried on its way to becoming a value: whether a string was pulled out
//! of a fenced code block, whether a container had to be auto-closed, and
//! whether several strategies each produced a plausible reading of the same
//! text. `serde_json::Number` is reused for the numeric payload since it
//! already covers the i64/u64/f64 range this engine targets without pulling in
//! another bignum dependency.

use serde_json::Number;

/// Whether a string or container was fully delimited in the input, or had to
/// be auto-closed by the Fixing State Machine because the input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionState {
    Complete,
    Incomplete,
}

impl CompletionState {
    /// Combines this state with a child's state: a container is `Incomplete`
    /// if any child is `Incomplete`.
    #[inline]
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        if self == Self::Incomplete || other == Self::Incomplete {
            Self::Incomplete
        } else {
            Self::Complete
        }
    }

    #[inline]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// A single repair the Fixing State Machine applied while recovering a Value
/// from malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fix {
    TrailingCommaFixed,
    UnquotedKeyFixed,
    AutoClosedBracket,
    AutoClosedQuote,
    SingleQuoteFixed,
    CommentStripped,
    TripleQuoteDedented,
}

impl Fix {
    /// The flag this fix contributes once the repaired Value is coerced.
    #[inline]
    pub const fn flag(self) -> Flag {
        match self {
            Self::TrailingCommaFixed => Flag::TrailingCommaFixed,
            Self::UnquotedKeyFixed => Flag::UnquotedKeyFixed,
            Self::AutoClosedBracket => Flag::AutoClosedBracket,
            Self::AutoClosedQuote => Flag::AutoClosedQuote,
            Self::SingleQuoteFixed => Flag::SingleQuoteFixed,
            // Comment stripping and dedenting are not separately penalized in
            // the flag table; they piggyback on the enclosing `Fixed` wrapper
            // without an extra flag of their own.
            Self::CommentStripped | Self::TripleQuoteDedented => Flag::TrailingCommaFixed,
        }
    }
}

/// The engine's internal tagged-union representation of parsed JSON-like data.
///
/// Values are constructed exclusively by the Raw Parser, consumed exclusively
/// by the Coercer, and are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
    Object(Vec<(String, Value)>, CompletionState),
    Array(Vec<Value>, CompletionState),
    /// `(language tag, inner value)` — captures markdown-fence extraction provenance.
    Markdown(Option<String>, Box<Value>),
    /// `(inner value, fixes applied)` — records error-recovery. Never nests
    /// directly inside another `Fixed`; repairs collapse into one `Vec<Fix>`.
    Fixed(Box<Value>, Vec<Fix>),
    /// `(candidates, original input text)` — multiple readings of the same
    /// input, left for the coercer to choose among.
    AnyOf(Vec<Value>, String),
}

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// The completion state of this value, unwrapping `Markdown`/`Fixed`
    /// wrappers and collapsing `AnyOf` to the best (most complete) candidate.
    pub fn completion_state(&self) -> CompletionState {
        match self {
            Self::Object(_, c) | Self::Array(_, c) => *c,
            Self::Markdown(_, inner) | Self::Fixed(inner, _) => inner.completion_state(),
            Self::AnyOf(candidates, _) => candidates
                .iter()
                .map(Value::completion_state)
                .find(|s| s.is_complete())
                .unwrap_or(CompletionState::Incomplete),
            _ => CompletionState::Complete,
        }
    }

    /// Strips `Markdown` and `Fixed` wrappers, returning the innermost value
    /// and the fixes that were collected along the way.
    pub fn unwrap_layers(&self) -> (&Value, Vec<Fix>) {
        let mut fixes = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::Markdown(_, inner) => current = inner,
                Self::Fixed(inner, f) => {
                    fixes.extend_from_slice(f);
                    current = inner;
                }
                _ => return (current, fixes),
            }
        }
    }

    /// True if the raw, leading-whitespace-trimmed text this value would
    /// stringify to looks like it was structured input (object, array, fence,
    /// or a quoted literal) rather than bare prose. Used by the coercer's
    /// string short-circuit (dispatch rule 1).
    pub fn looks_structured(raw: &str) -> bool {
        let trimmed = raw.trim_start();
        matches!(
            trimmed.chars().next(),
            Some('{') | Some('[') | Some('"') | Some('\'')
        ) || trimmed.starts_with("```")
    }

    pub fn is_any_of(&self) -> bool {
        matches!(self, Self::AnyOf(..))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(
                items.into_iter().map(Value::from).collect(),
                CompletionState::Complete,
            ),
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
                CompletionState::Complete,
            ),
        }
    }
}

/// A provenance/penalty marker attached to a coerced result (spec §3.2).
///
/// Each flag carries a fixed integer penalty consumed by [`crate::scoring`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    ExactMatch,
    UnionMatch,
    OptionalDefaultFromNoValue,
    StringToBool,
    StringToNumber,
    FloatToInt,
    SingleToArray,
    ArrayToSingle,
    ObjectToPrimitive,
    ImpliedKey,
    SubstringMatch,
    CaseCoerced,
    PunctuationStripped,
    ObjectFromMarkdown,
    TrailingCommaFixed,
    UnquotedKeyFixed,
    AutoClosedBracket,
    AutoClosedQuote,
    SingleQuoteFixed,
    Incomplete,
    DefaultFromNoValue,
    DefaultButHadValue,
    /// An input key matched no declared field, on an open (non-strict) schema.
    ExtraKey,
    /// Same condition on a `strict` schema, penalized unlike its open-schema
    /// counterpart (spec §3.2's one schema-capability-dependent flag).
    StrictExtraKey,
    DuplicateKey,
    /// Coercion failed outright; the composite score becomes infinite.
    NoMatch,
}

impl Flag {
    /// The fixed integer penalty from spec §3.2. `NoMatch` is represented as
    /// `u32::MAX`, which [`crate::scoring::CompositeScore`] treats as infinity.
    #[inline]
    pub const fn penalty(&self) -> u32 {
        match self {
            Self::ExactMatch | Self::UnionMatch => 0,
            Self::OptionalDefaultFromNoValue => 1,
            Self::StringToBool => 1,
            Self::StringToNumber => 1,
            Self::FloatToInt => 1,
            Self::SingleToArray => 2,
            Self::ArrayToSingle => 2,
            Self::ObjectToPrimitive => 2,
            Self::ImpliedKey => 2,
            Self::SubstringMatch => 2,
            Self::CaseCoerced => 1,
            Self::PunctuationStripped => 1,
            Self::ObjectFromMarkdown => 2,
            Self::TrailingCommaFixed
            | Self::UnquotedKeyFixed
            | Self::AutoClosedBracket
            | Self::AutoClosedQuote
            | Self::SingleQuoteFixed => 1,
            Self::Incomplete => 3,
            Self::DefaultFromNoValue => 100,
            Self::DefaultButHadValue => 110,
            Self::ExtraKey => 0,
            Self::StrictExtraKey => 1,
            Self::DuplicateKey => 1,
            Self::NoMatch => u32::MAX,
        }
    }
}
