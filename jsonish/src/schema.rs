//! Schema introspection adapter (spec §6).
//!
//! [`Schema`] is the read-only interface the Coercer queries: kind tag,
//! element/field types, and literal/enum permitted values. The core never
//! depends on any single schema library's type system — it only needs
//! whatever implements [`SchemaInfo`] to hand back a `Schema` value.
//!
//! This extends the teacher's `Schema`/`SchemaInfo` pair (which already
//! separated "what a schema looks like" from "how a Rust type deserializes")
//! with the kinds the coercer needs that a plain Rust type system doesn't
//! distinguish on its own: `Literal`, `Enum`, the `Optional`/`Nullable`
//! distinction, union discriminators, and recursive aliases.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The shape of a target type, as the Coercer needs to see it.
#[derive(Debug, Clone)]
pub enum Schema {
    String,
    Int,
    Float,
    Bool,
    /// The unit/null type — distinct from `Optional`/`Nullable`, which wrap
    /// another schema.
    Null,

    /// Object/struct with named fields.
    Object {
        name: String,
        fields: Vec<Field>,
        /// Extra input keys add a nonzero penalty when `true` (spec §9 open
        /// question; default resolved to `false` — see DESIGN.md).
        strict: bool,
    },

    /// Array/Vec of elements.
    Array(Box<Schema>),

    /// Map/record keyed by a string-like schema.
    Map { key: Box<Schema>, value: Box<Schema> },

    /// `Option<T>`: missing/absent coerces to "no value", no flag at the
    /// struct level; `Null` input also coerces to "no value".
    Optional(Box<Schema>),

    /// `T | null` at the value level: `Null` input is accepted as `null`;
    /// missing also becomes `null`, but with `OptionalDefaultFromNoValue`.
    Nullable(Box<Schema>),

    /// Union of alternative schemas, resolved by the two-phase coercer
    /// (spec §4.2.5).
    Union {
        name: String,
        options: Vec<Schema>,
        discriminator: Option<Discriminator>,
    },

    /// A single permitted literal value.
    Literal(LiteralValue),

    /// A fixed set of named values (Rust `enum` with unit variants), each
    /// with optional alternate spellings.
    Enum { name: String, values: Vec<EnumValue> },

    /// Fixed-arity heterogeneous sequence.
    Tuple(Vec<Schema>),

    /// A self-referential schema node, resolved lazily on each descent.
    /// Equality and hashing are by `name` only — the getter is not
    /// comparable, and the recursion guard in the union coercer keys on
    /// `(name, value-identity)` rather than trying to compare bodies.
    RecursiveAlias {
        name: String,
        resolve: Arc<dyn Fn() -> Schema + Send + Sync>,
    },
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String, Self::String)
            | (Self::Int, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::Bool, Self::Bool)
            | (Self::Null, Self::Null) => true,
            (
                Self::Object { name: n1, fields: f1, strict: s1 },
                Self::Object { name: n2, fields: f2, strict: s2 },
            ) => n1 == n2 && f1 == f2 && s1 == s2,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map { key: k1, value: v1 }, Self::Map { key: k2, value: v2 }) => {
                k1 == k2 && v1 == v2
            }
            (Self::Optional(a), Self::Optional(b)) => a == b,
            (Self::Nullable(a), Self::Nullable(b)) => a == b,
            (
                Self::Union { name: n1, options: o1, discriminator: d1 },
                Self::Union { name: n2, options: o2, discriminator: d2 },
            ) => n1 == n2 && o1 == o2 && d1 == d2,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Enum { name: n1, values: v1 }, Self::Enum { name: n2, values: v2 }) => {
                n1 == n2 && v1 == v2
            }
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::RecursiveAlias { name: n1, .. }, Self::RecursiveAlias { name: n2, .. }) => {
                n1 == n2
            }
            _ => false,
        }
    }
}

/// A discriminator: a schema-declared field whose literal/enum value selects
/// a union branch directly, short-circuiting the two-phase resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub field: String,
}

/// A permitted literal value for a `Schema::Literal` node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One permitted value of an `Enum` schema, with its declared aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub aliases: Vec<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), aliases: Vec::new() }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// A declared field in an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
    /// Explicit alternate spellings the schema author declared (alias
    /// tier 3, spec §4.2.4 point 1). Common case-convention variants
    /// (camelCase/snake_case/kebab-case) are derived automatically by the
    /// object coercer and do not need to be listed here.
    pub aliases: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
            aliases: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = String>) -> Self {
        self.aliases.extend(aliases);
        self
    }

    /// True if `name` matches this field's declared name or one of its
    /// explicit aliases (alias tier 3). Case-convention variants are handled
    /// separately by the object coercer's matching-quality tiers.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

impl Schema {
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "string".into(),
            Self::Int => "int".into(),
            Self::Float => "float".into(),
            Self::Bool => "bool".into(),
            Self::Null => "null".into(),
            Self::Object { name, .. } => name.clone(),
            Self::Array(inner) => format!("array<{}>", inner.type_name()),
            Self::Map { key, value } => format!("map<{}, {}>", key.type_name(), value.type_name()),
            Self::Optional(inner) => format!("optional<{}>", inner.type_name()),
            Self::Nullable(inner) => format!("nullable<{}>", inner.type_name()),
            Self::Union { name, .. } => name.clone(),
            Self::Literal(lit) => format!("literal<{lit}>"),
            Self::Enum { name, .. } => name.clone(),
            Self::Tuple(schemas) => {
                let types = schemas.iter().map(Schema::type_name).collect::<Vec<_>>().join(", ");
                format!("({types})")
            }
            Self::RecursiveAlias { name, .. } => name.clone(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Int | Self::Float | Self::Bool | Self::Null)
    }

    pub fn is_composite(&self) -> bool {
        !self.is_primitive()
    }

    /// Resolves one level of `RecursiveAlias` indirection, if present.
    pub fn resolve(&self) -> Schema {
        match self {
            Self::RecursiveAlias { resolve, .. } => resolve(),
            other => other.clone(),
        }
    }
}

/// Types that can provide runtime schema information, typically derived via
/// `#[derive(SchemaInfo)]`.
pub trait SchemaInfo {
    fn schema() -> Schema;
}

impl SchemaInfo for String {
    fn schema() -> Schema {
        Schema::String
    }
}
impl SchemaInfo for &str {
    fn schema() -> Schema {
        Schema::String
    }
}

macro_rules! int_schema {
    ($($t:ty),*) => {
        $(impl SchemaInfo for $t { fn schema() -> Schema { Schema::Int } })*
    };
}
int_schema!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl SchemaInfo for f32 {
    fn schema() -> Schema {
        Schema::Float
    }
}
impl SchemaInfo for f64 {
    fn schema() -> Schema {
        Schema::Float
    }
}
impl SchemaInfo for bool {
    fn schema() -> Schema {
        Schema::Bool
    }
}
impl SchemaInfo for () {
    fn schema() -> Schema {
        Schema::Null
    }
}

impl<T: SchemaInfo> SchemaInfo for Option<T> {
    fn schema() -> Schema {
        Schema::Optional(Box::new(T::schema()))
    }
}
impl<T: SchemaInfo> SchemaInfo for Vec<T> {
    fn schema() -> Schema {
        Schema::Array(Box::new(T::schema()))
    }
}
impl<T: SchemaInfo, const N: usize> SchemaInfo for [T; N] {
    fn schema() -> Schema {
        Schema::Array(Box::new(T::schema()))
    }
}
impl<K: SchemaInfo, V: SchemaInfo> SchemaInfo for HashMap<K, V> {
    fn schema() -> Schema {
        Schema::Map { key: Box::new(K::schema()), value: Box::new(V::schema()) }
    }
}

impl<T1: SchemaInfo> SchemaInfo for (T1,) {
    fn schema() -> Schema {
        Schema::Tuple(vec![T1::schema()])
    }
}
impl<T1: SchemaInfo, T2: SchemaInfo> SchemaInfo for (T1, T2) {
    fn schema() -> Schema {
        Schema::Tuple(vec![T1::schema(), T2::schema()])
    }
}
impl<T1: SchemaInfo, T2: SchemaInfo, T3: SchemaInfo> SchemaInfo for (T1, T2, T3) {
    fn schema() -> Schema {
        Schema::Tuple(vec![T1::schema(), T2::schema(), T3::schema()])
    }
}
impl<T1: SchemaInfo, T2: SchemaInfo, T3: SchemaInfo, T4: SchemaInfo> SchemaInfo
    for (T1, T2, T3, T4)
{
    fn schema() -> Schema {
        Schema::Tuple(vec![T1::schema(), T2::schema(), T3::schema(), T4::schema()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_schemas() {
        assert_eq!(String::schema(), Schema::String);
        assert_eq!(i32::schema(), Schema::Int);
        assert_eq!(f64::schema(), Schema::Float);
        assert_eq!(bool::schema(), Schema::Bool);
    }

    #[test]
    fn optional_vs_nullable_are_distinct() {
        let opt = Schema::Optional(Box::new(Schema::String));
        let nul = Schema::Nullable(Box::new(Schema::String));
        assert_ne!(opt, nul);
    }

    #[test]
    fn recursive_alias_equality_is_by_name() {
        let a = Schema::RecursiveAlias { name: "Node".into(), resolve: Arc::new(|| Schema::Null) };
        let b = Schema::RecursiveAlias { name: "Node".into(), resolve: Arc::new(|| Schema::Int) };
        assert_eq!(a, b);
    }

    #[test]
    fn field_alias_matching() {
        let field = Field::new("user_name", Schema::String)
            .with_alias("userName")
            .with_alias("UserName");
        assert!(field.aliases.contains(&"userName".to_string()));
    }

    #[test]
    fn union_schema_type_name_uses_declared_name() {
        let union = Schema::Union {
            name: "Shape".into(),
            options: vec![Schema::Int, Schema::String],
            discriminator: None,
        };
        assert_eq!(union.type_name(), "Shape");
    }
}
