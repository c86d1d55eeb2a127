//! Integration tests for the `FromValue` derive macro, exercised through the
//! `derive` feature of the `jsonish` crate.

use jsonish::schema::{LiteralValue, Schema};
use jsonish::{parse, FromValue};

#[derive(Debug, PartialEq, FromValue)]
struct SimpleStruct {
    name: String,
    age: u32,
}

#[test]
fn simple_struct_schema_shape() {
    match SimpleStruct::schema() {
        Schema::Object { name, fields, strict } => {
            assert_eq!(name, "SimpleStruct");
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "name");
            assert_eq!(fields[0].schema, Schema::String);
            assert!(fields[0].required);
            assert_eq!(fields[1].name, "age");
            assert_eq!(fields[1].schema, Schema::Int);
            assert!(!strict);
        }
        other => panic!("expected Object schema, got {other:?}"),
    }
}

#[derive(Debug, PartialEq, FromValue)]
struct StructWithOptional {
    required: String,
    optional: Option<i32>,
}

#[test]
fn optional_field_schema_wraps_in_optional() {
    match StructWithOptional::schema() {
        Schema::Object { fields, .. } => {
            assert!(!fields[0].required);
            match &fields[1].schema {
                Schema::Optional(inner) => assert_eq!(**inner, Schema::Int),
                other => panic!("expected Optional schema, got {other:?}"),
            }
            assert!(!fields[1].required);
        }
        other => panic!("expected Object schema, got {other:?}"),
    }
}

#[test]
fn optional_field_parses_absent_and_present() {
    let absent: StructWithOptional = parse(r#"{"required": "x"}"#).unwrap();
    assert_eq!(absent.optional, None);

    let present: StructWithOptional = parse(r#"{"required": "x", "optional": "5"}"#).unwrap();
    assert_eq!(present.optional, Some(5));
}

#[derive(Debug, PartialEq, FromValue)]
struct StructWithVec {
    items: Vec<String>,
    numbers: Vec<i32>,
}

#[test]
fn vec_field_schema_is_array_of_inner() {
    match StructWithVec::schema() {
        Schema::Object { fields, .. } => {
            match &fields[0].schema {
                Schema::Array(inner) => assert_eq!(**inner, Schema::String),
                other => panic!("expected Array schema, got {other:?}"),
            }
            match &fields[1].schema {
                Schema::Array(inner) => assert_eq!(**inner, Schema::Int),
                other => panic!("expected Array schema, got {other:?}"),
            }
        }
        other => panic!("expected Object schema, got {other:?}"),
    }
}

#[derive(Debug, PartialEq, FromValue)]
struct Inner {
    value: i32,
}

#[derive(Debug, PartialEq, FromValue)]
struct Outer {
    inner: Inner,
    tag: String,
}

#[test]
fn nested_struct_schema_and_parse() {
    match Outer::schema() {
        Schema::Object { fields, .. } => match &fields[0].schema {
            Schema::Object { name, fields, .. } => {
                assert_eq!(name, "Inner");
                assert_eq!(fields.len(), 1);
            }
            other => panic!("expected nested Object schema, got {other:?}"),
        },
        other => panic!("expected Object schema, got {other:?}"),
    }

    let outer: Outer = parse(r#"{"inner": {"value": 3}, "tag": "t"}"#).unwrap();
    assert_eq!(outer.inner.value, 3);
}

#[derive(Debug, PartialEq, FromValue)]
enum SimpleEnum {
    VariantOne,
    VariantTwo,
    VariantThree,
}

#[test]
fn unit_enum_schema_is_enum_with_variant_names() {
    match SimpleEnum::schema() {
        Schema::Enum { name, values } => {
            assert_eq!(name, "SimpleEnum");
            assert_eq!(values.len(), 3);
            assert_eq!(values[0].name, "VariantOne");
        }
        other => panic!("expected Enum schema, got {other:?}"),
    }
}

#[test]
fn unit_enum_matches_fuzzily() {
    let v: SimpleEnum = parse(r#""variant_two""#).unwrap();
    assert_eq!(v, SimpleEnum::VariantTwo);
}

#[derive(Debug, PartialEq, FromValue)]
enum IntOrBool {
    AsInt(i64),
    AsBool(bool),
}

#[test]
fn newtype_enum_schema_is_union() {
    match IntOrBool::schema() {
        Schema::Union { name, options, discriminator } => {
            assert_eq!(name, "IntOrBool");
            assert_eq!(options.len(), 2);
            assert!(discriminator.is_none());
        }
        other => panic!("expected Union schema, got {other:?}"),
    }
}

#[test]
fn type_name_reflects_literal_schema() {
    let lit = Schema::Literal(LiteralValue::Str("exact".into()));
    assert_eq!(lit.type_name(), "literal<exact>");
    assert_eq!(SimpleStruct::schema().type_name(), "SimpleStruct");
}

#[derive(Debug, PartialEq, FromValue)]
struct User {
    id: i64,
    name: String,
}

#[derive(Debug, PartialEq, FromValue)]
struct Product {
    id: i64,
    name: String,
}

#[test]
fn distinct_types_keep_distinct_schema_names() {
    assert_eq!(User::schema().type_name(), "User");
    assert_eq!(Product::schema().type_name(), "Product");
}

#[derive(Debug, PartialEq, FromValue)]
struct LinkedNode {
    value: i64,
    next: Option<Box<LinkedNode>>,
}

#[test]
fn box_of_self_field_becomes_a_recursive_alias() {
    match LinkedNode::schema() {
        Schema::Object { fields, .. } => {
            match &fields[1].schema {
                Schema::Optional(inner) => match inner.as_ref() {
                    Schema::RecursiveAlias { name, .. } => assert_eq!(name, "LinkedNode"),
                    other => panic!("expected RecursiveAlias schema, got {other:?}"),
                },
                other => panic!("expected Optional schema, got {other:?}"),
            }
        }
        other => panic!("expected Object schema, got {other:?}"),
    }
}

#[test]
fn recursive_alias_resolves_one_level_without_overflow() {
    match LinkedNode::schema() {
        Schema::Object { fields, .. } => match &fields[1].schema {
            Schema::Optional(inner) => {
                let resolved = inner.resolve();
                assert_eq!(resolved.type_name(), "LinkedNode");
            }
            other => panic!("expected Optional schema, got {other:?}"),
        },
        other => panic!("expected Object schema, got {other:?}"),
    }
}
