//! Tests for the `FromValue` derive macro's handling of data-carrying enums
//! (`Schema::Union`), including discriminated unions.

#![cfg(feature = "derive")]

use jsonish::{parse, FromValue};

#[derive(Debug, Clone, PartialEq, FromValue)]
enum IntOrString {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, FromValue)]
struct FlexibleData {
    value: IntOrString,
    count: i64,
}

#[test]
fn union_picks_the_matching_branch_by_shape() {
    let data1: FlexibleData = parse(r#"{"value": 42, "count": 1}"#).unwrap();
    assert_eq!(data1.value, IntOrString::Int(42));

    let data2: FlexibleData = parse(r#"{"value": "hello", "count": 2}"#).unwrap();
    assert_eq!(data2.value, IntOrString::Text("hello".to_string()));
}

#[test]
fn union_prefers_the_zero_penalty_branch_in_try_cast_phase() {
    // A bare string try-casts into Text with zero flags (String is a no-op
    // coercion of a String value) but into Int only via a StringToNumber
    // flag, so the try-cast phase picks Text before coerce is ever tried.
    let data: FlexibleData = parse(r#"{"value": "42", "count": 3}"#).unwrap();
    assert_eq!(data.value, IntOrString::Text("42".to_string()));
}

#[derive(Debug, Clone, PartialEq, FromValue)]
#[jsonish(discriminator = "kind")]
enum Shape {
    #[jsonish(tag = "circle")]
    Circle(Circle),
    #[jsonish(tag = "square")]
    Square(Square),
}

#[derive(Debug, Clone, PartialEq, FromValue)]
struct Circle {
    kind: String,
    radius: f64,
}

#[derive(Debug, Clone, PartialEq, FromValue)]
struct Square {
    kind: String,
    side: f64,
}

#[test]
fn discriminated_union_short_circuits_on_tag_field() {
    let shape: Shape = parse(r#"{"kind": "circle", "radius": 2.5}"#).unwrap();
    match shape {
        Shape::Circle(c) => assert_eq!(c.radius, 2.5),
        Shape::Square(_) => panic!("expected circle"),
    }

    let shape: Shape = parse(r#"{"kind": "square", "side": 4.0}"#).unwrap();
    match shape {
        Shape::Square(s) => assert_eq!(s.side, 4.0),
        Shape::Circle(_) => panic!("expected square"),
    }
}

#[derive(Debug, Clone, PartialEq, FromValue)]
struct AliasedFields {
    #[jsonish(alias = "user_id")]
    id: i64,
    #[jsonish(alias = "full_name", alias = "displayName")]
    name: String,
}

#[test]
fn declared_aliases_match_before_case_convention_tier() {
    let rec: AliasedFields = parse(r#"{"user_id": 7, "displayName": "Ada"}"#).unwrap();
    assert_eq!(rec.id, 7);
    assert_eq!(rec.name, "Ada");
}

#[derive(Debug, Clone, PartialEq, FromValue)]
struct SingleFieldWrapper {
    value: String,
}

#[test]
fn sole_required_field_rescues_a_bare_scalar_input() {
    let rec: SingleFieldWrapper = parse(r#""just a string""#).unwrap();
    assert_eq!(rec.value, "just a string");
}

#[derive(Debug, Clone, PartialEq, FromValue)]
enum Branch {
    Num(i64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, FromValue)]
struct Node {
    value: Branch,
    next: Option<Box<Node>>,
}

#[test]
fn self_referential_struct_preserves_values_through_nested_recursion() {
    let input = r#"{
        "value": 1,
        "next": {
            "value": true,
            "next": {
                "value": 2,
                "next": null
            }
        }
    }"#;

    let node: Node = parse(input).unwrap();
    assert_eq!(node.value, Branch::Num(1));

    let next = *node.next.unwrap();
    assert_eq!(next.value, Branch::Bool(true));

    let last = *next.next.unwrap();
    assert_eq!(last.value, Branch::Num(2));
    assert!(last.next.is_none());
}
