//! Printing the `Schema` a `FromValue` derive generates, for a type that
//! nests an enum, an optional field, and a vector.

use jsonish::{FromValue, Schema};

#[derive(FromValue)]
enum Priority {
    Low,
    Medium,
    High,
}

#[derive(FromValue)]
struct Ticket {
    title: String,
    priority: Priority,
    assignee: Option<String>,
    labels: Vec<String>,
}

fn main() {
    let schema = Ticket::schema();
    print_schema(&schema, 0);
}

fn print_schema(schema: &Schema, depth: usize) {
    let indent = "  ".repeat(depth);
    match schema {
        Schema::Object { name, fields, strict } => {
            println!("{indent}Object {name} (strict={strict})");
            for field in fields {
                println!("{indent}  - {} (required={})", field.name, field.required);
                print_schema(&field.schema, depth + 2);
            }
        }
        Schema::Enum { name, values } => {
            println!("{indent}Enum {name}: {:?}", values.iter().map(|v| &v.name).collect::<Vec<_>>());
        }
        Schema::Array(inner) => {
            println!("{indent}Array of:");
            print_schema(inner, depth + 1);
        }
        Schema::Optional(inner) => {
            println!("{indent}Optional:");
            print_schema(inner, depth + 1);
        }
        other => println!("{indent}{other:?}"),
    }
}
