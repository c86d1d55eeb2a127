//! Parsing a typical messy LLM response into a typed struct.

use jsonish::{parse, FromValue};

#[derive(Debug, FromValue)]
struct User {
    name: String,
    age: u32,
    tags: Vec<String>,
}

fn main() {
    let response = r#"
Sure, here's the user record you asked for:

```json
{
    name: "Ada Lovelace",
    age: "36",
    tags: ["mathematician", "programmer"],
}
```
"#;

    let user: User = parse(response).expect("messy response should still parse");
    println!("{user:?}");
}
