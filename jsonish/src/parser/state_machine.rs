//! The Fixing State Machine (spec §4.1.2).
//!
//! A character-by-character scanner that accepts malformed JSON and emits
//! the best-effort [`Value`] it can, annotating the result with [`Fix`]es
//! for every repair it had to make. It never fails on ill-formed input —
//! only on exceeding the nesting depth cap, which is a fatal condition
//! surfaced to the caller.

use serde_json::Number;

use super::quoting::{scan_quoted_literal, scan_triple_quoted};
use crate::error::JsonishError;
use crate::value::{CompletionState, Fix, Value};

/// Determines string-termination rules: where a bare/loosely-quoted value is
/// allowed to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    InNothing,
    InObjectKey,
    InObjectValue,
    InArray,
}

impl Position {
    /// Delimiters that end an *unquoted* scalar in this position, beyond the
    /// universal `,`/`}`/`]`.
    fn extra_terminators(self) -> &'static [char] {
        match self {
            Self::InObjectKey => &[':'],
            _ => &[],
        }
    }
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    fixes: Vec<Fix>,
}

type FixResult<T> = Result<T, JsonishError>;

impl Scanner {
    fn new(input: &str, max_depth: usize) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
            max_depth,
            fixes: Vec::new(),
        }
    }

    fn record(&mut self, fix: Fix) {
        if !self.fixes.contains(&fix) {
            self.fixes.push(fix);
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Skips whitespace, `// ...` line comments, and `/* ... */` block
    /// comments, flagging each as `CommentStripped`.
    fn skip_ws_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.pos += 1;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    self.record(Fix::CommentStripped);
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.record(Fix::CommentStripped);
                    self.pos += 2;
                    while !self.at_end() {
                        if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn enter(&mut self) -> FixResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(JsonishError::DepthExceeded { max_depth: self.max_depth });
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn parse_root(&mut self) -> FixResult<(Value, bool)> {
        self.skip_ws_and_comments();
        if self.at_end() {
            return Ok((Value::String(String::new()), true));
        }
        let value = self.parse_value(Position::InNothing)?;
        Ok((value, true))
    }

    fn parse_value(&mut self, ctx: Position) -> FixResult<Value> {
        self.skip_ws_and_comments();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') => {
                self.parse_triple_quoted()
            }
            Some(q @ ('"' | '\'')) => self.parse_quoted(q),
            _ => self.parse_unquoted(ctx),
        }
    }

    fn parse_triple_quoted(&mut self) -> FixResult<Value> {
        let (content, end) = scan_triple_quoted(&self.chars, self.pos)
            .expect("caller verified triple-quote prefix");
        self.pos = end;
        self.record(Fix::TripleQuoteDedented);
        Ok(Value::String(content))
    }

    fn parse_quoted(&mut self, quote: char) -> FixResult<Value> {
        let (content, end) = scan_quoted_literal(&self.chars, self.pos, quote);
        let ran_off_end = end >= self.chars.len() && self.chars.get(end.saturating_sub(1)) != Some(&quote);
        self.pos = end;
        if quote == '\'' {
            self.record(Fix::SingleQuoteFixed);
        }
        if ran_off_end {
            self.record(Fix::AutoClosedQuote);
        }
        Ok(Value::String(content))
    }

    /// Reads an unquoted run of characters in `ctx` position, stopping at a
    /// structural delimiter (or position-specific terminator), then converts
    /// it to the most specific scalar that fits.
    fn parse_unquoted(&mut self, ctx: Position) -> FixResult<Value> {
        let mut buf = String::new();
        let extra = ctx.extra_terminators();
        while let Some(c) = self.peek() {
            let terminates = matches!(c, ',' | '}' | ']') || extra.contains(&c);
            if terminates {
                break;
            }
            buf.push(c);
            self.pos += 1;
        }
        Ok(Self::finalize_scalar(buf.trim()))
    }

    fn finalize_scalar(raw: &str) -> Value {
        if raw.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }
        if raw.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Number(Number::from(n));
        }
        if let Ok(f) = raw.parse::<f64>() {
            if let Some(n) = Number::from_f64(f) {
                return Value::Number(n);
            }
        }
        Value::String(raw.to_string())
    }

    fn parse_object(&mut self) -> FixResult<Value> {
        self.enter()?;
        self.pos += 1; // consume '{'
        let mut entries: Vec<(String, Value)> = Vec::new();
        let mut completion = CompletionState::Complete;

        loop {
            self.skip_ws_and_comments();
            match self.peek() {
                None => {
                    completion = CompletionState::Incomplete;
                    self.record(Fix::AutoClosedBracket);
                    break;
                }
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => {
                    // stray leading/duplicate comma, just skip it
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_ws_and_comments();
            if self.peek() == Some(':') {
                self.pos += 1;
            }
            let value = self.parse_value(Position::InObjectValue)?;
            completion = completion.join(value.completion_state());
            entries.push((key, value));

            self.skip_ws_and_comments();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_ws_and_comments();
                    if self.peek() == Some('}') {
                        self.record(Fix::TrailingCommaFixed);
                        self.pos += 1;
                        break;
                    }
                }
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                None => {
                    completion = CompletionState::Incomplete;
                    self.record(Fix::AutoClosedBracket);
                    break;
                }
                _ => {
                    // missing comma between entries: tolerate and continue
                }
            }
        }

        self.exit();
        Ok(Value::Object(entries, completion))
    }

    fn parse_key(&mut self) -> FixResult<String> {
        self.skip_ws_and_comments();
        match self.peek() {
            Some('"') => {
                let (content, end) = scan_quoted_literal(&self.chars, self.pos, '"');
                self.pos = end;
                Ok(content)
            }
            Some('\'') => {
                let (content, end) = scan_quoted_literal(&self.chars, self.pos, '\'');
                self.pos = end;
                self.record(Fix::SingleQuoteFixed);
                Ok(content)
            }
            _ => {
                let mut buf = String::new();
                while let Some(c) = self.peek() {
                    if c == ':' || c == ',' || c == '}' {
                        break;
                    }
                    buf.push(c);
                    self.pos += 1;
                }
                self.record(Fix::UnquotedKeyFixed);
                Ok(buf.trim().to_string())
            }
        }
    }

    fn parse_array(&mut self) -> FixResult<Value> {
        self.enter()?;
        self.pos += 1; // consume '['
        let mut items = Vec::new();
        let mut completion = CompletionState::Complete;

        loop {
            self.skip_ws_and_comments();
            match self.peek() {
                None => {
                    completion = CompletionState::Incomplete;
                    self.record(Fix::AutoClosedBracket);
                    break;
                }
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let value = self.parse_value(Position::InArray)?;
            completion = completion.join(value.completion_state());
            items.push(value);

            self.skip_ws_and_comments();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_ws_and_comments();
                    if self.peek() == Some(']') {
                        self.record(Fix::TrailingCommaFixed);
                        self.pos += 1;
                        break;
                    }
                }
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                None => {
                    completion = CompletionState::Incomplete;
                    self.record(Fix::AutoClosedBracket);
                    break;
                }
                _ => {}
            }
        }

        self.exit();
        Ok(Value::Array(items, completion))
    }
}

/// Runs the Fixing State Machine over `input`, capped at `max_depth` nested
/// containers. Returns the repaired value wrapped in `Value::Fixed` (or bare,
/// if nothing needed repair) and is always successful except on depth
/// overflow.
pub fn fix_parse(input: &str, max_depth: usize) -> Result<Value, JsonishError> {
    let mut scanner = Scanner::new(input, max_depth);
    let (value, _) = scanner.parse_root()?;
    if scanner.fixes.is_empty() {
        Ok(value)
    } else {
        Ok(Value::Fixed(Box::new(value), scanner.fixes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(v: &Value) -> (&Value, &[Fix]) {
        match v {
            Value::Fixed(inner, fixes) => (inner.as_ref(), fixes.as_slice()),
            other => (other, &[]),
        }
    }

    #[test]
    fn parses_well_formed_object() {
        let v = fix_parse(r#"{"name": "Alice"}"#, 100).unwrap();
        let (inner, fixes) = fixed(&v);
        assert!(fixes.is_empty());
        match inner {
            Value::Object(entries, c) => {
                assert_eq!(*c, CompletionState::Complete);
                assert_eq!(entries[0].0, "name");
                assert_eq!(entries[0].1, Value::String("Alice".into()));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn unquoted_keys_and_trailing_comma() {
        let v = fix_parse("{key: value with space, items: [1,2,3,],}", 100).unwrap();
        let (inner, fixes) = fixed(&v);
        assert!(fixes.contains(&Fix::UnquotedKeyFixed));
        assert!(fixes.contains(&Fix::TrailingCommaFixed));
        match inner {
            Value::Object(entries, _) => {
                assert_eq!(entries[0], ("key".to_string(), Value::String("value with space".into())));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn quote_counting_inside_object_value() {
        let input = r#"{rec_two: "and then i said "hi", and also "bye""}"#;
        let v = fix_parse(input, 100).unwrap();
        let (inner, _) = fixed(&v);
        match inner {
            Value::Object(entries, _) => {
                assert_eq!(
                    entries[0].1,
                    Value::String(r#"and then i said "hi", and also "bye""#.into())
                );
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn unclosed_object_is_incomplete_and_auto_closed() {
        let v = fix_parse(r#"{"name": "Bob""#, 100).unwrap();
        let (inner, fixes) = fixed(&v);
        assert!(fixes.contains(&Fix::AutoClosedBracket));
        assert_eq!(inner.completion_state(), CompletionState::Incomplete);
    }

    #[test]
    fn depth_limit_is_fatal() {
        let deep = "[".repeat(200) + &"]".repeat(200);
        let err = fix_parse(&deep, 100).unwrap_err();
        assert!(matches!(err, JsonishError::DepthExceeded { max_depth: 100 }));
    }

    #[test]
    fn comments_are_stripped_and_flagged() {
        let v = fix_parse("{ // a comment\n \"a\": 1 }", 100).unwrap();
        let (inner, fixes) = fixed(&v);
        assert!(fixes.contains(&Fix::CommentStripped));
        match inner {
            Value::Object(entries, _) => assert_eq!(entries.len(), 1),
            _ => panic!("expected object"),
        }
    }
}
