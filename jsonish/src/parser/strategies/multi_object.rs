//! Strategy 3: multi-object scan (spec §4.1.1).
//!
//! Walks the input tracking brace/bracket depth, using the same quote-aware
//! boundary logic as the Fixing State Machine (`parser::quoting`) so a quote
//! embedded in one string can't be misread as closing a different one. Every
//! time depth returns to zero after having been positive, the enclosed slice
//! is one top-level candidate. Two or more candidates is what distinguishes
//! this strategy from a single well-formed document.

use crate::parser::quoting::find_string_end;

/// Returns the raw source slices of each top-level JSON-like value found by
/// depth-zero boundary tracking. A single top-level value yields a one-item
/// vec; the caller decides whether that's interesting.
pub fn top_level_spans(input: &str) -> Vec<&str> {
    let chars: Vec<char> = input.chars().collect();
    let mut spans = Vec::new();
    let mut depth: i32 = 0;
    let mut start_byte: Option<usize> = None;
    let mut start_char = 0usize;
    let mut i = 0usize;
    let mut byte_offsets = Vec::with_capacity(chars.len() + 1);
    let mut byte_pos = 0usize;
    for c in &chars {
        byte_offsets.push(byte_pos);
        byte_pos += c.len_utf8();
    }
    byte_offsets.push(byte_pos);

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                if depth == 0 && start_byte.is_none() {
                    i += 1;
                    continue;
                }
                i = find_string_end(&chars, i, c);
                continue;
            }
            '{' | '[' => {
                if depth == 0 {
                    start_byte = Some(byte_offsets[i]);
                    start_char = i;
                }
                depth += 1;
            }
            '}' | ']' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start_byte {
                            let end = byte_offsets[i + 1];
                            spans.push(&input[s..end]);
                        }
                        start_byte = None;
                        let _ = start_char;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    spans
}
