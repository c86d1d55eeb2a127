//! Shared quote-counting logic (spec §4.1.2).
//!
//! The Fixing State Machine and the Multi-Object Scan both need to decide
//! where a quoted string actually ends when the input contains unescaped
//! quotes inside the string body (`"and then i said "hi", and also "bye""`).
//! Both must use *identical* logic, or `{ "desc": "contains { braces }" }`
//! could be read as one object by one strategy and two by the other.
//!
//! The closing rule: a quote character closes the string only if the count
//! of unescaped matching quotes already kept in the buffer is even, AND the
//! next non-whitespace character after it is a structural delimiter
//! (`,`, `}`, `]`, `:`, or end-of-input). Otherwise it's literal content.

/// True if `c` is one of the delimiters that may follow a closing quote.
#[inline]
pub fn is_structural_delimiter(c: char) -> bool {
    matches!(c, ',' | '}' | ']' | ':')
}

/// Finds the index just past the matching closing quote for a quoted region
/// starting at `chars[start]` (which must equal `quote`), and returns the
/// unescaped literal content alongside it.
///
/// `start` points at the opening quote. The returned index is one past the
/// closing quote, or `chars.len()` if the string runs off the end of input
/// (the caller treats this as an auto-closed/incomplete string).
pub fn scan_quoted_literal(chars: &[char], start: usize, quote: char) -> (String, usize) {
    debug_assert_eq!(chars[start], quote);
    let mut buf = String::new();
    let mut i = start + 1;
    let mut quote_count: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            // A backslash escapes the next character; two backslashes do
            // not escape a third. Resolve common escapes, pass through the
            // rest verbatim.
            let next = chars[i + 1];
            match next {
                'n' => buf.push('\n'),
                't' => buf.push('\t'),
                'r' => buf.push('\r'),
                '"' | '\'' | '\\' | '/' => buf.push(next),
                _ => {
                    buf.push('\\');
                    buf.push(next);
                }
            }
            i += 2;
            continue;
        }

        if c == quote {
            let even_so_far = quote_count % 2 == 0;
            let next_non_ws = chars[i + 1..].iter().find(|c| !c.is_whitespace()).copied();
            let closes = even_so_far
                && match next_non_ws {
                    Some(d) => is_structural_delimiter(d),
                    None => true, // end-of-input counts as a structural boundary
                };
            if closes {
                return (buf, i + 1);
            }
            buf.push(c);
            quote_count += 1;
            i += 1;
            continue;
        }

        buf.push(c);
        i += 1;
    }

    // Ran off the end without a clean close: the whole tail is the string
    // body, auto-closed by the caller.
    (buf, chars.len())
}

/// Like [`scan_quoted_literal`] but only returns the end index — used by the
/// Multi-Object Scan to skip over a quoted region while tracking brace
/// depth, without needing the unescaped content.
#[inline]
pub fn find_string_end(chars: &[char], start: usize, quote: char) -> usize {
    scan_quoted_literal(chars, start, quote).1
}

/// Detects a triple-quoted region (`"""..."""`) starting at `chars[start]`.
/// Returns the dedented content and the index just past the closing triple
/// quote, or `None` if `start` isn't the beginning of a triple-quoted run.
pub fn scan_triple_quoted(chars: &[char], start: usize) -> Option<(String, usize)> {
    if chars.len() < start + 3 || chars[start..start + 3] != ['"', '"', '"'] {
        return None;
    }
    let mut i = start + 3;
    let body_start = i;
    while i + 2 < chars.len() {
        if chars[i] == '"' && chars[i + 1] == '"' && chars[i + 2] == '"' {
            let raw: String = chars[body_start..i].iter().collect();
            return Some((dedent(&raw), i + 3));
        }
        i += 1;
    }
    // Unterminated triple-quote: take the rest of the input.
    let raw: String = chars[body_start..].iter().collect();
    Some((dedent(&raw), chars.len()))
}

/// Strips the common leading-whitespace prefix (by codepoint) of every
/// non-blank line, per spec §9's resolved open question.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| *c == ' ' || *c == '\t').count())
        .min()
        .unwrap_or(0);

    if common == 0 {
        return text.to_string();
    }

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                l.to_string()
            } else {
                l.chars().skip(common).collect::<String>()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_counting_preserves_embedded_quotes() {
        let input = r#""and then i said "hi", and also "bye"""#;
        let chars: Vec<char> = input.chars().collect();
        let (content, end) = scan_quoted_literal(&chars, 0, '"');
        assert_eq!(content, r#"and then i said "hi", and also "bye""#);
        assert_eq!(end, chars.len());
    }

    #[test]
    fn quote_counting_stops_at_real_close_before_delimiter() {
        let input = r#""contains { braces }"}"#;
        let chars: Vec<char> = input.chars().collect();
        let (content, end) = scan_quoted_literal(&chars, 0, '"');
        assert_eq!(content, "contains { braces }");
        assert_eq!(chars[end], '}');
    }

    #[test]
    fn escaped_quote_never_closes() {
        let input = r#""she said \"hi\" to me""#;
        let chars: Vec<char> = input.chars().collect();
        let (content, _) = scan_quoted_literal(&chars, 0, '"');
        assert_eq!(content, "she said \"hi\" to me");
    }

    #[test]
    fn dedent_strips_common_leading_whitespace() {
        let text = "  line one\n  line two\n\n    line three";
        assert_eq!(dedent(text), "line one\nline two\n\n  line three");
    }

    #[test]
    fn triple_quoted_scan_extracts_and_dedents() {
        let input = "\"\"\"\n  hello\n  world\n\"\"\"";
        let chars: Vec<char> = input.chars().collect();
        let (content, end) = scan_triple_quoted(&chars, 0).unwrap();
        assert_eq!(content, "\nhello\nworld\n");
        assert_eq!(end, chars.len());
    }
}
