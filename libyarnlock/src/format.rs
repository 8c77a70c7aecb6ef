//! Scalar Formatter
//!
//! Decides whether a raw scalar needs quoting to survive a
//! tokenize/parse round trip, and produces its textual form. The bare
//! admission rules here mirror the tokenizer exactly: a value is
//! emitted unquoted only if the tokenizer would scan it back as a
//! single bare string token with the same characters.

use crate::tokenizer::{is_bare_start, is_delimiter};

/// Format a raw scalar as a token: bare when safe, double-quoted
/// otherwise.
pub fn wrap_scalar(raw: &str) -> String {
    if needs_quotes(raw) {
        quote(raw)
    } else {
        raw.to_string()
    }
}

/// A value must be quoted unless all of these hold: it opens with a
/// bare-start character, contains no delimiter, is not a boolean
/// literal, and is not a pure digit run (which would scan as a Number).
fn needs_quotes(raw: &str) -> bool {
    let first = match raw.bytes().next() {
        Some(b) => b,
        None => return true,
    };
    if !is_bare_start(first) {
        return true;
    }
    if raw.bytes().any(is_delimiter) {
        return true;
    }
    if raw == "true" || raw == "false" {
        return true;
    }
    raw.bytes().all(|b| b.is_ascii_digit())
}

/// Double-quote a string, escaping so the tokenizer decodes it back to
/// the same characters. `/` is left unescaped so URLs stay readable.
fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
