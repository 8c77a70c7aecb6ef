//! Phase 1: Tokenizer
//!
//! The tokenizer converts raw lockfile text into a flat token stream,
//! tracking line/column positions and indentation depth. Indentation is
//! only significant immediately after a line terminator; elsewhere a
//! space is a plain separator. Columns count bytes.

use crate::error::{ParseContext, ParseError, Result};
use crate::value::Scalar;

/// Token kind in the tokenizer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `true` / `false` literal.
    Boolean,
    /// Bare or quoted string, including comment bodies' sibling uses.
    String,
    /// Reserved for identifier-shaped tokens; the grammar never emits it.
    Identifier,
    /// End of input; always the final token.
    Eof,
    /// `:`
    Colon,
    /// Line terminator (`\n` or `\r\n`).
    NewLine,
    /// `#` comment, value is the body text.
    Comment,
    /// Run of leading spaces, value is the depth (spaces / 2).
    Indent,
    /// Reserved for unscannable input; reported as an error instead.
    Invalid,
    /// Run of ASCII digits.
    Number,
    /// `,`
    Comma,
}

/// A single token with its source position.
///
/// Built only by [`tokenize`]; the parser reads tokens but never
/// mutates them.
#[derive(Debug, Clone)]
pub struct Token {
    pub line: usize,
    pub col: usize,
    pub kind: TokenKind,
    pub value: Option<Scalar>,
}

impl Token {
    fn new(kind: TokenKind, line: usize, col: usize, value: Option<Scalar>) -> Self {
        Self {
            line,
            col,
            kind,
            value,
        }
    }
}

/// Characters that may open a bare (unquoted) string token.
pub(crate) fn is_bare_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'/' || b == b'.' || b == b'-'
}

/// Characters that terminate a bare string token.
pub(crate) fn is_delimiter(b: u8) -> bool {
    matches!(b, b':' | b' ' | b'\r' | b'\n' | b',')
}

/// Tokenize lockfile text into a token stream ending with one Eof token.
///
/// Fatal conditions: an odd run of leading spaces, an unterminated or
/// badly escaped quoted string, and any character matching no rule.
pub fn tokenize(input: &str, ctx: &ParseContext) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut line = 0usize;
    let mut col = 0usize;
    let mut last_new_line = false;
    let mut rest = input;

    while !rest.is_empty() {
        let bytes = rest.as_bytes();
        let b = bytes[0];
        let chop;

        if b == b'\n' || rest.starts_with("\r\n") {
            chop = if b == b'\r' { 2 } else { 1 };
            line += 1;
            col = 0;
            // Built after the position advances, so the token reports
            // the start of the line it opens.
            tokens.push(Token::new(TokenKind::NewLine, line, col, None));
            last_new_line = true;
            rest = &rest[chop..];
            continue;
        } else if b == b'#' {
            let end = rest[1..].find('\n').map(|i| i + 1).unwrap_or(rest.len());
            let mut body = &rest[1..end];
            // Leave the \r of a \r\n terminator for the newline rule.
            if let Some(stripped) = body.strip_suffix('\r') {
                body = stripped;
            }
            chop = 1 + body.len();
            tokens.push(Token::new(
                TokenKind::Comment,
                line,
                col,
                Some(Scalar::Str(body.to_string())),
            ));
        } else if b == b' ' {
            if last_new_line {
                let width = bytes.iter().take_while(|&&b| b == b' ').count();
                if width % 2 == 1 {
                    return Err(
                        ParseError::InvalidIndent(String::new()).with_location(ctx, line, col)
                    );
                }
                tokens.push(Token::new(
                    TokenKind::Indent,
                    line,
                    col,
                    Some(Scalar::Int((width / 2) as i64)),
                ));
                chop = width;
            } else {
                chop = 1;
            }
        } else if b == b'"' {
            let close = find_closing_quote(bytes);
            match close {
                Some(i) => {
                    let decoded = decode_quoted(&rest[1..i], ctx, line, col)?;
                    tokens.push(Token::new(
                        TokenKind::String,
                        line,
                        col,
                        Some(Scalar::Str(decoded)),
                    ));
                    chop = i + 1;
                }
                None => {
                    return Err(
                        ParseError::UnterminatedString(String::new()).with_location(ctx, line, col)
                    );
                }
            }
        } else if b.is_ascii_digit() {
            let width = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            let n = rest[..width].parse::<i64>().unwrap_or(0);
            tokens.push(Token::new(
                TokenKind::Number,
                line,
                col,
                Some(Scalar::Int(n)),
            ));
            chop = width;
        } else if rest.starts_with("true") {
            tokens.push(Token::new(
                TokenKind::Boolean,
                line,
                col,
                Some(Scalar::Bool(true)),
            ));
            chop = 4;
        } else if rest.ends_with("false") {
            // `true` is a prefix match at the cursor but `false` is a
            // suffix match on the remaining input; a mid-document
            // `false` therefore lexes as a bare string instead.
            tokens.push(Token::new(
                TokenKind::Boolean,
                line,
                col,
                Some(Scalar::Bool(false)),
            ));
            chop = 5;
        } else if b == b':' {
            tokens.push(Token::new(TokenKind::Colon, line, col, None));
            chop = 1;
        } else if b == b',' {
            tokens.push(Token::new(TokenKind::Comma, line, col, None));
            chop = 1;
        } else if is_bare_start(b) {
            let width = bytes
                .iter()
                .take_while(|&&b| !is_delimiter(b))
                .count();
            tokens.push(Token::new(
                TokenKind::String,
                line,
                col,
                Some(Scalar::Str(rest[..width].to_string())),
            ));
            chop = width;
        } else {
            let c = rest.chars().next().unwrap_or('\u{FFFD}');
            return Err(ParseError::UnexpectedChar(c, String::new()).with_location(ctx, line, col));
        }

        col += chop;
        last_new_line = false;
        rest = &rest[chop..];
    }

    tokens.push(Token::new(TokenKind::Eof, line, col, None));
    Ok(tokens)
}

/// Find the closing quote of a quoted string opened at byte 0.
///
/// A quote is escaped iff it is preceded by exactly one backslash,
/// judged from the two preceding bytes.
fn find_closing_quote(bytes: &[u8]) -> Option<usize> {
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            let escaped = bytes[i - 1] == b'\\' && (i < 2 || bytes[i - 2] != b'\\');
            if !escaped {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Decode the content of a double-quoted string (without the quotes).
fn decode_quoted(s: &str, ctx: &ParseContext, line: usize, col: usize) -> Result<String> {
    let mut out = String::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            if i + 1 >= chars.len() {
                return Err(
                    ParseError::BadEscapedChar(String::new()).with_location(ctx, line, col + i + 1)
                );
            }
            match chars[i + 1] {
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                '/' => out.push('/'),
                'b' => out.push('\x08'),
                'f' => out.push('\x0C'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'u' => {
                    let (decoded, advance) = decode_unicode_escape(&chars, i, ctx, line, col)?;
                    out.push(decoded);
                    i += advance;
                    continue;
                }
                _ => {
                    return Err(ParseError::BadEscapedChar(String::new()).with_location(
                        ctx,
                        line,
                        col + i + 1,
                    ));
                }
            }
            i += 2;
        } else if (ch as u32) < 0x20 {
            return Err(
                ParseError::BadCharInString(String::new()).with_location(ctx, line, col + i + 1)
            );
        } else {
            out.push(ch);
            i += 1;
        }
    }

    Ok(out)
}

/// Decode a `\uXXXX` escape starting at `chars[i]` (the backslash).
/// Returns the decoded char and how many chars were consumed.
fn decode_unicode_escape(
    chars: &[char],
    i: usize,
    ctx: &ParseContext,
    line: usize,
    col: usize,
) -> Result<(char, usize)> {
    let bad = || ParseError::BadEscapedChar(String::new()).with_location(ctx, line, col + i + 1);

    let unit = read_hex4(chars, i + 2).ok_or_else(bad)?;

    // Surrogate pairs arrive as two consecutive \uXXXX escapes.
    if (0xD800..=0xDBFF).contains(&unit) {
        if chars.get(i + 6) != Some(&'\\') || chars.get(i + 7) != Some(&'u') {
            return Err(bad());
        }
        let low = read_hex4(chars, i + 8).ok_or_else(bad)?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(bad());
        }
        let cp = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
        let c = char::from_u32(cp).ok_or_else(bad)?;
        return Ok((c, 12));
    }
    if (0xDC00..=0xDFFF).contains(&unit) {
        return Err(bad());
    }

    let c = char::from_u32(unit).ok_or_else(bad)?;
    Ok((c, 6))
}

/// Read four hex digits starting at `chars[at]`.
fn read_hex4(chars: &[char], at: usize) -> Option<u32> {
    if at + 4 > chars.len() {
        return None;
    }
    let mut value = 0u32;
    for &c in &chars[at..at + 4] {
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Token> {
        tokenize(input, &ParseContext::new(None)).expect("tokenize failed")
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        toks(input).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_property_line() {
        assert_eq!(
            kinds("version \"1.0.0\"\n"),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::NewLine,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_key_colon_nested() {
        let tokens = toks("dependencies:\n  foo \"^1.0.0\"\n");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::NewLine,
                TokenKind::Indent,
                TokenKind::String,
                TokenKind::String,
                TokenKind::NewLine,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[3].value, Some(Scalar::Int(1)));
    }

    #[test]
    fn test_indent_depth_units_of_two() {
        let tokens = toks("a:\n    b 1\n");
        let indent = tokens.iter().find(|t| t.kind == TokenKind::Indent).unwrap();
        assert_eq!(indent.value, Some(Scalar::Int(2)));
    }

    #[test]
    fn test_odd_indent_rejected() {
        for spaces in [1, 3, 5, 7] {
            let input = format!("foo:\n{}bar 1\n", " ".repeat(spaces));
            let err = tokenize(&input, &ParseContext::new(None)).unwrap_err();
            assert!(
                err.to_string().starts_with("Invalid number of spaces"),
                "width {}: {}",
                spaces,
                err
            );
        }
    }

    #[test]
    fn test_single_leading_space_rejected() {
        assert!(tokenize("foo\n bar: 1\n", &ParseContext::new(None)).is_err());
    }

    #[test]
    fn test_space_as_separator_mid_line() {
        // Spaces after the first token of a line emit no Indent token.
        let tokens = toks("a  b\n");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::NewLine,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_token() {
        let tokens = toks("# yarn lockfile v1\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(
            tokens[0].value,
            Some(Scalar::Str(" yarn lockfile v1".into()))
        );
    }

    #[test]
    fn test_comment_at_eof_without_newline() {
        let tokens = toks("# trailing");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].value, Some(Scalar::Str(" trailing".into())));
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_crlf_line_terminator() {
        let tokens = toks("a 1\r\nb 2\r\n");
        let newlines = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::NewLine)
            .count();
        assert_eq!(newlines, 2);
        assert_eq!(tokens.last().unwrap().line, 2);
    }

    #[test]
    fn test_quoted_string_decoding() {
        let tokens = toks("\"a b\\\"c\" 1\n");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, Some(Scalar::Str("a b\"c".into())));
    }

    #[test]
    fn test_quoted_string_unicode_escape() {
        let tokens = toks("\"\\u0041\" 1\n");
        assert_eq!(tokens[0].value, Some(Scalar::Str("A".into())));
    }

    #[test]
    fn test_unterminated_string_fatal() {
        let err = tokenize("\"abc", &ParseContext::new(None)).unwrap_err();
        assert!(err.to_string().starts_with("Unterminated string"));
    }

    #[test]
    fn test_raw_newline_inside_string_fatal() {
        let err = tokenize("\"a\nb\" 1\n", &ParseContext::new(None)).unwrap_err();
        assert!(err.to_string().starts_with("Bad character in string"));
    }

    #[test]
    fn test_bad_escape_fatal() {
        assert!(tokenize("\"\\q\" 1\n", &ParseContext::new(None)).is_err());
    }

    #[test]
    fn test_number_token() {
        let tokens = toks("uid 1234\n");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].value, Some(Scalar::Int(1234)));
    }

    #[test]
    fn test_true_is_prefix_matched() {
        let tokens = toks("flag true\n");
        assert_eq!(tokens[1].kind, TokenKind::Boolean);
        assert_eq!(tokens[1].value, Some(Scalar::Bool(true)));
    }

    #[test]
    fn test_false_mid_document_is_a_bare_string() {
        // Suffix matching means `false` followed by more input never
        // becomes a Boolean token.
        let tokens = toks("flag false\n");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].value, Some(Scalar::Str("false".into())));
    }

    #[test]
    fn test_false_at_end_of_input_is_boolean() {
        let tokens = toks("flag false");
        assert_eq!(tokens[1].kind, TokenKind::Boolean);
        assert_eq!(tokens[1].value, Some(Scalar::Bool(false)));
    }

    #[test]
    fn test_bare_string_stops_at_delimiters() {
        let tokens = toks("lodash@^4.17.15, lodash@^4.17.20:\n");
        assert_eq!(tokens[0].value, Some(Scalar::Str("lodash@^4.17.15".into())));
        assert_eq!(tokens[1].kind, TokenKind::Comma);
        assert_eq!(tokens[2].value, Some(Scalar::Str("lodash@^4.17.20".into())));
        assert_eq!(tokens[3].kind, TokenKind::Colon);
    }

    #[test]
    fn test_unexpected_character_fatal() {
        let err = tokenize("@foo\n", &ParseContext::new(None)).unwrap_err();
        assert!(err.to_string().starts_with("Unexpected character \"@\""));
    }

    #[test]
    fn test_error_location_reported() {
        let ctx = ParseContext::new(Some("yarn.lock"));
        let err = tokenize("ok 1\n bad\n", &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid number of spaces at 2:1 of <yarn.lock>"
        );
    }

    #[test]
    fn test_newline_token_reports_start_of_next_line() {
        let tokens = toks("a 1\nb 2\n");
        let newline = tokens.iter().find(|t| t.kind == TokenKind::NewLine).unwrap();
        assert_eq!((newline.line, newline.col), (1, 0));
    }

    #[test]
    fn test_eof_token_always_last() {
        let tokens = toks("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
