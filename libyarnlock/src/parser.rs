//! Phase 2: Parser
//!
//! The parser reconstructs a tree of nested mappings from the token
//! stream, using indentation depth as the nesting signal. It handles:
//! - Property lines: `key value` and `key: value`
//! - Multi-key lines: `a, b, c: value` (one shared value)
//! - Nested blocks introduced by a trailing colon
//! - Comments, diverted to a side list as tokens are consumed
//!
//! The magic comment `yarn lockfile v<N>` is version-gated while the
//! comment list is being built; a version newer than
//! [`LOCKFILE_VERSION`](crate::error::LOCKFILE_VERSION) is fatal.

use crate::error::{ParseContext, ParseError, Result, LOCKFILE_VERSION};
use crate::tokenizer::{Token, TokenKind};
use crate::value::{Mapping, Node, Scalar};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shape of the version declaration inside a comment, after trimming.
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^yarn lockfile v(\d+)$").expect("version pattern"));

/// Result of one parse call: the generic document plus the comments
/// encountered while producing it.
#[derive(Debug)]
pub struct ParseOutput {
    pub document: Mapping,
    pub comments: Vec<String>,
}

/// Parse a token stream into a nested mapping.
pub fn parse_root(tokens: &[Token], ctx: &ParseContext) -> Result<ParseOutput> {
    let mut parser = Parser::new(tokens, ctx);
    parser.next()?;
    let document = parser.parse(0)?;
    Ok(ParseOutput {
        document,
        comments: parser.comments,
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    ctx: &'a ParseContext,
    /// Index of the current lookahead token.
    current: usize,
    /// Index of the next token to consume.
    pos: usize,
    comments: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], ctx: &'a ParseContext) -> Self {
        Self {
            tokens,
            ctx,
            current: 0,
            pos: 0,
            comments: Vec::new(),
        }
    }

    fn token(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Advance to the next token, diverting comments to the side list.
    fn next(&mut self) -> Result<()> {
        loop {
            if self.pos >= self.tokens.len() {
                let t = self.token();
                return Err(ParseError::UnexpectedToken(String::new()).with_location(
                    self.ctx,
                    t.line,
                    t.col,
                ));
            }
            let idx = self.pos;
            self.pos += 1;
            if self.tokens[idx].kind == TokenKind::Comment {
                self.on_comment(idx)?;
                continue;
            }
            self.current = idx;
            return Ok(());
        }
    }

    fn on_comment(&mut self, idx: usize) -> Result<()> {
        let t = &self.tokens[idx];
        let body = match &t.value {
            Some(Scalar::Str(s)) => s,
            _ => {
                return Err(ParseError::ExpectedString(String::new()).with_location(
                    self.ctx,
                    t.line,
                    t.col,
                ));
            }
        };
        let comment = body.trim().to_string();

        if let Some(caps) = VERSION_PATTERN.captures(&comment) {
            let found = caps[1].parse::<u32>().unwrap_or(u32::MAX);
            if found > LOCKFILE_VERSION {
                return Err(ParseError::VersionTooNew {
                    found,
                    supported: LOCKFILE_VERSION,
                });
            }
        }

        self.comments.push(comment);
        Ok(())
    }

    fn unexpected(&self, err: ParseError) -> ParseError {
        let t = self.token();
        err.with_location(self.ctx, t.line, t.col)
    }

    /// The current token's string payload, required for property keys.
    fn key_scalar(&self) -> Result<Scalar> {
        match &self.token().value {
            Some(key @ Scalar::Str(_)) => Ok(key.clone()),
            _ => Err(self.unexpected(ParseError::ExpectedKey(String::new()))),
        }
    }

    /// Indent depth carried by the current Indent token.
    fn indent_depth(&self) -> i64 {
        match &self.token().value {
            Some(Scalar::Int(n)) => *n,
            _ => -1,
        }
    }

    /// Parse one nesting level. `indent` is the depth, in units of two
    /// spaces, this level lives at. Returns with the lookahead on the
    /// first token that belongs to an outer level.
    fn parse(&mut self, indent: i64) -> Result<Mapping> {
        let mut obj = Mapping::new();

        loop {
            match self.token().kind {
                TokenKind::NewLine => {
                    self.next()?;
                    if indent == 0 {
                        // At depth zero the token after a line break
                        // never closes the level.
                        continue;
                    }
                    if self.token().kind != TokenKind::Indent {
                        // No indentation after a line break: this level
                        // is done.
                        break;
                    }
                    if self.indent_depth() == indent {
                        self.next()?;
                    } else {
                        break;
                    }
                }
                TokenKind::Indent => {
                    if self.indent_depth() == indent {
                        self.next()?;
                    } else {
                        break;
                    }
                }
                TokenKind::Eof => break,
                TokenKind::String => {
                    // Property key, possibly the first of a
                    // comma-separated list sharing one value.
                    let mut keys = vec![self.key_scalar()?];
                    self.next()?;
                    while self.token().kind == TokenKind::Comma {
                        self.next()?;
                        if self.token().kind != TokenKind::String {
                            return Err(self.unexpected(ParseError::ExpectedString(String::new())));
                        }
                        keys.push(self.key_scalar()?);
                        self.next()?;
                    }

                    let was_colon = self.token().kind == TokenKind::Colon;
                    if was_colon {
                        self.next()?;
                    }

                    if is_valid_prop_value(self.token().kind) {
                        let value = match &self.token().value {
                            Some(v) => v.clone(),
                            None => {
                                return Err(
                                    self.unexpected(ParseError::UnexpectedToken(String::new()))
                                );
                            }
                        };
                        for key in &keys {
                            obj.insert(key.clone(), Node::Scalar(value.clone()));
                        }
                        self.next()?;
                    } else if was_colon {
                        let nested = self.parse(indent + 1)?;
                        for key in &keys {
                            obj.insert(key.clone(), Node::Mapping(nested.clone()));
                        }
                        if indent != 0 && self.token().kind != TokenKind::Indent {
                            break;
                        }
                    } else {
                        return Err(self.unexpected(ParseError::InvalidValue(String::new())));
                    }
                }
                kind => {
                    return Err(self.unexpected(ParseError::UnknownToken(
                        format!("{:?}", kind),
                        String::new(),
                    )));
                }
            }
        }

        Ok(obj)
    }
}

fn is_valid_prop_value(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Boolean | TokenKind::String | TokenKind::Number
    )
}
