//! Parser and encoder for the yarn v1 lockfile format.
//!
//! The format is a semi-structured, indentation-sensitive text format:
//! nesting is expressed by two-space indentation rather than explicit
//! delimiters, several comma-separated keys may share one value, and
//! scalars are quoted only when their characters would not survive
//! retokenization. Parsing and encoding agree closely enough that
//! `encode(parse(text))` reproduces well-formed input byte for byte.
//!
//! # Pipeline
//!
//! The parser operates in three phases:
//!
//! 1. **Tokenizer**: Converts source text into a flat token stream with
//!    line/column positions and indentation depths.
//!
//! 2. **Parser**: Recursive descent over the token stream, rebuilding
//!    nested mappings keyed on indentation depth.
//!
//! 3. **Document adapter**: Maps the generic mapping onto the typed
//!    [`Lockfile`] record schema.
//!
//! Encoding walks a [`Lockfile`] directly, grouping content-equal
//! entries onto shared multi-key lines and sorting the output.

mod encode;
mod error;
mod format;
mod lockfile;
mod parser;
mod tokenizer;
mod value;

pub use error::{ParseContext, ParseError, Result, LOCKFILE_VERSION};
pub use format::wrap_scalar;
pub use lockfile::{Entry, Lockfile};
pub use value::{Mapping, Node, Scalar};

/// Parse a lockfile document from a string.
///
/// # Example
///
/// ```
/// use libyarnlock::parse;
///
/// let lockfile = parse("foo@^1.0.0:\n  version \"1.0.1\"\n").unwrap();
/// assert_eq!(lockfile.entries["foo@^1.0.0"].version, "1.0.1");
/// ```
pub fn parse(input: &str) -> Result<Lockfile> {
    parse_with_filename(input, None)
}

/// Parse a lockfile document with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Lockfile> {
    let ctx = error::ParseContext::new(filename);

    // Phase 1: Tokenize source text
    let tokens = tokenizer::tokenize(input, &ctx)?;

    // Phase 2: Parse tokens into the generic document
    let output = parser::parse_root(&tokens, &ctx)?;

    // Phase 3: Adapt onto the typed record schema
    Lockfile::from_document(&output.document)
}
