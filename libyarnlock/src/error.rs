//! Error types for lockfile parsing.

use thiserror::Error;

/// Result type for lockfile parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Highest lockfile format version this implementation understands.
pub const LOCKFILE_VERSION: u32 = 1;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at {}:{}", line + 1, col + 1),
        }
    }
}

/// Error type for lockfile parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Odd number of leading spaces after a line break.
    #[error("Invalid number of spaces{0}")]
    InvalidIndent(String),

    /// Quoted string with no closing quote.
    #[error("Unterminated string{0}")]
    UnterminatedString(String),

    /// Bad escape sequence in a quoted string.
    #[error("Bad escaped character{0}")]
    BadEscapedChar(String),

    /// Raw control character inside a quoted string.
    #[error("Bad character in string{0}")]
    BadCharInString(String),

    /// Character matching no tokenizer rule.
    #[error("Unexpected character \"{0}\"{1}")]
    UnexpectedChar(char, String),

    /// Token out of place with no more specific message.
    #[error("Unexpected token{0}")]
    UnexpectedToken(String),

    /// Token kind the parser has no rule for at this position.
    #[error("Unknown token {0}{1}")]
    UnknownToken(String, String),

    /// Non-string token after a comma in a key list.
    #[error("Expected string{0}")]
    ExpectedString(String),

    /// Property key token carried no value.
    #[error("Expected a key{0}")]
    ExpectedKey(String),

    /// Neither a literal scalar nor a colon-introduced nested block.
    #[error("Invalid value type{0}")]
    InvalidValue(String),

    /// The lockfile declares a format version newer than we support.
    #[error(
        "Can't install from a lockfile of version {found} as you're on an old yarn version \
         that only supports versions up to {supported}. Run `$ yarn self-update` to upgrade \
         to the latest version."
    )]
    VersionTooNew { found: u32, supported: u32 },

    /// Failure mapping the generic document onto the typed schema.
    #[error("parse failed: {0}")]
    Adapt(#[from] serde_json::Error),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::InvalidIndent(_) => ParseError::InvalidIndent(suffix),
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::BadEscapedChar(_) => ParseError::BadEscapedChar(suffix),
            ParseError::BadCharInString(_) => ParseError::BadCharInString(suffix),
            ParseError::UnexpectedChar(c, _) => ParseError::UnexpectedChar(c, suffix),
            ParseError::UnexpectedToken(_) => ParseError::UnexpectedToken(suffix),
            ParseError::UnknownToken(kind, _) => ParseError::UnknownToken(kind, suffix),
            ParseError::ExpectedString(_) => ParseError::ExpectedString(suffix),
            ParseError::ExpectedKey(_) => ParseError::ExpectedKey(suffix),
            ParseError::InvalidValue(_) => ParseError::InvalidValue(suffix),
            ParseError::VersionTooNew { found, supported } => {
                ParseError::VersionTooNew { found, supported }
            }
            ParseError::Adapt(e) => ParseError::Adapt(e),
        }
    }
}
