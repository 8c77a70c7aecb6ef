//! Generic document representation.
//!
//! The parser produces a tree of nested mappings keyed by scalars. The
//! typed [`Lockfile`](crate::Lockfile) view is derived from this tree by
//! the document adapter; the tree itself knows nothing about packages.

use std::collections::HashMap;
use std::fmt;

/// A scalar produced by the tokenizer or stored at a document leaf.
///
/// Exactly one variant is active; absence is expressed as
/// `Option<Scalar>` at the use site.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Integer payload (indent depths, number tokens).
    Int(i64),
    /// Decoded text (bare and quoted strings, comment bodies).
    Str(String),
    /// Boolean literal.
    Bool(bool),
}

impl Scalar {
    /// Returns the text if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the scalar as plain text, the way the original format
    /// writes map keys.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Str(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Str(s) => write!(f, "{:?}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// One level of the parsed document.
///
/// Duplicate keys at a level overwrite earlier values; only the final
/// value survives. Iteration order is unspecified, the encoder sorts.
pub type Mapping = HashMap<Scalar, Node>;

/// A parsed document node: a scalar leaf or a nested mapping.
#[derive(Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Mapping),
}

impl Node {
    /// Returns the scalar if this is a leaf.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping if this is a nested level.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Scalar(s) => write!(f, "{:?}", s),
            Node::Mapping(m) => f.debug_map().entries(m).finish(),
        }
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Node::Scalar(s)
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Node::Mapping(m)
    }
}
