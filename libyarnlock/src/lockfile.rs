//! Typed lockfile document.
//!
//! The document adapter maps the generic nested mapping produced by the
//! parser onto the fixed record schema of the format: one [`Entry`] per
//! `name@range` composite key. The bridge goes through
//! `serde_json::Value` so the record schema is declared once, as serde
//! attributes, for both the adapter and JSON output.

use crate::error::Result;
use crate::value::{Mapping, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One package record, keyed in the [`Lockfile`] by `name@range`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resolved: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub integrity: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub registry: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub dependencies: HashMap<String, String>,
    #[serde(
        rename = "optionalDependencies",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub optional_dependencies: HashMap<String, String>,
}

/// A parsed lockfile: `name@range` keys mapped to package records.
///
/// Content-equal entries under different keys stay separate here; the
/// encoder groups them back onto one multi-key line at output time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lockfile {
    pub entries: HashMap<String, Entry>,
}

impl Lockfile {
    /// Build the typed document from the parser's generic mapping.
    pub fn from_document(document: &Mapping) -> Result<Self> {
        let value = node_to_json(&Node::Mapping(document.clone()));
        let lockfile = serde_json::from_value(value)?;
        Ok(lockfile)
    }

    /// Keys never referenced as `name@range` by any entry's
    /// dependencies. The result is sorted.
    pub fn root_entries(&self) -> Vec<String> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        for entry in self.entries.values() {
            for (name, range) in &entry.dependencies {
                let referenced = format!("{}@{}", name, range);
                keys.retain(|k| **k != referenced);
            }
        }
        let mut roots: Vec<String> = keys.into_iter().cloned().collect();
        roots.sort();
        roots
    }
}

/// Convert a generic document node to a JSON value. Scalars, keys and
/// values alike, are rendered as their plain text form, the way the
/// format writes them; the string fields of the record schema accept a
/// bare number or boolean the same as its quoted spelling.
fn node_to_json(node: &Node) -> serde_json::Value {
    match node {
        Node::Scalar(s) => serde_json::Value::from(s.to_text()),
        Node::Mapping(m) => {
            let mut obj = serde_json::Map::new();
            for (key, value) in m {
                obj.insert(key.to_text(), node_to_json(value));
            }
            serde_json::Value::Object(obj)
        }
    }
}
