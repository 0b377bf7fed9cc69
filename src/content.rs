//! Content references and their resolution against the fragment store.
//!
//! A page's `data` values (and the values of `globalData`) may point at a
//! rendered fragment through the reserved `content` key:
//!
//! ```json
//! "intro":   { "content": "docs/intro.md" }
//! "sidebar": { "content": "sidebar.md", "hoist": true }
//! "cards":   [ { "content": "a.md" }, { "content": "b.md" }, "plain" ]
//! ```
//!
//! Values are classified once, when the structure file is deserialized, into a
//! [`ContentBlock`]. Resolution then builds a new JSON value:
//!
//! - without `hoist`, `content` is replaced by the fragment record
//!   (`{"content": {"contents": "<p>..</p>", ...}}`);
//! - with a truthy `hoist`, the fragment's fields are merged into the block
//!   itself and `content` is removed (`{"hoist": true, "contents": "<p>..</p>"}`).
//!
//! Arrays are resolved element by element (recursively); objects are only
//! inspected at their top level. A truthy `content` that is not a string is
//! not a usable path and fails resolution.

use crate::fragments::FragmentStore;
use crate::types::DataBlocks;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Reserved key holding a content path.
pub const CONTENT_KEY: &str = "content";

/// Flag asking for the fragment to be merged into the block.
pub const HOIST_KEY: &str = "hoist";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Content not found: {0}")]
    ContentNotFound(String),
    #[error("Invalid content path: {0}")]
    InvalidContentPath(Value),
}

/// A data value, classified by whether it references rendered content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ContentBlock {
    /// Anything that is not a reference, returned as-is.
    Plain(Value),
    /// An object whose `content` is a non-empty path string.
    Reference(ContentReference),
    /// An object whose `content` is truthy but not a string.
    Malformed(Map<String, Value>),
    /// An array; each element is classified on its own.
    List(Vec<ContentBlock>),
}

/// An object carrying a content path, with all of its original fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentReference {
    path: String,
    fields: Map<String, Value>,
}

impl ContentReference {
    pub fn hoist(&self) -> bool {
        self.fields.get(HOIST_KEY).is_some_and(is_truthy)
    }

    /// Look the fragment up and splice it into a copy of this block.
    pub fn resolve(&self, fragments: &FragmentStore) -> Result<Value, ResolveError> {
        let fragment = fragments
            .lookup(&self.path)
            .ok_or_else(|| ResolveError::ContentNotFound(self.path.clone()))?;

        let mut block = self.fields.clone();
        if self.hoist() {
            tracing::debug!(content = %self.path, "Hoisting content");
            block.extend(fragment.resolved_fields());
            block.remove(CONTENT_KEY);
        } else {
            block.insert(
                CONTENT_KEY.to_string(),
                Value::Object(fragment.resolved_fields()),
            );
        }
        Ok(Value::Object(block))
    }
}

impl From<Value> for ContentBlock {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                ContentBlock::List(items.into_iter().map(ContentBlock::from).collect())
            }
            Value::Object(fields) => {
                let path = match fields.get(CONTENT_KEY) {
                    Some(Value::String(path)) if !path.is_empty() => Some(path.clone()),
                    _ => None,
                };
                let malformed = fields
                    .get(CONTENT_KEY)
                    .is_some_and(|content| !content.is_string() && is_truthy(content));
                match path {
                    Some(path) => ContentBlock::Reference(ContentReference { path, fields }),
                    None if malformed => ContentBlock::Malformed(fields),
                    None => ContentBlock::Plain(Value::Object(fields)),
                }
            }
            other => ContentBlock::Plain(other),
        }
    }
}

impl ContentBlock {
    /// Resolve every reference in this block.
    pub fn resolve(&self, fragments: &FragmentStore) -> Result<Value, ResolveError> {
        match self {
            ContentBlock::Plain(value) => Ok(value.clone()),
            ContentBlock::Reference(reference) => reference.resolve(fragments),
            ContentBlock::Malformed(fields) => Err(ResolveError::InvalidContentPath(
                fields.get(CONTENT_KEY).cloned().unwrap_or_default(),
            )),
            ContentBlock::List(items) => items
                .iter()
                .map(|item| item.resolve(fragments))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    /// The block as it was written, references left unresolved.
    pub fn to_value(&self) -> Value {
        match self {
            ContentBlock::Plain(value) => value.clone(),
            ContentBlock::Reference(reference) => Value::Object(reference.fields.clone()),
            ContentBlock::Malformed(fields) => Value::Object(fields.clone()),
            ContentBlock::List(items) => {
                Value::Array(items.iter().map(ContentBlock::to_value).collect())
            }
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ContentBlock::Reference(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContentBlock::Plain(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Resolve the references among the values of `globalData`.
///
/// Only values that are themselves references are resolved; arrays and plain
/// values pass through untouched. A malformed reference fails like a missing one.
pub fn resolve_global_data(
    global_data: Option<&DataBlocks>,
    fragments: &FragmentStore,
) -> Result<Map<String, Value>, ResolveError> {
    let mut resolved = Map::new();
    let Some(global_data) = global_data else {
        return Ok(resolved);
    };
    for (key, block) in global_data.iter() {
        let value = match block {
            ContentBlock::Reference(_) | ContentBlock::Malformed(_) => block.resolve(fragments)?,
            other => other.to_value(),
        };
        resolved.insert(key.to_string(), value);
    }
    Ok(resolved)
}

/// JavaScript-style truthiness over JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
