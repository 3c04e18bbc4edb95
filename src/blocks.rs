//! Content block model and normalization.
//!
//! Step payloads carry a `content_blocks` array that historical saves nested
//! arbitrarily: blocks inside blocks, arrays inside arrays, wrapper objects
//! whose only purpose is to hold more blocks. Everything is flattened into one
//! flat list on read, with a hard depth cap so corrupt data terminates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How deep nested `content_blocks` wrappers are followed before giving up.
pub const MAX_FLATTEN_DEPTH: usize = 8;

/// Key under which legacy saves nested child blocks.
const NESTED_KEY: &str = "content_blocks";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
/// One content block, tagged by kind.
pub enum ContentBlock {
    /// Plain-text body.
    Text {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// Body content.
        content: String,
    },
    /// Raw HTML body.
    Html {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// Body content.
        content: String,
    },
    /// Rows of string cells.
    Table {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// Table rows of string cells.
        rows: Vec<Vec<String>>,
    },
    /// Bulleted items.
    List {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// List items.
        items: Vec<String>,
    },
    /// Downloadable file list.
    Documents {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// Attached documents.
        documents: Vec<FileRef>,
    },
    /// Image gallery.
    Photos {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// Gallery images.
        images: Vec<FileRef>,
    },
    /// Staff list.
    Persons {
        #[serde(default)]
        /// Block title.
        title: String,
        #[serde(default)]
        /// People entries.
        persons: Vec<Person>,
    },
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
/// An uploaded file attached to a block.
pub struct FileRef {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Download URL.
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
/// Staff entry in a persons block.
pub struct Person {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub position: String,
    /// Portrait URL, if uploaded.
    #[serde(default)]
    pub photo: Option<String>,
}

/// A block after flattening. Kinds the block editor does not know about are
/// kept opaquely so a re-save does not destroy them.
#[derive(Clone, Debug, PartialEq)]
pub enum RawBlock {
    /// A block the editor can fully represent.
    Known(ContentBlock),
    /// Anything else, carried through untouched.
    Unknown(Value),
}

impl RawBlock {
    #[must_use]
    /// Display title regardless of kind.
    pub fn title(&self) -> String {
        match self {
            RawBlock::Known(
                ContentBlock::Text { title, .. }
                | ContentBlock::Html { title, .. }
                | ContentBlock::Table { title, .. }
                | ContentBlock::List { title, .. }
                | ContentBlock::Documents { title, .. }
                | ContentBlock::Photos { title, .. }
                | ContentBlock::Persons { title, .. },
            ) => title.clone(),
            RawBlock::Unknown(value) => value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    #[must_use]
    /// Short kind label for list rendering.
    pub fn kind(&self) -> &str {
        match self {
            RawBlock::Known(ContentBlock::Text { .. }) => "text",
            RawBlock::Known(ContentBlock::Html { .. }) => "html",
            RawBlock::Known(ContentBlock::Table { .. }) => "table",
            RawBlock::Known(ContentBlock::List { .. }) => "list",
            RawBlock::Known(ContentBlock::Documents { .. }) => "documents",
            RawBlock::Known(ContentBlock::Photos { .. }) => "photos",
            RawBlock::Known(ContentBlock::Persons { .. }) => "persons",
            RawBlock::Unknown(_) => "unknown",
        }
    }
}

/// Flatten a raw `content_blocks` array.
///
/// - an object carrying a `content_blocks` array contributes only its
///   children (the wrapper itself is dropped);
/// - a plain object has the nesting key stripped and is parsed by tag,
///   falling back to [`RawBlock::Unknown`];
/// - a nested array splices in place;
/// - anything else is dropped;
/// - recursion stops at [`MAX_FLATTEN_DEPTH`].
#[must_use]
pub fn flatten_blocks(raw: &[Value]) -> Vec<RawBlock> {
    let mut out = Vec::new();
    flatten_into(raw, 0, &mut out);
    out
}

fn flatten_into(raw: &[Value], depth: usize, out: &mut Vec<RawBlock>) {
    if depth >= MAX_FLATTEN_DEPTH {
        return;
    }
    for value in raw {
        match value {
            Value::Object(map) => {
                if let Some(Value::Array(nested)) = map.get(NESTED_KEY) {
                    flatten_into(nested, depth + 1, out);
                } else {
                    out.push(parse_block(map));
                }
            }
            Value::Array(nested) => flatten_into(nested, depth + 1, out),
            _ => {}
        }
    }
}

fn parse_block(map: &Map<String, Value>) -> RawBlock {
    let mut cleaned = map.clone();
    cleaned.remove(NESTED_KEY);
    let value = Value::Object(cleaned);
    match serde_json::from_value::<ContentBlock>(value.clone()) {
        Ok(block) => RawBlock::Known(block),
        Err(_) => RawBlock::Unknown(value),
    }
}

#[cfg(test)]
#[path = "tests/blocks.rs"]
mod tests;
