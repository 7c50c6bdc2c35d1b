//! Data model for parsed documentation, independent of any output format.

use crate::error::DocError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrarily nested documentation tree (`global` or `local` region).
pub type Tree = Map<String, Value>;

/// What a tag parser hands back: a flat-ish record merged into a [`Tree`].
pub type Record = Map<String, Value>;

/// One lexical unit of a comment block: `@tag` plus everything up to the
/// next recognized tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written (`apiParamExample`).
    pub tag: String,
    /// Lowercased tag name used for registry lookup.
    pub name: String,
    /// Raw text following the tag, continuation lines verbatim.
    pub content: String,
}

impl Element {
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            name: tag.to_lowercase(),
            tag,
            content: content.into(),
        }
    }

    /// Reconstruct the comment text this element was lexed from.
    pub fn source(&self) -> String {
        if self.content.is_empty() {
            format!("@{}", self.tag)
        } else if self.content.starts_with('\n') {
            format!("@{}{}", self.tag, self.content)
        } else {
            format!("@{} {}", self.tag, self.content)
        }
    }
}

/// Result of assembling one comment block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBlock {
    /// Attributes that describe a definition (`define`, `defineStructure`).
    pub global: Tree,
    /// Attributes of the documented element itself.
    pub local: Tree,
    /// Explicit `@apiVersion`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub source_file: String,
    /// 1-based position of the comment block within its file.
    pub index: usize,
    /// Diagnostics attached while resolving this block.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DocError>,
}

impl ParsedBlock {
    pub fn new(source_file: impl Into<String>, index: usize) -> Self {
        Self {
            source_file: source_file.into(),
            index,
            ..Default::default()
        }
    }

    /// A block that only documents an endpoint (nothing in `global`).
    pub fn is_endpoint(&self) -> bool {
        self.global.is_empty() && !self.local.is_empty()
    }
}

/// Ancestor of a dotted field (`user.name` -> `user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentNode {
    pub path: String,
    pub field: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<Box<ParentNode>>,
}

/// A documented parameter, header, body, success or error field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub group: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<ParentNode>,
    /// Unique key within one field list after de-duplication.
    pub field: String,
    pub is_array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub description: String,
}

/// `@apiExample` and its per-family variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Serialize a typed record into the map form stored in a [`Tree`].
pub fn to_record<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}
