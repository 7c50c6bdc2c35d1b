//! Tag plugin registry and the insertion contract every plugin declares.
//!
//! The registry is built once, before any parsing, and is read-only
//! afterwards. Lookup is case-insensitive (`@APIPARAM` finds `apiParam`).

use crate::assembler::AssemblyContext;
use crate::error::TagError;
use crate::model::Record;
use crate::plugins;
use crate::tree::TreePath;
use std::collections::{HashMap, HashSet};

/// How a parsed record is attached at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Shallow-merge the record's keys into the object at the path.
    Insert,
    /// Append the record to the list at the path.
    Push,
}

/// Where a plugin's record goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPath {
    /// Fixed dotted path (`local.examples`).
    Static(&'static str),
    /// `local.<family>.fields.<current group>`, read from the assembly context.
    FieldGroup(&'static str),
}

impl TagPath {
    pub fn resolve(&self, ctx: &AssemblyContext) -> Option<TreePath> {
        match self {
            TagPath::Static(path) => TreePath::parse(path),
            TagPath::FieldGroup(family) => {
                let group = ctx.current_group.as_deref()?;
                Some(TreePath::local(&[*family, "fields", group]))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionContract {
    pub path: TagPath,
    pub method: Method,
    /// Record fields (dotted) rendered as Markdown after the block is assembled.
    pub markdown_fields: &'static [&'static str],
    /// Subset of `markdown_fields` whose `<p>` wrapper is removed.
    pub inline_markdown_fields: &'static [&'static str],
}

impl InsertionContract {
    pub const fn insert(path: &'static str) -> Self {
        Self {
            path: TagPath::Static(path),
            method: Method::Insert,
            markdown_fields: &[],
            inline_markdown_fields: &[],
        }
    }

    pub const fn push(path: &'static str) -> Self {
        Self {
            path: TagPath::Static(path),
            method: Method::Push,
            markdown_fields: &[],
            inline_markdown_fields: &[],
        }
    }

    pub fn with_markdown(mut self, fields: &'static [&'static str]) -> Self {
        self.markdown_fields = fields;
        self
    }

    pub fn with_inline_markdown(mut self, fields: &'static [&'static str]) -> Self {
        self.inline_markdown_fields = fields;
        self
    }
}

/// A tag parser: raw element content in, record (or nothing) out.
pub trait TagPlugin: Send + Sync {
    fn contract(&self) -> InsertionContract;

    /// `Ok(None)` means the element contributes nothing.
    fn parse(&self, content: &str, ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError>;
}

/// Tag name -> plugin table.
#[derive(Default)]
pub struct Registry {
    plugins: HashMap<String, Box<dyn TagPlugin>>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every built-in `@api*` plugin.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        plugins::register_standard(&mut registry);
        registry
    }

    /// Add or replace the plugin for `tag`.
    pub fn register(&mut self, tag: &str, plugin: impl TagPlugin + 'static) {
        self.plugins.insert(tag.to_lowercase(), Box::new(plugin));
    }

    pub fn get(&self, tag: &str) -> Option<&dyn TagPlugin> {
        self.plugins.get(&tag.to_lowercase()).map(|p| p.as_ref())
    }

    /// Lowercased names of all registered tags, as the lexer expects them.
    pub fn tag_names(&self) -> HashSet<String> {
        self.plugins.keys().cloned().collect()
    }
}
