//! Field tags: `@apiParam`, `@apiQuery`, `@apiBody`, `@apiHeader`,
//! `@apiSuccess`, `@apiError`.
//!
//! Grammar: `[(group)] [{type[{size}][=allowed]}] name|[name[=default]] [description]`.
//! The parsed group becomes the context's current group, which selects the
//! `local.<family>.fields.<group>` list the field is pushed onto. Fields
//! typed `Object` are remembered so dotted children can link to them.

use crate::assembler::AssemblyContext;
use crate::error::TagError;
use crate::model::{to_record, Field, ParentNode, Record};
use crate::registry::{InsertionContract, Method, TagPath, TagPlugin};
use crate::text::unindent;
use regex::Regex;
use std::sync::LazyLock;

static RE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)^",
        // (group)
        r"\s*(?:\(\s*(.+?)\s*\)\s*)?",
        // {type{size}=allowed}
        r"\s*(?:\{\s*([a-zA-Z0-9()#:./\\\[\]_|-]+)",
        r"\s*(?:\{\s*(.+?)\s*\}\s*)?",
        r"\s*(?:=\s*(.+?))?",
        r"\s*\}\s*)?",
        // [name=default]
        r"(\[?\s*",
        r"([#@a-zA-Z0-9\x{00C0}-\x{017F}$:./\\_-]+",
        r"(?:\[[a-zA-Z0-9\x{00C0}-\x{017F}./\\_-]*\])?)",
        r#"(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|(.*?)(?:\s|\]|$)))?"#,
        r"\s*\]?\s*)",
        // description
        r"(.*)?$",
    ))
    .unwrap()
});

static RE_ALLOWED_DOUBLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*[^"]""#).unwrap());
static RE_ALLOWED_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'[^']*[^']'").unwrap());
static RE_ALLOWED_PLAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^,\s]+").unwrap());

const USAGE: &str = "@apiParam [(group)] [{type}] [field=defaultValue] [description]";

pub struct FieldTag {
    family: &'static str,
    default_group: &'static str,
}

impl FieldTag {
    pub fn new(family: &'static str, default_group: &'static str) -> Self {
        Self {
            family,
            default_group,
        }
    }
}

impl TagPlugin for FieldTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract {
            path: TagPath::FieldGroup(self.family),
            method: Method::Push,
            markdown_fields: &["description", "type"],
            inline_markdown_fields: &["type"],
        }
    }

    fn parse(&self, content: &str, ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let caps = RE_FIELD
            .captures(content)
            .ok_or_else(|| TagError::new("Field definition not parseable.", USAGE))?;

        let text = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        let name = text(6).ok_or_else(|| TagError::new("Field name missing.", USAGE))?;

        let group = text(1).unwrap_or_else(|| self.default_group.to_string());
        ctx.current_group = Some(group.clone());

        let type_name = text(2);
        let is_array = type_name.as_deref().is_some_and(|t| t.contains("[]"));
        let parent_node = ctx.parent_of(&name);

        if type_name.as_deref().is_some_and(|t| t.contains("Object")) {
            ctx.parents.insert(
                name.clone(),
                ParentNode {
                    path: name.clone(),
                    field: name.clone(),
                    type_name: type_name.clone().unwrap_or_default(),
                    is_array,
                    parent_node: parent_node.clone().map(Box::new),
                },
            );
        }

        let field = Field {
            group,
            type_name,
            size: text(3),
            allowed_values: text(4).map(|raw| allowed_values(&raw)),
            optional: text(5).is_some_and(|w| w.starts_with('[')),
            parent_node,
            field: name,
            is_array,
            default_value: text(7).or_else(|| text(8)).or_else(|| text(9)).filter(|d| !d.is_empty()),
            description: unindent(text(10).as_deref().unwrap_or("")),
        };
        Ok(Some(to_record(&field)))
    }
}

/// Split `"a","b"`, `'a','b'` or `a,b` into the listed values (quotes kept).
fn allowed_values(raw: &str) -> Vec<String> {
    let re = match raw.chars().next() {
        Some('"') => &*RE_ALLOWED_DOUBLE,
        Some('\'') => &*RE_ALLOWED_SINGLE,
        _ => &*RE_ALLOWED_PLAIN,
    };
    re.find_iter(raw).map(|m| m.as_str().to_string()).collect()
}
