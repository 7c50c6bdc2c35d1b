//! `@apiExample [{type}] title` followed by the example body.

use crate::assembler::AssemblyContext;
use crate::error::TagError;
use crate::model::{to_record, Example, Record};
use crate::registry::{InsertionContract, TagPlugin};
use crate::text::unindent;
use regex::Regex;
use std::sync::LazyLock;

static RE_EXAMPLE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\s*\{\s*([a-zA-Z0-9./\\\[\]_-]+)\s*\}\s*)?\s*(.*)$").unwrap()
});

pub struct ExampleTag {
    path: &'static str,
}

impl ExampleTag {
    pub fn new(path: &'static str) -> Self {
        Self { path }
    }
}

impl TagPlugin for ExampleTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::push(self.path)
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let (head, body) = content.split_once('\n').unwrap_or((content, ""));
        if body.trim().is_empty() {
            return Ok(None);
        }

        let (type_name, title) = match RE_EXAMPLE_HEAD.captures(head.trim()) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            ),
            None => (None, String::new()),
        };

        let example = Example {
            title,
            content: unindent(body),
            type_name: type_name.unwrap_or_else(|| "json".to_string()),
        };
        Ok(Some(to_record(&example)))
    }
}
