//! `@apiDefine name [title]` and `@apiDefineStructure`: the block becomes a
//! reusable definition. Lines after the first form its description.

use crate::assembler::AssemblyContext;
use crate::error::TagError;
use crate::model::Record;
use crate::registry::{InsertionContract, TagPlugin};
use crate::text::unindent;
use serde_json::Value;

pub struct DefineTag {
    path: &'static str,
    usage: &'static str,
}

impl DefineTag {
    pub fn new(path: &'static str, usage: &'static str) -> Self {
        Self { path, usage }
    }
}

impl TagPlugin for DefineTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert(self.path).with_markdown(&["description"])
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let content = content.trim();
        let mut lines = content.lines();
        let first = match lines.next() {
            Some(line) if !line.is_empty() => line,
            _ => return Err(TagError::new("No arguments found.", self.usage)),
        };

        let name_len = first
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
            .unwrap_or(first.len());
        let (name, rest) = first.split_at(name_len);
        if name.is_empty() || (!rest.is_empty() && !rest.starts_with(char::is_whitespace)) {
            return Err(TagError::new(
                "Name must contain only alphanumeric and colon characters.",
                self.usage,
            ));
        }

        let description: String = lines.map(|line| format!("{}\n", line)).collect();

        let mut record = Record::new();
        record.insert("name".to_string(), Value::from(name));
        record.insert("title".to_string(), Value::from(rest.trim()));
        record.insert("description".to_string(), Value::from(unindent(description.trim_end())));
        Ok(Some(record))
    }
}
