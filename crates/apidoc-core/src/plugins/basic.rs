//! Single-line and flag tags: `@api`, `@apiName`, `@apiVersion`, `@apiUse`, ...

use crate::assembler::AssemblyContext;
use crate::error::TagError;
use crate::model::Record;
use crate::registry::{InsertionContract, TagPlugin};
use crate::text::{underscore_spaces, unindent};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

// {type} url title
static RE_API: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:\{(.+?)\})?\s*)?(.+?)(?:\s+(.+?))?$").unwrap());

fn record(key: &str, value: Value) -> Record {
    let mut record = Record::new();
    record.insert(key.to_string(), value);
    record
}

/// `@api {method} path [title]`
pub struct ApiTag;

impl TagPlugin for ApiTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local")
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let caps = RE_API
            .captures(content)
            .ok_or_else(|| TagError::new("Invalid format.", "@api {method} path [title]"))?;

        let mut out = Record::new();
        if let Some(m) = caps.get(1) {
            out.insert("type".to_string(), Value::from(m.as_str()));
        }
        out.insert("url".to_string(), Value::from(&caps[2]));
        out.insert(
            "title".to_string(),
            Value::from(caps.get(3).map(|m| m.as_str()).unwrap_or("")),
        );
        Ok(Some(out))
    }
}

/// Single-value tag stored under `key` in `local` (`@apiName`, `@apiGroup`).
pub struct Label {
    key: &'static str,
    underscore: bool,
}

impl Label {
    pub fn new(key: &'static str, underscore: bool) -> Self {
        Self { key, underscore }
    }
}

impl TagPlugin for Label {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local")
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let value = content.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let value = if self.underscore {
            underscore_spaces(value)
        } else {
            value.to_string()
        };
        Ok(Some(record(self.key, Value::from(value))))
    }
}

/// `@apiVersion major.minor.patch`
pub struct VersionTag;

impl TagPlugin for VersionTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local")
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        semver::Version::parse(content).map_err(|_| {
            TagError::new("Version format not valid.", "@apiVersion major.minor.patch")
        })?;
        Ok(Some(record("version", Value::from(content))))
    }
}

pub struct DescriptionTag;

impl TagPlugin for DescriptionTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local").with_markdown(&["description"])
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let description = content.trim();
        if description.is_empty() {
            return Ok(None);
        }
        Ok(Some(record("description", Value::from(unindent(description)))))
    }
}

/// `@apiDeprecated [text]` -> `true` or `{content}`.
pub struct DeprecatedTag;

impl TagPlugin for DeprecatedTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local")
            .with_markdown(&["deprecated.content"])
            .with_inline_markdown(&["deprecated.content"])
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let text = content.trim();
        let value = if text.is_empty() {
            Value::Bool(true)
        } else {
            json!({ "content": unindent(text) })
        };
        Ok(Some(record("deprecated", value)))
    }
}

/// Boolean marker stored in `local` (`@apiPrivate`).
pub struct FlagTag {
    key: &'static str,
}

impl FlagTag {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl TagPlugin for FlagTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local")
    }

    fn parse(&self, _content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        Ok(Some(record(self.key, Value::Bool(true))))
    }
}

/// Tag that only influences block selection (`@apiIgnore`).
pub struct Marker;

impl TagPlugin for Marker {
    fn contract(&self) -> InsertionContract {
        InsertionContract::insert("local")
    }

    fn parse(&self, _content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        Ok(None)
    }
}

/// `{name}` pushed onto a list: references and permissions.
pub struct NameList {
    path: &'static str,
}

impl NameList {
    pub fn new(path: &'static str) -> Self {
        Self { path }
    }
}

impl TagPlugin for NameList {
    fn contract(&self) -> InsertionContract {
        InsertionContract::push(self.path)
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let name = content.trim();
        if name.is_empty() {
            return Ok(None);
        }
        Ok(Some(record("name", Value::from(name))))
    }
}

/// `@apiSampleRequest url|off`
pub struct SampleRequestTag;

impl TagPlugin for SampleRequestTag {
    fn contract(&self) -> InsertionContract {
        InsertionContract::push("local.sampleRequest")
    }

    fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
        let url = content.trim();
        if url.is_empty() {
            return Ok(None);
        }
        Ok(Some(record("url", Value::from(url))))
    }
}
