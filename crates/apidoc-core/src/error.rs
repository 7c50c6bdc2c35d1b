//! Diagnostics produced while assembling and resolving documentation blocks.
//!
//! Nothing in the pipeline fails fast: every problem becomes a [`DocError`],
//! is attached to the block it concerns and collected into the pass
//! [`Report`](crate::pipeline::Report).

use serde::Serialize;
use thiserror::Error;

/// How bad a diagnostic is for the documentation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found during one parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocError {
    /// `@apiUse`/`@apiStructure` names a definition that does not exist at
    /// any version <= the requested one.
    #[error("{file} (block {block}): referenced definition '{name}' is not defined for version {version}")]
    UndefinedReference {
        name: String,
        version: String,
        file: String,
        block: usize,
    },

    /// Reference expansion revisited a definition or exceeded the depth limit.
    #[error("{file} (block {block}): reference '{name}' is cyclic or nested too deep ({})", .chain.join(" -> "))]
    CycleOrTooDeep {
        name: String,
        chain: Vec<String>,
        file: String,
        block: usize,
    },

    /// The same name and version were defined twice; the later one wins.
    #[error("{file} (block {block}): '{name}' version {version} is already defined in namespace '{namespace}', overriding")]
    DuplicateDefinition {
        namespace: String,
        name: String,
        version: String,
        file: String,
        block: usize,
    },

    /// A tag parser rejected its content; the element was dropped.
    #[error("{file} (block {block}): @{tag}: {reason}")]
    TagParseFailure {
        tag: String,
        reason: String,
        file: String,
        block: usize,
    },

    /// A `:param` segment of the endpoint URL has no `@apiParam`.
    #[error("{file} (block {block}): URL parameter ':{param}' of @api '{title}' is not documented as @apiParam")]
    UndocumentedUrlParam {
        param: String,
        title: String,
        file: String,
        block: usize,
    },

    /// A mandatory `@apiParam` of the endpoint does not appear in its URL.
    #[error("{file} (block {block}): @apiParam '{field}' of @api '{title}' does not appear in the URL")]
    ParamNotInUrl {
        field: String,
        title: String,
        file: String,
        block: usize,
    },
}

impl DocError {
    pub fn severity(&self) -> Severity {
        match self {
            DocError::UndefinedReference { .. } | DocError::CycleOrTooDeep { .. } => Severity::Error,
            DocError::DuplicateDefinition { .. }
            | DocError::TagParseFailure { .. }
            | DocError::UndocumentedUrlParam { .. }
            | DocError::ParamNotInUrl { .. } => Severity::Warning,
        }
    }
}

/// Error returned by a tag plugin for malformed content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (usage: {usage})")]
pub struct TagError {
    pub message: String,
    pub usage: &'static str,
}

impl TagError {
    pub fn new(message: impl Into<String>, usage: &'static str) -> Self {
        Self {
            message: message.into(),
            usage,
        }
    }
}
