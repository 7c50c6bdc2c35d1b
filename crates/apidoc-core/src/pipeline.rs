//! One full parse pass: sources in, resolved endpoint blocks out.
//!
//! Phase one lexes and assembles every file independently. Only after all
//! files are assembled are definitions collected, because any file may
//! reference a definition declared in any other. Phase two resolves
//! references, checks URL parameters, runs the workers and de-duplicates
//! fields.

use crate::assembler::Assembler;
use crate::checks::{check_url_params, param_fields};
use crate::collector::{self, Definitions};
use crate::comments::{find_blocks, Language};
use crate::dedupe::dedupe;
use crate::error::{DocError, Severity};
use crate::lexer::lex;
use crate::markdown::CommonMark;
use crate::model::{Element, ParsedBlock};
use crate::plugins::FIELD_FAMILIES;
use crate::project::ProjectInfo;
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::workers::{self, WorkerContext};
use log::{debug, info};
use semver::Version;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// A source file already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn language(&self) -> Language {
        Language::from_path(Path::new(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Version of blocks without `@apiVersion`.
    pub default_version: Version,
    /// Keep blocks marked `@apiPrivate`.
    pub include_private: bool,
    /// Render Markdown-flagged fields to HTML.
    pub markdown: bool,
    /// `tag=value`: keep only blocks with a matching element.
    pub filter_by: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_version: Version::new(0, 0, 0),
            include_private: false,
            markdown: true,
            filter_by: None,
        }
    }
}

/// Every diagnostic of a pass, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub diagnostics: Vec<DocError>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DocError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DocError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutput {
    pub project: ProjectInfo,
    /// Resolved endpoint blocks, in source order.
    pub blocks: Vec<ParsedBlock>,
    pub report: Report,
}

/// Parse every source, resolve all references and return the endpoints.
pub fn parse_sources(sources: &[SourceFile], registry: &Registry, options: &ParseOptions, project: &ProjectInfo) -> ParseOutput {
    let mut report = Report::default();
    let known = registry.tag_names();
    let markdown = CommonMark;
    let mut assembler = Assembler::new(registry);
    if options.markdown {
        assembler = assembler.with_markdown(&markdown);
    }

    let mut files: Vec<Vec<ParsedBlock>> = Vec::with_capacity(sources.len());
    for source in sources {
        files.push(assemble_file(source, &known, &assembler, options, &mut report));
    }

    let (namespaces, warnings) = collector::collect_all(&files, &options.default_version);
    report.diagnostics.extend(warnings);

    let empty = Definitions::new();
    let resolver = Resolver::new(&namespaces, &options.default_version);
    let families: Vec<&str> = FIELD_FAMILIES.iter().map(|(_, family, _)| *family).collect();
    let worker_ctx = WorkerContext {
        defines: namespaces.get("define").unwrap_or(&empty),
        default_version: &options.default_version,
        project,
    };

    let mut blocks = Vec::new();
    for mut block in files.into_iter().flatten() {
        if !block.is_endpoint() {
            continue;
        }
        let own_params = param_fields(&block.local);
        report.diagnostics.extend(resolver.resolve(&mut block));
        report.diagnostics.extend(check_url_params(&block, &own_params));
        workers::run_all(&mut block, &worker_ctx, &families);
        for family in &families {
            dedupe(&mut block, family);
        }
        blocks.push(block);
    }

    info!(
        "parsed {} file(s): {} endpoint(s), {} diagnostic(s)",
        sources.len(),
        blocks.len(),
        report.diagnostics.len()
    );
    ParseOutput {
        project: project.clone(),
        blocks,
        report,
    }
}

/// Lex, select and assemble the documentation blocks of one file.
fn assemble_file(
    source: &SourceFile,
    known: &HashSet<String>,
    assembler: &Assembler,
    options: &ParseOptions,
    report: &mut Report,
) -> Vec<ParsedBlock> {
    let mut blocks = Vec::new();
    for (i, raw) in find_blocks(&source.content, source.language()).iter().enumerate() {
        let index = i + 1;
        let elements = lex(raw, known);
        if elements.is_empty() || !is_selected(&elements, options) {
            continue;
        }
        let assembly = assembler.assemble(&elements, &source.name, index);
        report.diagnostics.extend(assembly.failures);
        let block = assembly.block;
        if block.global.is_empty() && block.local.is_empty() {
            debug!("{}:{}: nothing documented", source.name, index);
            continue;
        }
        blocks.push(block);
    }
    debug!("{}: {} block(s)", source.name, blocks.len());
    blocks
}

fn has_tag(elements: &[Element], name: &str) -> bool {
    elements.iter().any(|e| e.name == name)
}

/// Block selection: `@apiIgnore`, `@apiPrivate` and the `tag=value` filter.
fn is_selected(elements: &[Element], options: &ParseOptions) -> bool {
    if has_tag(elements, "apiignore") {
        return false;
    }
    if !options.include_private && has_tag(elements, "apiprivate") {
        return false;
    }
    let Some((tag, value)) = options.filter_by.as_deref().and_then(|f| f.split_once('=')) else {
        return true;
    };
    if has_tag(elements, "apidefine") || has_tag(elements, "apidefinestructure") {
        return true;
    }
    let tag = tag.trim().trim_start_matches('@').to_lowercase();
    elements
        .iter()
        .any(|e| e.name == tag && e.content.trim() == value.trim())
}
