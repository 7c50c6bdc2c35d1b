//! apidoc-core: turn `@api...` comment blocks into resolved documentation trees.
//!
//! Shared by the `apidoc` CLI and anything else that wants the parsed tree.
//! The entry point is [`parse_sources`]: it extracts comment blocks, lexes
//! them into tag elements, assembles each block through the tag [`Registry`],
//! then resolves `@apiUse`/`@apiStructure` references against the versioned
//! `@apiDefine`/`@apiDefineStructure` definitions of every input file.

pub mod assembler;
pub mod checks;
pub mod collector;
pub mod comments;
pub mod dedupe;
pub mod error;
pub mod lexer;
pub mod markdown;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod plugins;
pub mod project;
pub mod registry;
pub mod resolver;
pub mod text;
pub mod tree;
pub mod workers;

pub use error::{DocError, Severity};
pub use model::{Element, ParsedBlock, Tree};
pub use pipeline::{parse_sources, ParseOptions, ParseOutput, Report, SourceFile};
pub use project::ProjectInfo;
pub use registry::{Registry, TagPlugin};
