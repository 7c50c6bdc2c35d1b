//! Definition collector: harvest named, versioned definition blocks.
//!
//! Runs once all files are assembled. The same routine serves every
//! definition namespace (`define`, `defineStructure`); only the `global` key
//! it looks for differs.
//!
//! Duplicates are reported through the returned diagnostics only; the log
//! gets a debug line.

use crate::error::DocError;
use crate::matcher;
use crate::model::{ParsedBlock, Tree};
use log::debug;
use semver::Version;
use std::collections::BTreeMap;

/// A reusable block, by version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    pub name: String,
    pub versions: BTreeMap<Version, ParsedBlock>,
}

pub type Definitions = BTreeMap<String, Definition>;

/// Definition namespaces, in collection order.
pub const NAMESPACES: &[&str] = &["define", "defineStructure"];

/// Definitions of every namespace, keyed by namespace.
pub type Namespaces = BTreeMap<&'static str, Definitions>;

/// Name a block defines in `namespace`, if it is such a definition.
pub fn defined_name<'a>(block: &'a ParsedBlock, namespace: &str) -> Option<&'a str> {
    block.global.get(namespace)?.get("name")?.as_str().filter(|n| !n.is_empty())
}

/// Collect every definition of `namespace` across all files.
///
/// A block without `@apiVersion` is registered at `default_version`. When
/// the same name and version appear twice, the later block wins and a
/// [`DocError::DuplicateDefinition`] warning is returned.
pub fn collect(all_blocks: &[Vec<ParsedBlock>], namespace: &str, default_version: &Version) -> (Definitions, Vec<DocError>) {
    let mut definitions = Definitions::new();
    let mut warnings = Vec::new();

    for block in all_blocks.iter().flatten() {
        let Some(name) = defined_name(block, namespace) else {
            continue;
        };
        let version = matcher::version_or(block.version.as_deref(), default_version);
        let definition = definitions.entry(name.to_string()).or_insert_with(|| Definition {
            name: name.to_string(),
            ..Default::default()
        });

        if definition.versions.contains_key(&version) {
            debug!(
                "{}:{}: {} '{}' {} defined again, overriding",
                block.source_file, block.index, namespace, name, version
            );
            warnings.push(DocError::DuplicateDefinition {
                namespace: namespace.to_string(),
                name: name.to_string(),
                version: version.to_string(),
                file: block.source_file.clone(),
                block: block.index,
            });
        }
        debug!("{}: collected '{}' at {}", namespace, name, version);
        definition.versions.insert(version, block.clone());
    }
    (definitions, warnings)
}

/// Collect every namespace in [`NAMESPACES`]; warnings come in namespace order.
pub fn collect_all(all_blocks: &[Vec<ParsedBlock>], default_version: &Version) -> (Namespaces, Vec<DocError>) {
    let mut namespaces = Namespaces::new();
    let mut warnings = Vec::new();
    for &namespace in NAMESPACES {
        let (definitions, mut found) = collect(all_blocks, namespace, default_version);
        debug!("collected {} {} definition(s)", definitions.len(), namespace);
        warnings.append(&mut found);
        namespaces.insert(namespace, definitions);
    }
    (namespaces, warnings)
}

/// `global.<namespace>` record (`name`, `title`, `description`) of the
/// definition `name` applicable at `requested`.
pub fn definition_record<'a>(definitions: &'a Definitions, namespace: &str, name: &str, requested: &Version) -> Option<&'a Tree> {
    let definition = definitions.get(name)?;
    let (_, block) = matcher::select(&definition.versions, requested)?;
    block.global.get(namespace)?.as_object()
}
