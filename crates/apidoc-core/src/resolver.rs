//! Reference resolver: expand `@apiUse`/`@apiStructure` references.
//!
//! Every reference is matched against the collected definitions of its
//! namespace at the consumer's version, expanded recursively and merged into
//! the consumer's `local` tree after the content the consumer declared
//! itself. A definition may hold references of any kind (a structure may
//! `@apiUse` a define), so expansion walks all kinds and tracks one chain of
//! definitions across them. Mutual cycles are caught as well as runaway
//! nesting.

use crate::collector::Namespaces;
use crate::error::DocError;
use crate::matcher::{self, version_or};
use crate::model::{ParsedBlock, Tree};
use crate::tree::merge_tree;
use log::debug;
use semver::Version;
use serde_json::Value;

/// Deepest allowed nesting of references inside definitions.
pub const MAX_DEPTH: usize = 10;

/// A reference list in `local` and the definition namespace it resolves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceKind {
    pub list_key: &'static str,
    pub namespace: &'static str,
}

/// All reference kinds, in resolution order (`use` first).
pub const REFERENCE_KINDS: &[ReferenceKind] = &[
    ReferenceKind { list_key: "use", namespace: "define" },
    ReferenceKind { list_key: "structure", namespace: "defineStructure" },
    ReferenceKind { list_key: "headerStructure", namespace: "defineStructure" },
    ReferenceKind { list_key: "successStructure", namespace: "defineStructure" },
    ReferenceKind { list_key: "errorStructure", namespace: "defineStructure" },
];

/// Keys never copied from a definition into its consumer.
const NOT_INHERITED: &[&str] = &["version"];

enum Failure {
    Undefined { name: String, version: Version },
    CycleOrTooDeep { name: String, chain: Vec<String> },
}

impl Failure {
    fn into_error(self, block: &ParsedBlock) -> DocError {
        match self {
            Failure::Undefined { name, version } => DocError::UndefinedReference {
                name,
                version: version.to_string(),
                file: block.source_file.clone(),
                block: block.index,
            },
            Failure::CycleOrTooDeep { name, chain } => DocError::CycleOrTooDeep {
                name,
                chain,
                file: block.source_file.clone(),
                block: block.index,
            },
        }
    }
}

/// One definition being expanded: namespace, name, selected version.
type Link = (&'static str, String, Version);

fn chain_labels(chain: &[Link], last: String) -> Vec<String> {
    chain
        .iter()
        .map(|(_, n, v)| format!("{}@{}", n, v))
        .chain(std::iter::once(last))
        .collect()
}

pub struct Resolver<'a> {
    namespaces: &'a Namespaces,
    default_version: &'a Version,
}

impl<'a> Resolver<'a> {
    pub fn new(namespaces: &'a Namespaces, default_version: &'a Version) -> Self {
        Self {
            namespaces,
            default_version,
        }
    }

    /// Resolve every reference of `block`, kind by kind in [`REFERENCE_KINDS`]
    /// order and in declaration order within a kind.
    ///
    /// Resolved references are removed from their list; unresolved ones stay
    /// and their errors are attached to the block and returned.
    pub fn resolve(&self, block: &mut ParsedBlock) -> Vec<DocError> {
        let requested = version_or(block.version.as_deref(), self.default_version);
        let mut errors = Vec::new();

        for kind in REFERENCE_KINDS {
            let Some(Value::Array(references)) = block.local.shift_remove(kind.list_key) else {
                continue;
            };
            let mut unresolved = Vec::new();
            for reference in references {
                let Some(name) = reference.get("name").and_then(Value::as_str) else {
                    continue;
                };
                match self.expand(kind, name, &requested, &mut Vec::new()) {
                    Ok(inherited) => {
                        debug!(
                            "{}:{}: merged {} '{}'",
                            block.source_file, block.index, kind.list_key, name
                        );
                        merge_tree(&mut block.local, &inherited);
                    }
                    Err(failure) => {
                        let error = failure.into_error(block);
                        debug!("{}", error);
                        errors.push(error);
                        unresolved.push(reference);
                    }
                }
            }
            if !unresolved.is_empty() {
                block
                    .local
                    .insert(kind.list_key.to_string(), Value::Array(unresolved));
            }
        }

        block.errors.extend(errors.iter().cloned());
        errors
    }

    /// Fully expanded `local` content of definition `name` of `kind` at
    /// `requested`, with its own references of every kind merged in.
    fn expand(&self, kind: &ReferenceKind, name: &str, requested: &Version, chain: &mut Vec<Link>) -> Result<Tree, Failure> {
        if chain.len() > MAX_DEPTH {
            return Err(Failure::CycleOrTooDeep {
                name: name.to_string(),
                chain: chain_labels(chain, name.to_string()),
            });
        }

        let (version, block) = self
            .namespaces
            .get(kind.namespace)
            .and_then(|definitions| definitions.get(name))
            .and_then(|definition| matcher::select(&definition.versions, requested))
            .ok_or_else(|| Failure::Undefined {
                name: name.to_string(),
                version: requested.clone(),
            })?;

        if chain
            .iter()
            .any(|(ns, n, v)| *ns == kind.namespace && n == name && v == version)
        {
            return Err(Failure::CycleOrTooDeep {
                name: name.to_string(),
                chain: chain_labels(chain, format!("{}@{}", name, version)),
            });
        }

        let mut tree = block.local.clone();
        for key in NOT_INHERITED {
            tree.shift_remove(*key);
        }
        let nested: Vec<(&ReferenceKind, Vec<Value>)> = REFERENCE_KINDS
            .iter()
            .filter_map(|k| match tree.shift_remove(k.list_key) {
                Some(Value::Array(list)) => Some((k, list)),
                _ => None,
            })
            .collect();

        chain.push((kind.namespace, name.to_string(), version.clone()));
        for (inner_kind, references) in &nested {
            for reference in references {
                if let Some(inner) = reference.get("name").and_then(Value::as_str) {
                    let inherited = self.expand(inner_kind, inner, requested, chain)?;
                    merge_tree(&mut tree, &inherited);
                }
            }
        }
        chain.pop();

        Ok(tree)
    }
}
