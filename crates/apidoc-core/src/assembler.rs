//! Block assembler: fold a block's elements into its `global`/`local` trees.
//!
//! Each element is parsed by its plugin and attached at the contract's path
//! with `insert` (shallow merge, later keys win) or `push` (append). Markdown
//! fields are rendered in a single pass once every element is in place.

use crate::error::DocError;
use crate::markdown::{render_field, MarkdownRenderer};
use crate::model::{Element, ParentNode, ParsedBlock, Record};
use crate::registry::{InsertionContract, Method, Registry};
use crate::tree::{array_at_mut, get_dotted_mut, object_at_mut, TreePath};
use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Transient state shared by the elements of one block.
///
/// Created fresh for every block so nothing leaks between blocks.
#[derive(Debug, Default, Clone)]
pub struct AssemblyContext {
    /// Group set by the last field tag (`@apiParam (Login) ...`).
    pub current_group: Option<String>,
    /// Object-typed fields seen so far, keyed by field path.
    pub parents: HashMap<String, ParentNode>,
}

impl AssemblyContext {
    /// Closest registered ancestor of a dotted field name.
    pub fn parent_of(&self, field: &str) -> Option<ParentNode> {
        field
            .char_indices()
            .rev()
            .filter(|(_, c)| *c == '.')
            .find_map(|(i, _)| self.parents.get(&field[..i]).cloned())
    }
}

/// A block plus the tag failures met while assembling it.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub block: ParsedBlock,
    pub failures: Vec<DocError>,
}

/// Where a Markdown-flagged record ended up.
struct MarkdownTarget {
    path: TreePath,
    /// List index for pushed records, `None` for inserted ones.
    slot: Option<usize>,
    contract: InsertionContract,
}

pub struct Assembler<'a> {
    registry: &'a Registry,
    markdown: Option<&'a dyn MarkdownRenderer>,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            markdown: None,
        }
    }

    pub fn with_markdown(mut self, renderer: &'a dyn MarkdownRenderer) -> Self {
        self.markdown = Some(renderer);
        self
    }

    /// Assemble the elements of block `index` (1-based) of `source_file`.
    pub fn assemble(&self, elements: &[Element], source_file: &str, index: usize) -> Assembly {
        let mut ctx = AssemblyContext::default();
        let mut block = ParsedBlock::new(source_file, index);
        let mut failures = Vec::new();
        let mut targets: Vec<MarkdownTarget> = Vec::new();

        for element in elements {
            let Some(plugin) = self.registry.get(&element.name) else {
                debug!("{}:{}: no plugin for @{}", source_file, index, element.tag);
                continue;
            };
            let contract = plugin.contract();

            let failure = |reason: String| {
                debug!("{}:{}: dropping @{}: {}", source_file, index, element.tag, reason);
                DocError::TagParseFailure {
                    tag: element.tag.clone(),
                    reason,
                    file: source_file.to_string(),
                    block: index,
                }
            };

            let record = match plugin.parse(&element.content, &mut ctx) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    debug!("{}:{}: @{} produced nothing", source_file, index, element.tag);
                    continue;
                }
                Err(err) => {
                    failures.push(failure(err.to_string()));
                    continue;
                }
            };

            let Some(path) = contract.path.resolve(&ctx) else {
                failures.push(failure("no insertion path".to_string()));
                continue;
            };

            match attach(&mut block, &path, contract.method, record) {
                Some(slot) => {
                    if !contract.markdown_fields.is_empty() {
                        targets.push(MarkdownTarget {
                            path,
                            slot,
                            contract,
                        });
                    }
                }
                None => failures.push(failure(format!("cannot attach at {}", path))),
            }
        }

        if let Some(renderer) = self.markdown {
            render_markdown(&mut block, &targets, renderer);
        }

        block.version = block
            .local
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string);

        debug!(
            "{}:{}: assembled {} element(s), {} failure(s)",
            source_file,
            index,
            elements.len(),
            failures.len()
        );
        Assembly { block, failures }
    }
}

/// Apply `method` at `path`. Returns the list slot used by `push`
/// (`Some(None)` for `insert`), or `None` if the path is blocked.
fn attach(block: &mut ParsedBlock, path: &TreePath, method: Method, record: Record) -> Option<Option<usize>> {
    let root = path.root(block);
    match method {
        Method::Insert => {
            let node = object_at_mut(root, &path.segments)?;
            for (key, value) in record {
                node.insert(key, value);
            }
            Some(None)
        }
        Method::Push => {
            let list = array_at_mut(root, &path.segments)?;
            list.push(Value::Object(record));
            Some(Some(list.len() - 1))
        }
    }
}

fn render_markdown(block: &mut ParsedBlock, targets: &[MarkdownTarget], renderer: &dyn MarkdownRenderer) {
    let mut done: HashSet<(TreePath, Option<usize>, &'static str)> = HashSet::new();

    for target in targets {
        let root = target.path.root(block);
        let node = match target.slot {
            None => object_at_mut(root, &target.path.segments),
            Some(i) => array_at_mut(root, &target.path.segments)
                .and_then(|list| list.get_mut(i))
                .and_then(Value::as_object_mut),
        };
        let Some(node) = node else { continue };

        for &field in target.contract.markdown_fields {
            if !done.insert((target.path.clone(), target.slot, field)) {
                continue;
            }
            if let Some(Value::String(text)) = get_dotted_mut(node, field) {
                if text.is_empty() {
                    continue;
                }
                let strip_p = target.contract.inline_markdown_fields.contains(&field);
                *text = render_field(renderer, text, strip_p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TagError;
    use crate::lexer::lex;
    use crate::markdown::CommonMark;
    use crate::registry::TagPlugin;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// `@apiMeta key value` inserted into `local.meta`.
    struct Meta;

    impl TagPlugin for Meta {
        fn contract(&self) -> InsertionContract {
            InsertionContract::insert("local.meta")
        }

        fn parse(&self, content: &str, _ctx: &mut AssemblyContext) -> Result<Option<Record>, TagError> {
            let (key, value) = content
                .split_once(' ')
                .ok_or_else(|| TagError::new("expected key and value", "@apiMeta key value"))?;
            let mut record = Record::new();
            record.insert(key.to_string(), Value::from(value));
            Ok(Some(record))
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::standard();
        registry.register("apiMeta", Meta);
        registry
    }

    fn assemble(registry: &Registry, text: &str) -> Assembly {
        let elements = lex(text, &registry.tag_names());
        Assembler::new(registry).assemble(&elements, "users.js", 1)
    }

    #[test]
    fn insert_later_keys_overwrite() {
        let registry = registry();
        let out = assemble(&registry, "@apiMeta owner alice\n@apiMeta stage beta\n@apiMeta owner bob");
        assert_eq!(
            Value::Object(out.block.local),
            json!({"meta": {"owner": "bob", "stage": "beta"}})
        );
    }

    #[test]
    fn push_keeps_declaration_order() {
        let registry = registry();
        let out = assemble(&registry, "@apiUse A\n@apiUse B\n@apiUse C");
        assert_eq!(
            out.block.local["use"],
            json!([{"name": "A"}, {"name": "B"}, {"name": "C"}])
        );
    }

    #[test]
    fn field_groups_follow_the_latest_group() {
        let registry = registry();
        let out = assemble(
            &registry,
            "@apiParam {Number} id ID.\n@apiParam (Login) {String} user Name.\n@apiSuccess {String} token Token.",
        );
        let local = Value::Object(out.block.local);
        assert_eq!(local["parameter"]["fields"]["Parameter"][0]["field"], "id");
        assert_eq!(local["parameter"]["fields"]["Login"][0]["field"], "user");
        assert_eq!(local["success"]["fields"]["Success 200"][0]["field"], "token");
    }

    #[test]
    fn failing_tag_is_dropped_and_block_still_assembles() {
        let registry = registry();
        let out = assemble(&registry, "@apiVersion 1.x\n@apiMeta broken\n@apiName GetUser");
        assert_eq!(out.block.local.get("name"), Some(&json!("GetUser")));
        assert!(out.block.local.get("version").is_none());
        assert_eq!(out.failures.len(), 2);
        assert!(matches!(
            &out.failures[0],
            DocError::TagParseFailure { tag, block: 1, .. } if tag == "apiVersion"
        ));
    }

    #[test]
    fn null_results_are_skipped_silently() {
        let registry = registry();
        let out = assemble(&registry, "@apiIgnore\n@apiName\n@apiGroup User");
        assert!(out.failures.is_empty());
        assert_eq!(Value::Object(out.block.local), json!({"group": "User"}));
    }

    #[test]
    fn explicit_version_is_recorded() {
        let registry = registry();
        let out = assemble(&registry, "@apiVersion 1.2.0\n@api {get} /user");
        assert_eq!(out.block.version.as_deref(), Some("1.2.0"));
        assert_eq!(out.block.source_file, "users.js");
    }

    #[test]
    fn blocked_path_is_a_failure() {
        let mut registry = registry();
        registry.register("apiMetaRaw", crate::plugins::Label::new("meta", false));
        let out = assemble(&registry, "@apiMetaRaw plain\n@apiMeta owner bob");
        assert_eq!(out.block.local["meta"], json!("plain"));
        assert_eq!(out.failures.len(), 1);
    }

    #[test]
    fn markdown_rendered_once_after_assembly() {
        let registry = registry();
        let elements = lex(
            "@apiDescription Some *text*\n@apiParam {String} name The **name**\n@apiDeprecated use v2",
            &registry.tag_names(),
        );
        let out = Assembler::new(&registry)
            .with_markdown(&CommonMark)
            .assemble(&elements, "users.js", 3);
        let local = Value::Object(out.block.local);
        assert_eq!(local["description"], "<p>Some <em>text</em></p>");
        let field = &local["parameter"]["fields"]["Parameter"][0];
        assert_eq!(field["description"], "<p>The <strong>name</strong></p>");
        assert_eq!(field["type"], "String");
        assert_eq!(local["deprecated"]["content"], "use v2");
    }

    #[test]
    fn context_does_not_leak_between_blocks() {
        let registry = registry();
        let assembler = Assembler::new(&registry);
        let first = lex("@apiParam (Login) {Object} user User.", &registry.tag_names());
        let second = lex("@apiParam {String} user.name Name.", &registry.tag_names());
        assembler.assemble(&first, "a.js", 1);
        let out = assembler.assemble(&second, "a.js", 2);
        let local = Value::Object(out.block.local);
        let field = &local["parameter"]["fields"]["Parameter"][0];
        assert!(field.get("parentNode").is_none());
    }

    #[test]
    fn parent_lookup_walks_up_dotted_names() {
        let mut ctx = AssemblyContext::default();
        ctx.parents.insert(
            "user".to_string(),
            ParentNode {
                path: "user".to_string(),
                field: "user".to_string(),
                type_name: "Object".to_string(),
                is_array: false,
                parent_node: None,
            },
        );
        assert_eq!(ctx.parent_of("user.address.city").map(|p| p.path), Some("user".to_string()));
        assert!(ctx.parent_of("user").is_none());
    }
}
