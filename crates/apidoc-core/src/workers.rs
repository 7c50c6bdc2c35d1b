//! Post-processing of resolved endpoint blocks.
//!
//! These run after reference resolution and before de-duplication. They
//! fill in defaults and replace definition names by their titles.

use crate::collector::{self, Definitions};
use crate::matcher::version_or;
use crate::model::{ParsedBlock, Tree};
use crate::project::ProjectInfo;
use semver::Version;
use serde_json::Value;
use std::path::Path;

/// Inputs shared by all workers of one pass.
pub struct WorkerContext<'a> {
    /// `@apiDefine` definitions.
    pub defines: &'a Definitions,
    pub default_version: &'a Version,
    pub project: &'a ProjectInfo,
}

impl WorkerContext<'_> {
    /// Non-empty `key` of the `@apiDefine` named `name` applicable at `version`.
    fn define_text(&self, name: &str, version: &Version, key: &str) -> Option<String> {
        collector::definition_record(self.defines, "define", name, version)?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Run every worker on `block`, in order.
pub fn run_all(block: &mut ParsedBlock, ctx: &WorkerContext, families: &[&str]) {
    apply_defaults(block, ctx);
    for family in families {
        field_group_titles(block, family, ctx);
    }
    group_title(block, ctx);
    permissions(block, ctx);
    derive_name(block);
    sample_requests(block, ctx);
}

fn str_of<'a>(tree: &'a Tree, key: &str) -> &'a str {
    tree.get(key).and_then(Value::as_str).unwrap_or("")
}

/// `type`, `url`, `version` and `filename` are always present.
pub fn apply_defaults(block: &mut ParsedBlock, ctx: &WorkerContext) {
    let version = block
        .version
        .clone()
        .unwrap_or_else(|| ctx.default_version.to_string());
    let filename = block.source_file.replace('\\', "/");
    let local = &mut block.local;
    local.entry("type").or_insert_with(|| Value::from(""));
    local.entry("url").or_insert_with(|| Value::from(""));
    local.entry("version").or_insert_with(|| Value::from(version));
    local.insert("filename".to_string(), Value::from(filename));
}

/// Rename field groups that name an `@apiDefine` to the definition's title.
pub fn field_group_titles(block: &mut ParsedBlock, family: &str, ctx: &WorkerContext) {
    let version = version_or(block.version.as_deref(), ctx.default_version);
    let Some(groups) = block
        .local
        .get_mut(family)
        .and_then(|f| f.get_mut("fields"))
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    let old = std::mem::take(groups);
    for (group, list) in old {
        let key = ctx.define_text(&group, &version, "title").unwrap_or(group);
        if let Some(Value::Array(existing)) = groups.get_mut(&key) {
            if let Value::Array(items) = list {
                existing.extend(items);
                continue;
            }
        }
        groups.insert(key, list);
    }
}

/// `group` defaults to the file stem; `groupTitle`/`groupDescription` come
/// from a matching `@apiDefine`.
pub fn group_title(block: &mut ParsedBlock, ctx: &WorkerContext) {
    let version = version_or(block.version.as_deref(), ctx.default_version);
    if str_of(&block.local, "group").is_empty() {
        let stem = Path::new(&block.source_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        block.local.insert("group".to_string(), Value::from(stem));
    }
    let group = str_of(&block.local, "group").to_string();

    let title = ctx
        .define_text(&group, &version, "title")
        .unwrap_or_else(|| group.clone());
    block.local.insert("groupTitle".to_string(), Value::from(title));
    if let Some(description) = ctx.define_text(&group, &version, "description") {
        block
            .local
            .insert("groupDescription".to_string(), Value::from(description));
    }
}

/// Give every `@apiPermission` entry a title (and description if defined).
pub fn permissions(block: &mut ParsedBlock, ctx: &WorkerContext) {
    let version = version_or(block.version.as_deref(), ctx.default_version);
    let Some(entries) = block.local.get_mut("permission").and_then(Value::as_array_mut) else {
        return;
    };
    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
        let name = str_of(entry, "name").to_string();
        let title = ctx
            .define_text(&name, &version, "title")
            .unwrap_or_else(|| name.clone());
        entry.insert("title".to_string(), Value::from(title));
        if let Some(description) = ctx.define_text(&name, &version, "description") {
            entry.insert("description".to_string(), Value::from(description));
        }
    }
}

/// Blocks without `@apiName` are named after method and path
/// (`{get} /user/:id` -> `GetUserId`).
pub fn derive_name(block: &mut ParsedBlock) {
    if !str_of(&block.local, "name").is_empty() {
        return;
    }
    let name = name_from(str_of(&block.local, "type"), str_of(&block.local, "url"));
    if !name.is_empty() {
        block.local.insert("name".to_string(), Value::from(name));
    }
}

fn name_from(method: &str, url: &str) -> String {
    std::iter::once(method)
        .chain(url.split(|c: char| !c.is_alphanumeric()))
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_absolute(url: &str) -> bool {
    url.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("http"))
}

/// Drop `off` entries and prefix relative URLs with the project's sample URL.
/// Without entries, a sample request is built from the endpoint URL.
pub fn sample_requests(block: &mut ParsedBlock, ctx: &WorkerContext) {
    let sample_url = ctx.project.sample_url.as_deref().filter(|s| !s.is_empty());
    let prefixed = |url: &str| match sample_url {
        Some(base) if !is_absolute(url) => format!("{}{}", base, url),
        _ => url.to_string(),
    };

    match block.local.shift_remove("sampleRequest") {
        Some(Value::Array(entries)) => {
            let kept: Vec<Value> = entries
                .into_iter()
                .filter_map(|mut entry| {
                    let url = entry.get("url").and_then(Value::as_str)?.to_string();
                    if url == "off" {
                        return None;
                    }
                    entry["url"] = Value::from(prefixed(&url));
                    Some(entry)
                })
                .collect();
            if !kept.is_empty() {
                block
                    .local
                    .insert("sampleRequest".to_string(), Value::Array(kept));
            }
        }
        _ => {
            let url = str_of(&block.local, "url");
            if sample_url.is_some() && !url.is_empty() {
                let entry = serde_json::json!([{ "url": prefixed(url) }]);
                block.local.insert("sampleRequest".to_string(), entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::collect;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn define(name: &str, title: &str, description: &str) -> ParsedBlock {
        let mut block = ParsedBlock::new("defs.js", 1);
        block.global.insert(
            "define".to_string(),
            json!({"name": name, "title": title, "description": description}),
        );
        block
    }

    fn endpoint(local: Value) -> ParsedBlock {
        let mut block = ParsedBlock::new("src\\users.js", 2);
        block.local = local.as_object().cloned().unwrap();
        block
    }

    struct Fixture {
        defines: Definitions,
        default_version: Version,
        project: ProjectInfo,
    }

    impl Fixture {
        fn new(defines: Vec<ParsedBlock>, sample_url: Option<&str>) -> Self {
            Self {
                defines: collect(&[defines], "define", &v("0.0.0")).0,
                default_version: v("0.0.0"),
                project: ProjectInfo {
                    sample_url: sample_url.map(str::to_string),
                    ..Default::default()
                },
            }
        }

        fn ctx(&self) -> WorkerContext<'_> {
            WorkerContext {
                defines: &self.defines,
                default_version: &self.default_version,
                project: &self.project,
            }
        }
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let fx = Fixture::new(vec![], None);
        let mut block = endpoint(json!({"url": "/user"}));
        apply_defaults(&mut block, &fx.ctx());
        assert_eq!(
            Value::Object(block.local),
            json!({"url": "/user", "type": "", "version": "0.0.0", "filename": "src/users.js"})
        );
    }

    #[test]
    fn field_groups_take_define_titles() {
        let fx = Fixture::new(vec![define("LoginParam", "Login parameters", "")], None);
        let mut block = endpoint(json!({"parameter": {"fields": {
            "LoginParam": [{"field": "user"}],
            "Parameter": [{"field": "id"}]
        }}}));
        field_group_titles(&mut block, "parameter", &fx.ctx());
        assert_eq!(
            block.local["parameter"]["fields"],
            json!({"Login parameters": [{"field": "user"}], "Parameter": [{"field": "id"}]})
        );
    }

    #[test]
    fn group_defaults_to_file_stem() {
        let fx = Fixture::new(vec![define("User", "User accounts", "All about users.")], None);
        let mut named = endpoint(json!({"group": "User"}));
        group_title(&mut named, &fx.ctx());
        assert_eq!(named.local["groupTitle"], "User accounts");
        assert_eq!(named.local["groupDescription"], "All about users.");

        let mut unnamed = ParsedBlock::new("api/orders.js", 1);
        group_title(&mut unnamed, &fx.ctx());
        assert_eq!(unnamed.local["group"], "orders");
        assert_eq!(unnamed.local["groupTitle"], "orders");
    }

    #[test]
    fn permissions_are_enriched() {
        let fx = Fixture::new(vec![define("admin", "Admin access", "Only admins.")], None);
        let mut block = endpoint(json!({"permission": [{"name": "admin"}, {"name": "guest"}]}));
        permissions(&mut block, &fx.ctx());
        assert_eq!(
            block.local["permission"],
            json!([
                {"name": "admin", "title": "Admin access", "description": "Only admins."},
                {"name": "guest", "title": "guest"}
            ])
        );
    }

    #[test]
    fn names_derive_from_method_and_url() {
        assert_eq!(name_from("get", "/user/:id"), "GetUserId");
        assert_eq!(name_from("post", "/user-profile/{id}/avatar"), "PostUserProfileIdAvatar");

        let mut block = endpoint(json!({"type": "delete", "url": "/session"}));
        derive_name(&mut block);
        assert_eq!(block.local["name"], "DeleteSession");

        let mut named = endpoint(json!({"name": "Keep", "type": "get", "url": "/x"}));
        derive_name(&mut named);
        assert_eq!(named.local["name"], "Keep");
    }

    #[test]
    fn sample_requests_prefix_and_drop_off() {
        let fx = Fixture::new(vec![], Some("https://api.example.com"));
        let mut block = endpoint(json!({
            "url": "/user/:id",
            "sampleRequest": [{"url": "off"}, {"url": "/test"}, {"url": "HTTP://other/x"}]
        }));
        sample_requests(&mut block, &fx.ctx());
        assert_eq!(
            block.local["sampleRequest"],
            json!([{"url": "https://api.example.com/test"}, {"url": "HTTP://other/x"}])
        );

        let mut off = endpoint(json!({"url": "/a", "sampleRequest": [{"url": "off"}]}));
        sample_requests(&mut off, &fx.ctx());
        assert!(off.local.get("sampleRequest").is_none());
    }

    #[test]
    fn sample_request_built_from_url() {
        let fx = Fixture::new(vec![], Some("https://api.example.com"));
        let mut block = endpoint(json!({"url": "/user/:id"}));
        sample_requests(&mut block, &fx.ctx());
        assert_eq!(block.local["sampleRequest"], json!([{"url": "https://api.example.com/user/:id"}]));

        let none = Fixture::new(vec![], None);
        let mut plain = endpoint(json!({"url": "/user/:id"}));
        sample_requests(&mut plain, &none.ctx());
        assert!(plain.local.get("sampleRequest").is_none());
    }
}
