//! Path addressing and merging inside a block's documentation tree.

use crate::model::{ParsedBlock, Tree};
use serde_json::{Map, Value};
use std::fmt;

/// Which half of a [`ParsedBlock`] a path points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Global,
    Local,
}

/// Resolved insertion target: a region plus the keys below it.
///
/// Segments are kept separate so group names containing dots or spaces
/// (`Success 200`) stay a single key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath {
    pub region: Region,
    pub segments: Vec<String>,
}

impl TreePath {
    /// Parse a dotted path such as `local.parameter.examples`.
    /// Returns `None` unless it starts with `global` or `local`.
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.split('.');
        let region = match parts.next()? {
            "global" => Region::Global,
            "local" => Region::Local,
            _ => return None,
        };
        let segments: Vec<String> = parts.map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { region, segments })
    }

    pub fn local(segments: &[&str]) -> Self {
        Self {
            region: Region::Local,
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn root<'a>(&self, block: &'a mut ParsedBlock) -> &'a mut Tree {
        match self.region {
            Region::Global => &mut block.global,
            Region::Local => &mut block.local,
        }
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self.region {
            Region::Global => "global",
            Region::Local => "local",
        };
        write!(f, "{}", region)?;
        for seg in &self.segments {
            write!(f, ".{}", seg)?;
        }
        Ok(())
    }
}

/// Walk (creating objects as needed) to the object at `segments`.
/// Returns `None` if an existing non-object value is in the way.
pub fn object_at_mut<'a>(root: &'a mut Tree, segments: &[String]) -> Option<&'a mut Tree> {
    let mut current = root;
    for seg in segments {
        let slot = current
            .entry(seg.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = slot.as_object_mut()?;
    }
    Some(current)
}

/// Walk to the list at `segments`, creating it (and its parents) if absent.
pub fn array_at_mut<'a>(root: &'a mut Tree, segments: &[String]) -> Option<&'a mut Vec<Value>> {
    let (last, parents) = segments.split_last()?;
    let parent = object_at_mut(root, parents)?;
    parent
        .entry(last.clone())
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
}

/// Value at a dotted path relative to `tree` (`deprecated.content`); never
/// creates anything.
pub fn get_dotted_mut<'a>(tree: &'a mut Tree, path: &str) -> Option<&'a mut Value> {
    let mut parts = path.split('.');
    let mut current = tree.get_mut(parts.next()?)?;
    for part in parts {
        current = current.as_object_mut()?.get_mut(part)?;
    }
    Some(current)
}

/// Merge inherited content into `target`, after what `target` already holds.
///
/// Lists are concatenated (target entries first), objects merge key by key,
/// and a scalar already present in `target` is kept.
pub fn merge_tree(target: &mut Tree, source: &Tree) {
    for (key, incoming) in source {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), incoming.clone());
            }
            Some(Value::Array(existing)) => {
                if let Value::Array(items) = incoming {
                    existing.extend(items.iter().cloned());
                }
            }
            Some(Value::Object(existing)) => {
                if let Value::Object(inner) = incoming {
                    merge_tree(existing, inner);
                }
            }
            Some(Value::Null) => {
                target.insert(key.clone(), incoming.clone());
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(value: Value) -> Tree {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn parse_paths() {
        let p = TreePath::parse("local.parameter.examples").unwrap();
        assert_eq!(p.region, Region::Local);
        assert_eq!(p.segments, vec!["parameter", "examples"]);
        assert_eq!(TreePath::parse("local").unwrap().segments.len(), 0);
        assert_eq!(TreePath::parse("global.define").unwrap().to_string(), "global.define");
        assert!(TreePath::parse("other.x").is_none());
        assert!(TreePath::parse("local..x").is_none());
    }

    #[test]
    fn array_is_created_with_parents() {
        let mut root = Tree::new();
        let segs = vec!["parameter".to_string(), "fields".to_string(), "Success 200".to_string()];
        array_at_mut(&mut root, &segs).unwrap().push(json!({"field": "id"}));
        assert_eq!(
            Value::Object(root),
            json!({"parameter": {"fields": {"Success 200": [{"field": "id"}]}}})
        );
    }

    #[test]
    fn scalar_in_the_way_is_reported() {
        let mut root = tree(json!({"parameter": "oops"}));
        let segs = vec!["parameter".to_string(), "fields".to_string()];
        assert!(object_at_mut(&mut root, &segs).is_none());
    }

    #[test]
    fn dotted_lookup() {
        let mut t = tree(json!({"deprecated": {"content": "use v2"}}));
        assert_eq!(get_dotted_mut(&mut t, "deprecated.content"), Some(&mut json!("use v2")));
        assert_eq!(get_dotted_mut(&mut t, "deprecated.missing"), None);
    }

    #[test]
    fn merge_concatenates_lists_and_keeps_scalars() {
        let mut target = tree(json!({
            "title": "Local",
            "parameter": {"fields": {"Parameter": [{"field": "id", "description": "local"}]}}
        }));
        let source = tree(json!({
            "title": "Inherited",
            "description": "From define",
            "parameter": {"fields": {
                "Parameter": [{"field": "id"}, {"field": "name"}],
                "Extra": [{"field": "x"}]
            }}
        }));
        merge_tree(&mut target, &source);
        assert_eq!(
            Value::Object(target),
            json!({
                "title": "Local",
                "parameter": {"fields": {
                    "Parameter": [{"field": "id", "description": "local"}, {"field": "id"}, {"field": "name"}],
                    "Extra": [{"field": "x"}]
                }},
                "description": "From define"
            })
        );
    }
}
