//! Field de-duplicator: first declaration of a field wins.
//!
//! Runs after resolution. Local fields precede inherited ones in every list,
//! so keeping the first entry per `field` key lets a block override what it
//! inherits.

use crate::model::ParsedBlock;
use serde_json::Value;
use std::collections::HashSet;

/// Drop repeated `field` keys from every list under `local.<family>.fields`.
/// Returns how many entries were removed.
pub fn dedupe(block: &mut ParsedBlock, family: &str) -> usize {
    let Some(groups) = block
        .local
        .get_mut(family)
        .and_then(|f| f.get_mut("fields"))
        .and_then(Value::as_object_mut)
    else {
        return 0;
    };

    let mut removed = 0;
    for list in groups.values_mut().filter_map(Value::as_array_mut) {
        let before = list.len();
        let mut seen = HashSet::new();
        list.retain(|entry| match entry.get("field").and_then(Value::as_str) {
            Some(key) => seen.insert(key.to_string()),
            None => true,
        });
        removed += before - list.len();
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block(local: Value) -> ParsedBlock {
        let mut block = ParsedBlock::new("a.js", 1);
        block.local = local.as_object().cloned().unwrap();
        block
    }

    #[test]
    fn keeps_first_occurrence() {
        let mut b = block(json!({"success": {"fields": {"Success 200": [
            {"field": "id", "description": "first"},
            {"field": "id", "description": "second"},
            {"field": "name", "description": "name"}
        ]}}}));
        assert_eq!(dedupe(&mut b, "success"), 1);
        assert_eq!(
            b.local["success"]["fields"]["Success 200"],
            json!([
                {"field": "id", "description": "first"},
                {"field": "name", "description": "name"}
            ])
        );
    }

    #[test]
    fn groups_are_independent() {
        let mut b = block(json!({"parameter": {"fields": {
            "Parameter": [{"field": "id"}],
            "Login": [{"field": "id"}, {"field": "id"}]
        }}}));
        assert_eq!(dedupe(&mut b, "parameter"), 1);
        assert_eq!(b.local["parameter"]["fields"]["Parameter"], json!([{"field": "id"}]));
        assert_eq!(b.local["parameter"]["fields"]["Login"], json!([{"field": "id"}]));
    }

    #[test]
    fn missing_family_is_a_no_op() {
        let mut b = block(json!({"title": "x"}));
        assert_eq!(dedupe(&mut b, "error"), 0);
        assert_eq!(b.local, block(json!({"title": "x"})).local);
    }
}
