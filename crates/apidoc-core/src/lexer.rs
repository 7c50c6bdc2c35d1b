//! Element lexer: split one comment block into `(tag, content)` elements.
//!
//! A new element starts only on a line whose first token (after optional
//! whitespace) is `@name` with `name` registered. Comment gutters are
//! already stripped by the block extractor, so a Markdown bullet such as
//! `* @apiUse X` inside a description stays content.
//! Anything else, including `@Test` annotations or e-mail addresses inside
//! an example payload, stays part of the current element verbatim.

use crate::model::Element;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// Indent, then `@name`, then the rest of the line.
static RE_TAG_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*@([A-Za-z][A-Za-z0-9_-]*)(.*)$").unwrap());

/// Split `block` into elements. `known` holds lowercased tag names.
///
/// Text before the first recognized tag is discarded.
pub fn lex(block: &str, known: &HashSet<String>) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in block.lines() {
        if let Some((tag, rest)) = tag_start(line, known) {
            if let Some((tag, content)) = current.take() {
                elements.push(finish(tag, content));
            }
            current = Some((tag.to_string(), rest.to_string()));
            continue;
        }
        if let Some((_, ref mut content)) = current {
            content.push('\n');
            content.push_str(line);
        }
    }

    if let Some((tag, content)) = current {
        elements.push(finish(tag, content));
    }
    elements
}

/// If `line` opens a registered tag, return the tag and the rest of the line.
fn tag_start<'a>(line: &'a str, known: &HashSet<String>) -> Option<(&'a str, &'a str)> {
    let caps = RE_TAG_START.captures(line)?;
    let tag = caps.get(1)?.as_str();
    if !known.contains(&tag.to_lowercase()) {
        return None;
    }
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((tag, rest.trim_start_matches([' ', '\t'])))
}

fn finish(tag: String, content: String) -> Element {
    Element::new(tag, content.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn known(tags: &[&str]) -> HashSet<String> {
        tags.iter().map(|t| t.to_lowercase()).collect()
    }

    fn tags() -> HashSet<String> {
        known(&["api", "apiName", "apiParam", "apiParamExample", "apiUse", "apiDescription"])
    }

    #[test]
    fn splits_on_registered_tags() {
        let block = "@api {get} /user/:id Read user\n@apiName GetUser\n@apiParam {Number} id Users unique ID.";
        let elements = lex(block, &tags());
        assert_eq!(
            elements,
            vec![
                Element::new("api", "{get} /user/:id Read user"),
                Element::new("apiName", "GetUser"),
                Element::new("apiParam", "{Number} id Users unique ID."),
            ]
        );
    }

    #[test]
    fn example_with_java_annotation_is_not_split() {
        let block = "@apiParamExample {json} Request\n{\n  \"id\": 4711\n}\n@Test\npublic void check() {}\n@apiUse UserObject";
        let elements = lex(block, &tags());
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].tag, "apiParamExample");
        assert!(elements[0].content.contains("\n@Test\n"));
        assert_eq!(elements[1], Element::new("apiUse", "UserObject"));
    }

    #[test]
    fn unregistered_tag_with_registered_prefix_does_not_split() {
        let block = "@apiDescription first\n@apiDescriptionX not a tag\n  mail me @ home";
        let elements = lex(block, &tags());
        assert_eq!(elements.len(), 1);
        assert_eq!(
            elements[0].content,
            "first\n@apiDescriptionX not a tag\n  mail me @ home"
        );
    }

    #[test]
    fn tag_lookup_is_case_insensitive() {
        let elements = lex("@APINAME Shout", &tags());
        assert_eq!(elements, vec![Element::new("APINAME", "Shout")]);
        assert_eq!(elements[0].name, "apiname");
    }

    #[test]
    fn indent_is_skipped() {
        let elements = lex("   @apiName GetUser\n\t  @apiUse Shared", &tags());
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].content, "Shared");
    }

    #[test]
    fn bullet_with_tag_stays_content() {
        let elements = lex("@apiDescription Related:\n* @apiUse X\n  - @apiName Y", &tags());
        assert_eq!(
            elements,
            vec![Element::new("apiDescription", "Related:\n* @apiUse X\n  - @apiName Y")]
        );
    }

    #[test]
    fn preamble_before_first_tag_is_dropped() {
        let elements = lex("Some prose.\n\n@apiName Thing", &tags());
        assert_eq!(elements, vec![Element::new("apiName", "Thing")]);
    }

    #[test]
    fn trailing_blank_lines_are_trimmed() {
        let elements = lex("@apiDescription text\n\n   \n", &tags());
        assert_eq!(elements[0].content, "text");
    }

    #[test]
    fn relexing_one_element_is_idempotent() {
        let block = "@apiParamExample {json} Request\n{\n  \"id\": 4711\n}\n@Test";
        let first = lex(block, &tags());
        assert_eq!(first.len(), 1);
        let again = lex(&first[0].source(), &tags());
        assert_eq!(again, first);
    }

    #[test]
    fn relexing_element_with_empty_first_line() {
        let first = lex("@apiParamExample\n  {\"a\": 1}", &tags());
        let again = lex(&first[0].source(), &tags());
        assert_eq!(again, first);
    }
}
