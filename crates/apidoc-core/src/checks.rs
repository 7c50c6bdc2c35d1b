//! URL parameter consistency of endpoint blocks.
//!
//! Every `:name` segment of an endpoint URL should be documented by an
//! `@apiParam` (declared locally or inherited), and every mandatory
//! `@apiParam` the endpoint declares itself should appear in the URL.
//! Both findings are warnings.

use crate::error::DocError;
use crate::model::{ParsedBlock, Tree};
use serde_json::Value;

/// An `@apiParam` entry as far as the checks care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamField {
    pub field: String,
    pub optional: bool,
}

/// All `@apiParam` fields of `local`, across every group.
pub fn param_fields(local: &Tree) -> Vec<ParamField> {
    let Some(groups) = local
        .get("parameter")
        .and_then(|p| p.get("fields"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };
    groups
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|entry| {
            Some(ParamField {
                field: entry.get("field")?.as_str()?.to_string(),
                optional: entry.get("optional").and_then(Value::as_bool).unwrap_or(false),
            })
        })
        .collect()
}

/// Names of the `:param` path segments of `url`.
///
/// Scheme, host, query and fragment are ignored.
pub fn url_params(url: &str) -> Vec<&str> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = match path.find("://") {
        Some(i) => {
            let rest = &path[i + 3..];
            rest.find('/').map_or("", |j| &rest[j..])
        }
        None => path,
    };
    path.split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Check a resolved endpoint block. `own` holds the params the block
/// declared itself, captured before references were merged in.
pub fn check_url_params(block: &ParsedBlock, own: &[ParamField]) -> Vec<DocError> {
    let url = block.local.get("url").and_then(Value::as_str).unwrap_or("");
    let title = block
        .local
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let documented = param_fields(&block.local);
    let in_url = url_params(url);

    let mut warnings: Vec<DocError> = in_url
        .iter()
        .filter(|param| !documented.iter().any(|p| p.field == **param))
        .map(|param| DocError::UndocumentedUrlParam {
            param: param.to_string(),
            title: title.clone(),
            file: block.source_file.clone(),
            block: block.index,
        })
        .collect();

    warnings.extend(
        own.iter()
            .filter(|p| !p.optional && !in_url.contains(&p.field.as_str()))
            .map(|p| DocError::ParamNotInUrl {
                field: p.field.clone(),
                title: title.clone(),
                file: block.source_file.clone(),
                block: block.index,
            }),
    );
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn endpoint(local: Value) -> ParsedBlock {
        let mut block = ParsedBlock::new("users.js", 3);
        block.local = local.as_object().cloned().unwrap();
        block
    }

    fn param(field: &str, optional: bool) -> ParamField {
        ParamField {
            field: field.to_string(),
            optional,
        }
    }

    #[test]
    fn url_params_from_path_only() {
        assert_eq!(url_params("/user/:id/posts/:post"), vec!["id", "post"]);
        assert_eq!(url_params("https://api.example.com:8080/user/:id?sort=:x#:y"), vec!["id"]);
        assert_eq!(url_params("user/:id"), vec!["id"]);
        assert!(url_params("/user/:").is_empty());
        assert!(url_params("").is_empty());
    }

    #[test]
    fn params_are_read_from_every_group() {
        let local = json!({"parameter": {"fields": {
            "Parameter": [{"field": "id", "optional": false}],
            "Login": [{"field": "token", "optional": true}]
        }}});
        assert_eq!(
            param_fields(local.as_object().unwrap()),
            vec![param("id", false), param("token", true)]
        );
    }

    #[test]
    fn undocumented_url_param_is_a_warning() {
        let block = endpoint(json!({"url": "/user/:id", "title": "Read user"}));
        let warnings = check_url_params(&block, &[]);
        assert_eq!(
            warnings,
            vec![DocError::UndocumentedUrlParam {
                param: "id".to_string(),
                title: "Read user".to_string(),
                file: "users.js".to_string(),
                block: 3,
            }]
        );
        assert_eq!(warnings[0].severity(), crate::error::Severity::Warning);
    }

    #[test]
    fn inherited_param_documents_url() {
        // `id` came in through a reference: documented, but not one of `own`.
        let block = endpoint(json!({
            "url": "/user/:id",
            "parameter": {"fields": {"Parameter": [{"field": "id", "optional": false}]}}
        }));
        assert!(check_url_params(&block, &[]).is_empty());
    }

    #[test]
    fn mandatory_own_param_missing_from_url() {
        let block = endpoint(json!({
            "url": "/user",
            "title": "Create user",
            "parameter": {"fields": {"Parameter": [
                {"field": "name", "optional": false},
                {"field": "age", "optional": true}
            ]}}
        }));
        let own = param_fields(&block.local);
        assert_eq!(
            check_url_params(&block, &own),
            vec![DocError::ParamNotInUrl {
                field: "name".to_string(),
                title: "Create user".to_string(),
                file: "users.js".to_string(),
                block: 3,
            }]
        );
    }

    #[test]
    fn consistent_endpoint_has_no_warnings() {
        let block = endpoint(json!({
            "url": "/user/:id",
            "parameter": {"fields": {"Parameter": [{"field": "id", "optional": false}]}}
        }));
        let own = param_fields(&block.local);
        assert!(check_url_params(&block, &own).is_empty());
    }
}
