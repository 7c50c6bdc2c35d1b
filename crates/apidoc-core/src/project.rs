//! Project metadata (`apidoc.json`).

use serde::{Deserialize, Serialize};

/// Package-level information supplied alongside the sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version assumed for blocks without `@apiVersion`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base URL prepended to relative sample-request URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_url: Option<String>,
}
