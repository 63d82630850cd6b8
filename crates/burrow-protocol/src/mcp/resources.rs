//! MCP resources/* method types.
//!
//! burrow advertises the resources capability but exposes files only
//! through tools, so the list is always empty.

use serde::{Deserialize, Serialize};

/// A resource definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Resource name.
    pub name: String,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Response for `resources/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesListResult {
    /// Available resources.
    pub resources: Vec<McpResourceDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_serializes_as_array() {
        let s = serde_json::to_string(&ResourcesListResult::default()).expect("ser");
        assert_eq!(s, r#"{"resources":[]}"#);
    }

    #[test]
    fn mime_type_is_camel_case() {
        let def = McpResourceDefinition {
            uri: "file:///x".into(),
            name: "x".into(),
            mime_type: Some("text/plain".into()),
        };
        let s = serde_json::to_string(&def).expect("ser");
        assert!(s.contains("mimeType"));
    }
}
