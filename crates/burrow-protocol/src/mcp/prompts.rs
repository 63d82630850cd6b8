//! MCP prompts/* method types.
//!
//! burrow advertises the prompts capability but serves no prompts.

use serde::{Deserialize, Serialize};

/// A prompt definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpPromptDefinition {
    /// Prompt name.
    pub name: String,
    /// Prompt description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response for `prompts/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsListResult {
    /// Available prompts.
    pub prompts: Vec<McpPromptDefinition>,
}
