//! Tool descriptors and their JSON Schema input description.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use burrow_protocol::mcp::McpToolDefinition;

/// One declared argument of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolArgument {
    /// Argument name.
    pub name: String,
    /// JSON Schema type (string, number, boolean, etc.).
    #[serde(rename = "type")]
    pub arg_type: String,
    /// Human-readable description.
    pub description: String,
    /// Whether this argument is required.
    #[serde(default)]
    pub required: bool,
}

impl ToolArgument {
    /// A required string argument.
    pub fn required_string(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            arg_type: "string".to_string(),
            description: description.to_string(),
            required: true,
        }
    }
}

/// Immutable record describing a registered tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of accepted arguments.
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Builds a descriptor whose schema is derived from `arguments`.
    pub fn new(name: &str, description: &str, arguments: &[ToolArgument]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: build_input_schema(arguments),
        }
    }
}

impl From<&ToolDescriptor> for McpToolDefinition {
    fn from(d: &ToolDescriptor) -> Self {
        McpToolDefinition {
            name: d.name.clone(),
            description: Some(d.description.clone()),
            input_schema: d.input_schema.clone(),
        }
    }
}

/// Builds a JSON Schema `inputSchema` from tool arguments.
pub fn build_input_schema(arguments: &[ToolArgument]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for arg in arguments {
        let mut prop = serde_json::Map::new();
        prop.insert("type".to_string(), Value::String(arg.arg_type.clone()));
        prop.insert(
            "description".to_string(),
            Value::String(arg.description.clone()),
        );
        properties.insert(arg.name.clone(), Value::Object(prop));
        if arg.required {
            required.push(Value::String(arg.name.clone()));
        }
    }

    let mut schema = serde_json::Map::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    Value::Object(schema)
}
