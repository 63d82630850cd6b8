//! Handles the `tools/list` MCP method.

use burrow_protocol::mcp::{McpToolDefinition, ToolsListResult};
use burrow_protocol::{JsonRpcOutput, RequestId};
use burrow_tools::ToolRegistry;

use super::to_output;

/// Returns every registered tool, in registration order, as one page.
pub(crate) fn handle_tools_list(id: RequestId, registry: &ToolRegistry) -> JsonRpcOutput {
    let definitions: Vec<McpToolDefinition> =
        registry.list().map(McpToolDefinition::from).collect();

    let result = ToolsListResult {
        tools: definitions,
        next_cursor: None,
    };
    to_output(id, &result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use burrow_tools::{ToolArgument, ToolDescriptor, ToolHandler, ToolOutput};
    use burrow_types::ToolError;
    use serde_json::Value;

    struct Noop;

    #[async_trait]
    impl ToolHandler for Noop {
        async fn call(&self, _arguments: Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(""))
        }
    }

    #[test]
    fn empty_registry_lists_nothing() {
        let out = handle_tools_list(RequestId::Number(1), &ToolRegistry::new());
        let JsonRpcOutput::Success(resp) = out else {
            panic!("expected success");
        };
        assert_eq!(resp.result["tools"].as_array().expect("array").len(), 0);
        assert!(resp.result.get("nextCursor").is_none());
    }

    #[test]
    fn lists_in_registration_order_with_schema() {
        let mut reg = ToolRegistry::new();
        reg.register(
            ToolDescriptor::new(
                "second",
                "registered first",
                &[ToolArgument::required_string("path", "a path")],
            ),
            Noop,
        )
        .expect("register");
        reg.register(ToolDescriptor::new("first", "registered second", &[]), Noop)
            .expect("register");

        let JsonRpcOutput::Success(resp) = handle_tools_list(RequestId::Number(2), &reg) else {
            panic!("expected success");
        };
        let tools = resp.result["tools"].as_array().expect("array");
        assert_eq!(tools[0]["name"], "second");
        assert_eq!(tools[1]["name"], "first");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "path");
        assert_eq!(tools[0]["description"], "registered first");
    }
}
