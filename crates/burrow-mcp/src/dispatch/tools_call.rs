//! Handles the `tools/call` MCP method.
//!
//! The handler runs in its own task so a panic or a hang is contained
//! here and never reaches the transport.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::Instrument;

use burrow_protocol::mcp::{ToolsCallParams, ToolsCallResult};
use burrow_protocol::schema::validate_arguments;
use burrow_protocol::{error_codes, JsonRpcOutput, RequestId};
use burrow_tools::ToolRegistry;
use burrow_types::{ToolError, ToolErrorKind};

use super::{error_output, to_output};

/// Handles the `tools/call` request.
pub(crate) async fn handle_tools_call(
    id: RequestId,
    params: &Option<Value>,
    registry: &ToolRegistry,
    call_timeout: Duration,
) -> JsonRpcOutput {
    // 1. Parse params
    let ToolsCallParams { name, arguments } = match params {
        Some(p) => match serde_json::from_value::<ToolsCallParams>(p.clone()) {
            Ok(cp) => cp,
            Err(e) => {
                return error_output(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid tools/call params: {e}"),
                );
            }
        },
        None => {
            return error_output(id, error_codes::INVALID_PARAMS, "tools/call requires params");
        }
    };

    // 2. Resolve the tool
    let tool = match registry.resolve(&name) {
        Ok(tool) => tool,
        Err(e) => return error_output(id, error_codes::INVALID_PARAMS, e.to_string()),
    };

    // 3. Check arguments against the declared schema
    if let Err(e) = validate_arguments(&tool.descriptor().input_schema, &arguments) {
        return tool_failure(id, &ToolError::invalid_arguments(e.to_string()));
    }

    // 4. Execute in an isolated task under the call timeout
    let handler = tool.handler();
    let span = tracing::info_span!("tool_call", tool = %name, id = %id);
    let mut task = tokio::spawn(async move { handler.call(arguments).await }.instrument(span));

    let joined = match tokio::time::timeout(call_timeout, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            task.abort();
            tracing::warn!(tool = %name, %id, timeout_ms = call_timeout.as_millis(), "tool call timed out");
            return tool_failure(
                id,
                &ToolError::io(format!(
                    "{name} timed out after {} ms",
                    call_timeout.as_millis()
                )),
            );
        }
    };

    match joined {
        Ok(Ok(output)) => {
            let mut result = ToolsCallResult::text(output.text);
            if let Some(structured) = output.structured {
                result = result.with_structured(structured);
            }
            to_output(id, &result)
        }
        Ok(Err(e)) if e.is_internal() => {
            tracing::error!(tool = %name, %id, error = %e.message, "tool reported an internal fault");
            error_output(id, error_codes::INTERNAL_ERROR, format!("internal error: {}", e.message))
        }
        Ok(Err(e)) => {
            if e.kind == ToolErrorKind::AccessDenied {
                tracing::warn!(tool = %name, %id, error = %e.message, "sandbox denied access");
            } else {
                tracing::debug!(tool = %name, %id, kind = %e.kind, "tool failed");
            }
            tool_failure(id, &e)
        }
        Err(join_err) => {
            tracing::error!(tool = %name, %id, error = %join_err, "tool handler panicked");
            error_output(
                id,
                error_codes::INTERNAL_ERROR,
                format!("internal error: tool {name} failed unexpectedly"),
            )
        }
    }
}

/// A successful envelope marking the invocation itself as failed.
fn tool_failure(id: RequestId, error: &ToolError) -> JsonRpcOutput {
    let result = ToolsCallResult::failure(
        error.to_string(),
        json!({"kind": error.kind.as_str(), "message": error.message}),
    );
    to_output(id, &result)
}
