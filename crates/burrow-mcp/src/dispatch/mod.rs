//! MCP method dispatch functions.
//!
//! Each sub-module handles one family of MCP methods as free functions,
//! keeping `McpHandler` itself thin (struct + routing only).

pub(crate) mod initialize;
pub(crate) mod lists;
pub(crate) mod tools_call;
pub(crate) mod tools_list;

use serde::Serialize;

use burrow_protocol::{error_codes, JsonRpcErrorResponse, JsonRpcOutput, JsonRpcResponse, RequestId};

/// Serializes `result` into a success response.
pub(crate) fn to_output<T: Serialize>(id: RequestId, result: &T) -> JsonRpcOutput {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcOutput::Success(JsonRpcResponse::success(id, v)),
        Err(e) => error_output(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

pub(crate) fn error_output(id: RequestId, code: i32, message: impl Into<String>) -> JsonRpcOutput {
    JsonRpcOutput::Error(JsonRpcErrorResponse::error(id, code, message))
}
