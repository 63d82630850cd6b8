//! `ping`, `prompts/list` and `resources/list`.
//!
//! The server has no prompts or resources; both lists are always empty.

use serde_json::json;

use burrow_protocol::mcp::{PromptsListResult, ResourcesListResult};
use burrow_protocol::{JsonRpcOutput, JsonRpcResponse, RequestId};

use super::to_output;

pub(crate) fn handle_ping(id: RequestId) -> JsonRpcOutput {
    JsonRpcOutput::Success(JsonRpcResponse::success(id, json!({})))
}

pub(crate) fn handle_prompts_list(id: RequestId) -> JsonRpcOutput {
    to_output(id, &PromptsListResult::default())
}

pub(crate) fn handle_resources_list(id: RequestId) -> JsonRpcOutput {
    to_output(id, &ResourcesListResult::default())
}
