//! JSON-RPC 2.0 types for MCP transport.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only protocol version marker accepted on the wire.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Request ID.
    pub id: RequestId,
    /// Method name.
    pub method: String,
    /// Optional parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 success response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Request ID (matches the request).
    pub id: RequestId,
    /// Result value.
    pub result: Value,
}

/// JSON-RPC 2.0 error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Request ID (matches the request).
    pub id: RequestId,
    /// Error details.
    pub error: JsonRpcError,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data. A present `null` is kept as `Some(Null)`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub data: Option<Value>,
}

/// Called only when the field is present, so `null` stays distinguishable
/// from an absent field.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcError {
    /// Creates an error object without data.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Request ID can be a number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric ID.
    Number(i64),
    /// Numeric ID above `i64::MAX`.
    Unsigned(u64),
    /// String ID.
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// JSON-RPC 2.0 notification (no id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Optional parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A response: exactly one of success or error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcOutput {
    /// Successful result.
    Success(JsonRpcResponse),
    /// Error result.
    Error(JsonRpcErrorResponse),
}

impl JsonRpcOutput {
    /// The id this response answers.
    pub fn id(&self) -> &RequestId {
        match self {
            Self::Success(r) => &r.id,
            Self::Error(e) => &e.id,
        }
    }

    /// Returns the error object, if this is an error response.
    pub fn error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Success(_) => None,
            Self::Error(e) => Some(&e.error),
        }
    }

    /// Serializes this response to a single JSON line (without newline).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Any message that can cross the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// A call expecting exactly one response.
    Request(JsonRpcRequest),
    /// A call that receives no response.
    Notification(JsonRpcNotification),
    /// A response to an earlier request.
    Response(JsonRpcOutput),
}

/// Standard JSON-RPC error codes, plus the server-defined range.
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// A method other than `initialize` arrived before the handshake completed.
    pub const NOT_INITIALIZED: i32 = -32002;
    /// The session is draining after end-of-stream.
    pub const SHUTTING_DOWN: i32 = -32003;
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC 2.0 request.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcNotification {
    /// Creates a new JSON-RPC 2.0 notification.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcResponse {
    /// Creates a success response.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcErrorResponse {
    /// Creates an error response.
    pub fn error(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self::from_error(id, JsonRpcError::new(code, message))
    }

    /// Wraps an existing error object.
    pub fn from_error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_serializes_without_tag() {
        let out = JsonRpcOutput::Success(JsonRpcResponse::success(
            RequestId::Number(7),
            json!({"ok": true}),
        ));
        let s = out.to_json().expect("ser");
        assert_eq!(s, r#"{"jsonrpc":"2.0","id":7,"result":{"ok":true}}"#);
    }

    #[test]
    fn output_exposes_id_and_error() {
        let out = JsonRpcOutput::Error(JsonRpcErrorResponse::error(
            RequestId::String("a".into()),
            error_codes::METHOD_NOT_FOUND,
            "nope",
        ));
        assert_eq!(out.id(), &RequestId::String("a".into()));
        assert_eq!(out.error().map(|e| e.code), Some(-32601));
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId::Number(3).to_string(), "3");
        assert_eq!(RequestId::String("x".into()).to_string(), "\"x\"");
    }

    #[test]
    fn error_with_data_serializes_data() {
        let err = JsonRpcError::new(error_codes::INTERNAL_ERROR, "boom")
            .with_data(json!({"tool": "read_file"}));
        let s = serde_json::to_string(&err).expect("ser");
        assert!(s.contains("\"data\":{\"tool\":\"read_file\"}"));
    }
}
