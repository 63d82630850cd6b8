//! Message codec: raw line bytes to typed JSON-RPC messages and back.
//!
//! `decode` validates the envelope by hand rather than through serde's
//! untagged matching so that a partially valid request can still report
//! its `id` in the error response.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::jsonrpc::{
    error_codes, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcOutput,
    JsonRpcRequest, JsonRpcResponse, Message, RequestId, JSONRPC_VERSION,
};

/// Why a frame could not be decoded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The bytes are not valid JSON.
    #[error("parse error: {message}")]
    Syntax { message: String },
    /// Valid JSON, but not a valid JSON-RPC 2.0 envelope.
    ///
    /// `id` is set only when the frame looked like a request and its id
    /// could be recovered.
    #[error("invalid request: {message}")]
    InvalidEnvelope {
        id: Option<RequestId>,
        message: String,
    },
}

impl DecodeError {
    /// The recovered request id, if any.
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Syntax { .. } => None,
            Self::InvalidEnvelope { id, .. } => id.as_ref(),
        }
    }

    /// The JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::Syntax { .. } => error_codes::PARSE_ERROR,
            Self::InvalidEnvelope { .. } => error_codes::INVALID_REQUEST,
        }
    }

    /// Builds the error response owed to the peer.
    ///
    /// Returns `None` when no id was recoverable; such input is dropped.
    pub fn to_response(&self) -> Option<JsonRpcErrorResponse> {
        let id = self.id()?.clone();
        Some(JsonRpcErrorResponse::error(id, self.code(), self.to_string()))
    }
}

fn invalid(id: Option<RequestId>, message: impl Into<String>) -> DecodeError {
    DecodeError::InvalidEnvelope {
        id,
        message: message.into(),
    }
}

/// Decodes one frame into a [`Message`].
///
/// # Errors
///
/// Returns `DecodeError::Syntax` for malformed JSON and
/// `DecodeError::InvalidEnvelope` for a missing/unsupported `jsonrpc`
/// marker, a non-string `method`, an `id` that is neither string nor
/// integer, non-structured `params`, or a response with both or neither of
/// `result` and `error`.
pub fn decode(bytes: &[u8]) -> Result<Message, DecodeError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| DecodeError::Syntax {
        message: e.to_string(),
    })?;
    let Value::Object(mut obj) = value else {
        return Err(invalid(None, "message must be a JSON object"));
    };

    let id = match obj.remove("id") {
        None => None,
        Some(raw) => Some(parse_id(raw)?),
    };

    if obj.contains_key("method") {
        decode_call(obj, id)
    } else {
        decode_response(obj, id)
    }
}

/// Encodes a [`Message`] as a single line of JSON (no trailing newline).
///
/// # Errors
///
/// Returns the serializer error; this only happens for values serde_json
/// cannot represent.
pub fn encode(message: &Message) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(message)
}

fn parse_id(raw: Value) -> Result<RequestId, DecodeError> {
    match raw {
        Value::String(s) => Ok(RequestId::String(s)),
        Value::Number(n) => n
            .as_i64()
            .map(RequestId::Number)
            .or_else(|| n.as_u64().map(RequestId::Unsigned))
            .ok_or_else(|| invalid(None, "id must be an integer or a string")),
        _ => Err(invalid(None, "id must be an integer or a string")),
    }
}

fn check_version(obj: &Map<String, Value>, id: &Option<RequestId>) -> Result<(), DecodeError> {
    match obj.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => Ok(()),
        Some(_) => Err(invalid(id.clone(), "unsupported jsonrpc version")),
        None => Err(invalid(id.clone(), "missing jsonrpc version marker")),
    }
}

fn decode_call(
    mut obj: Map<String, Value>,
    id: Option<RequestId>,
) -> Result<Message, DecodeError> {
    check_version(&obj, &id)?;

    let method = match obj.remove("method") {
        Some(Value::String(m)) => m,
        _ => return Err(invalid(id, "method must be a string")),
    };

    let params = match obj.remove("params") {
        None => None,
        Some(p @ (Value::Object(_) | Value::Array(_))) => Some(p),
        Some(_) => return Err(invalid(id, "params must be an object or an array")),
    };

    Ok(match id {
        Some(id) => Message::Request(JsonRpcRequest::new(id, method, params)),
        None => Message::Notification(JsonRpcNotification::new(method, params)),
    })
}

/// Responses are never answered, so failures here never carry an id.
fn decode_response(
    mut obj: Map<String, Value>,
    id: Option<RequestId>,
) -> Result<Message, DecodeError> {
    check_version(&obj, &None)?;

    let Some(id) = id else {
        return Err(invalid(None, "message has neither a method nor an id"));
    };

    match (obj.remove("result"), obj.remove("error")) {
        (Some(result), None) => Ok(Message::Response(JsonRpcOutput::Success(
            JsonRpcResponse::success(id, result),
        ))),
        (None, Some(error)) => {
            let error: JsonRpcError = serde_json::from_value(error)
                .map_err(|e| invalid(None, format!("malformed error object: {e}")))?;
            Ok(Message::Response(JsonRpcOutput::Error(
                JsonRpcErrorResponse::from_error(id, error),
            )))
        }
        (Some(_), Some(_)) => Err(invalid(None, "response carries both result and error")),
        (None, None) => Err(invalid(None, "response carries neither result nor error")),
    }
}
