//! Handles the `initialize` MCP method.

use serde_json::{json, Value};

use burrow_protocol::mcp::{
    is_supported_version, Implementation, InitializeParams, InitializeResult,
    ListChangedCapability, LoggingCapability, ResourcesCapability, ServerCapabilities,
    SUPPORTED_PROTOCOL_VERSIONS,
};
use burrow_protocol::{error_codes, JsonRpcError, JsonRpcErrorResponse, JsonRpcOutput, RequestId};

use super::{error_output, to_output};
use crate::session::{Negotiated, Session};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "burrow";

const INSTRUCTIONS: &str = "Filesystem tools confined to the server's allowed directories. \
Paths outside those directories are rejected with AccessDenied.";

/// Capabilities advertised to every client.
pub(crate) fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        tools: Some(ListChangedCapability::default()),
        prompts: Some(ListChangedCapability::default()),
        resources: Some(ResourcesCapability::default()),
        logging: Some(LoggingCapability {}),
    }
}

/// Validates the handshake and moves the session to `Ready`, or back to
/// `Uninitialized` on any rejection.
pub(crate) fn handle_initialize(
    id: RequestId,
    params: &Option<Value>,
    session: &Session,
) -> JsonRpcOutput {
    if let Err(e) = session.begin_initialize() {
        return JsonRpcOutput::Error(JsonRpcErrorResponse::from_error(id, e.to_rpc_error()));
    }

    let params = match params {
        Some(p) => match serde_json::from_value::<InitializeParams>(p.clone()) {
            Ok(params) => params,
            Err(e) => {
                session.abort_initialize();
                return error_output(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid initialize params: {e}"),
                );
            }
        },
        None => {
            session.abort_initialize();
            return error_output(id, error_codes::INVALID_PARAMS, "initialize requires params");
        }
    };

    if !is_supported_version(&params.protocol_version) {
        session.abort_initialize();
        tracing::warn!(requested = %params.protocol_version, "unsupported protocol version");
        let error = JsonRpcError::new(
            error_codes::INVALID_PARAMS,
            format!("unsupported protocol version: {}", params.protocol_version),
        )
        .with_data(json!({
            "requested": params.protocol_version,
            "supported": SUPPORTED_PROTOCOL_VERSIONS,
        }));
        return JsonRpcOutput::Error(JsonRpcErrorResponse::from_error(id, error));
    }

    let result = InitializeResult {
        protocol_version: params.protocol_version.clone(),
        capabilities: server_capabilities(),
        server_info: Implementation {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        instructions: Some(INSTRUCTIONS.to_string()),
    };

    let output = to_output(id, &result);
    if output.error().is_some() {
        session.abort_initialize();
        return output;
    }

    session.complete_initialize(Negotiated {
        protocol_version: params.protocol_version,
        client_capabilities: params.capabilities,
        client_info: params.client_info,
    });
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn init_params(version: &str) -> Option<Value> {
        Some(json!({
            "protocolVersion": version,
            "capabilities": {"roots": {}},
            "clientInfo": {"name": "test-client", "version": "0.0.1"}
        }))
    }

    #[test]
    fn echoes_supported_version() {
        let session = Session::new();
        let out = handle_initialize(RequestId::Number(1), &init_params("2024-11-05"), &session);
        let JsonRpcOutput::Success(resp) = out else {
            panic!("expected success");
        };
        assert_eq!(resp.result["protocolVersion"], "2024-11-05");
        assert_eq!(resp.result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(resp.result["capabilities"]["tools"]["listChanged"], false);
        assert!(resp.result["capabilities"]["logging"].is_object());
        assert_eq!(session.state(), SessionState::Ready);

        let negotiated = session.negotiated().expect("negotiated");
        assert!(negotiated.client_capabilities.declares("roots"));
        assert_eq!(
            negotiated.client_info.as_ref().map(|c| c.name.as_str()),
            Some("test-client")
        );
    }

    #[test]
    fn unsupported_version_stays_uninitialized() {
        let session = Session::new();
        let out = handle_initialize(RequestId::Number(2), &init_params("1999-01-01"), &session);
        let err = out.error().expect("error");
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert_eq!(
            err.data.as_ref().expect("data")["supported"],
            json!(SUPPORTED_PROTOCOL_VERSIONS)
        );
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn missing_params_is_invalid() {
        let session = Session::new();
        let out = handle_initialize(RequestId::Number(3), &None, &session);
        assert_eq!(out.error().expect("error").code, error_codes::INVALID_PARAMS);
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn malformed_params_is_invalid() {
        let session = Session::new();
        let out = handle_initialize(
            RequestId::Number(4),
            &Some(json!({"protocolVersion": 123})),
            &session,
        );
        assert_eq!(out.error().expect("error").code, error_codes::INVALID_PARAMS);
        assert_eq!(session.state(), SessionState::Uninitialized);
    }
}
