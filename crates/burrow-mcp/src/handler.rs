//! `McpHandler`: session check, then routing to a dispatch function.

use std::sync::Arc;
use std::time::Duration;

use burrow_protocol::mcp::methods;
use burrow_protocol::{
    error_codes, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcOutput, JsonRpcRequest,
    RequestId,
};
use burrow_tools::ToolRegistry;

use crate::dispatch::{error_output, initialize, lists, tools_call, tools_list};
use crate::session::{Session, SessionState};

/// Default per-call timeout for tool handlers.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Upper bound on a single `tools/call`; exceeding it is an `IOFailure`.
    pub call_timeout: Duration,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Routes JSON-RPC requests to MCP method implementations.
///
/// Cheap to clone: the registry and session are shared.
#[derive(Debug, Clone)]
pub struct McpHandler {
    registry: Arc<ToolRegistry>,
    session: Arc<Session>,
    options: HandlerOptions,
}

impl McpHandler {
    /// Creates a handler with a fresh session.
    pub fn new(registry: Arc<ToolRegistry>, options: HandlerOptions) -> Self {
        Self::with_session(registry, Arc::new(Session::new()), options)
    }

    /// Creates a handler around an existing session.
    pub fn with_session(
        registry: Arc<ToolRegistry>,
        session: Arc<Session>,
        options: HandlerOptions,
    ) -> Self {
        Self {
            registry,
            session,
            options,
        }
    }

    /// The session this handler enforces.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Whether requests for `method` may run concurrently with later input.
    ///
    /// Lifecycle and listing methods must be handled in arrival order.
    pub fn runs_concurrently(method: &str) -> bool {
        method == methods::TOOLS_CALL
    }

    /// Checks the request against the session state.
    ///
    /// # Errors
    ///
    /// Returns the ready-to-send error response when the method is not
    /// legal in the current state.
    pub fn admit(&self, request: &JsonRpcRequest) -> Result<(), JsonRpcOutput> {
        self.session.admit(&request.method).map_err(|e| {
            tracing::debug!(method = %request.method, id = %request.id, error = %e, "request rejected");
            JsonRpcOutput::Error(JsonRpcErrorResponse::from_error(
                request.id.clone(),
                e.to_rpc_error(),
            ))
        })
    }

    /// Admits and handles a request, returning exactly one response.
    pub async fn dispatch(&self, request: &JsonRpcRequest) -> JsonRpcOutput {
        if let Err(rejection) = self.admit(request) {
            return rejection;
        }
        self.execute(request).await
    }

    /// Handles an already admitted request.
    pub async fn execute(&self, request: &JsonRpcRequest) -> JsonRpcOutput {
        self.route(request.id.clone(), &request.method, &request.params)
            .await
    }

    async fn route(
        &self,
        id: RequestId,
        method: &str,
        params: &Option<serde_json::Value>,
    ) -> JsonRpcOutput {
        match method {
            methods::INITIALIZE => initialize::handle_initialize(id, params, &self.session),
            methods::PING => lists::handle_ping(id),
            methods::TOOLS_LIST => tools_list::handle_tools_list(id, &self.registry),
            methods::TOOLS_CALL => {
                tools_call::handle_tools_call(id, params, &self.registry, self.options.call_timeout)
                    .await
            }
            methods::PROMPTS_LIST => lists::handle_prompts_list(id),
            methods::RESOURCES_LIST => lists::handle_resources_list(id),
            other => error_output(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("unknown method: {other}"),
            ),
        }
    }

    /// Handles a notification. Nothing is ever sent back.
    ///
    /// Protocol notifications are logged; a request method sent without an
    /// id is admitted and executed like a request, and its result dropped.
    pub async fn handle_notification(&self, notification: &JsonRpcNotification) {
        match notification.method.as_str() {
            methods::NOTIFICATIONS_INITIALIZED => match self.session.state() {
                SessionState::Uninitialized | SessionState::Initializing => {
                    tracing::warn!("initialized notification before initialize, ignoring");
                }
                state => tracing::debug!(%state, "client confirmed initialization"),
            },
            methods::NOTIFICATIONS_CANCELLED => {
                let request_id = notification
                    .params
                    .as_ref()
                    .and_then(|p| p.get("requestId"))
                    .cloned();
                tracing::debug!(?request_id, "client cancelled a request");
            }
            method if method.starts_with("notifications/") => {
                tracing::debug!(%method, "ignoring unknown notification");
            }
            method => {
                if let Err(e) = self.session.admit(method) {
                    tracing::warn!(%method, error = %e, "notification rejected");
                    return;
                }
                let output = self
                    .route(RequestId::Number(0), method, &notification.params)
                    .await;
                if let Some(error) = output.error() {
                    tracing::debug!(%method, code = error.code, "notification failed, result dropped");
                }
            }
        }
    }
}
