//! # burrow-mcp
//!
//! MCP method dispatch (APPLICATION layer).
//!
//! [`Session`] tracks the handshake lifecycle; [`McpHandler`] admits each
//! request against it and routes to the `initialize`, `tools/*` and listing
//! implementations.

mod dispatch;
pub mod handler;
pub mod session;

pub use burrow_protocol::JsonRpcOutput;
pub use dispatch::initialize::SERVER_NAME;
pub use handler::{HandlerOptions, McpHandler, DEFAULT_CALL_TIMEOUT};
pub use session::{Negotiated, Session, SessionError, SessionState};
