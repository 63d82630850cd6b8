//! # burrow-transport-stdio
//!
//! Stdio transport adapter for MCP JSON-RPC communication.
//!
//! Provides line-delimited JSON transport over stdin/stdout,
//! and a server loop that ties it together.

pub mod error;
pub mod server;
pub mod transport;

pub use error::TransportError;
// McpHandler lives in burrow-mcp (APPLICATION layer); re-exported for convenience.
pub use burrow_mcp::{HandlerOptions, JsonRpcOutput, McpHandler};
pub use server::{McpServer, ServerOptions, DEFAULT_MAX_CONCURRENT_CALLS};
pub use transport::{FrameReader, FrameWriter, StdioTransport, DEFAULT_MAX_FRAME_LEN};
