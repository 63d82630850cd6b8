//! # burrow-protocol
//!
//! MCP protocol and JSON-RPC 2.0 type definitions, plus the line codec.
//! This crate defines the wire format between an AI client and the
//! burrow server.

pub mod codec;
pub mod jsonrpc;
pub mod mcp;
pub mod schema;

pub use codec::{decode, encode, DecodeError};
pub use jsonrpc::*;
pub use mcp::methods;
