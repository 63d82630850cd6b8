//! Capability registry and built-in tools for the burrow MCP server.
//!
//! A [`ToolRegistry`] maps tool names to a [`ToolDescriptor`] (advertised in
//! `tools/list`) and a [`ToolHandler`] (invoked by `tools/call`). The
//! [`builtin`] module provides the greeting and filesystem tools.

pub mod builtin;
pub mod descriptor;
pub mod registry;

pub use builtin::{builtin_registry, register_builtin_tools, FileLimits};
pub use descriptor::{ToolArgument, ToolDescriptor};
pub use registry::{
    parse_arguments, RegisteredTool, RegistryError, ToolHandler, ToolOutput, ToolRegistry,
};
