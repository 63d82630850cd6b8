//! Capability registry: tool name to descriptor and handler.
//!
//! The registry is built mutably during startup and then moved behind an
//! `Arc` into the dispatcher, after which no registration is possible.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use burrow_types::ToolError;

use crate::descriptor::ToolDescriptor;

/// Errors returned by registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("duplicate tool name: {name}")]
    DuplicateName { name: String },
    /// No tool with this name is registered.
    #[error("tool not found: {name}")]
    NotFound { name: String },
}

/// Successful tool payload: text plus optional structured content.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Text content returned to the model.
    pub text: String,
    /// Machine-readable payload.
    pub structured: Option<Value>,
}

impl ToolOutput {
    /// Text-only output.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: None,
        }
    }

    /// Attaches a structured payload.
    pub fn with_structured(mut self, structured: Value) -> Self {
        self.structured = Some(structured);
        self
    }
}

/// A capability implementation.
///
/// Handlers return either a success payload or a tool-level error, never
/// both. Panics are contained by the dispatcher.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Invokes the tool with its (schema-checked) arguments.
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError>;
}

/// Deserializes tool arguments, mapping failures to `InvalidArguments`.
///
/// # Errors
///
/// Returns `ToolError` with kind `InvalidArguments` when `arguments` does
/// not match `T`.
pub fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::invalid_arguments(format!("invalid arguments: {e}")))
}

/// A registered tool: its descriptor and shared handler.
#[derive(Clone)]
pub struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    /// The tool's descriptor.
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// A shared handle to the tool's handler.
    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.descriptor.name)
            .finish_non_exhaustive()
    }
}

/// Ordered name-to-tool map.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is taken; the
    /// existing registration is left untouched.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateName {
                name: descriptor.name,
            });
        }
        tracing::debug!(tool = %descriptor.name, "registered tool");
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    /// Looks up a tool by name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for unknown names.
    pub fn resolve(&self, name: &str) -> Result<&RegisteredTool, RegistryError> {
        self.index
            .get(name)
            .and_then(|&i| self.tools.get(i))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
