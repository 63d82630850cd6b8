//! Sandbox-specific error types.

use burrow_types::{DiagnosticError, ToolError};
use thiserror::Error;

/// Errors from the sandbox layer.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The path resolves outside every allowed root, or cannot be resolved.
    #[error("access denied: {path} is outside the allowed roots")]
    AccessDenied { path: String },
    /// None of the configured roots could be used.
    #[error("no usable allowed root among: {}", configured.join(", "))]
    NoUsableRoots { configured: Vec<String> },
}

impl From<SandboxError> for ToolError {
    fn from(e: SandboxError) -> Self {
        match &e {
            SandboxError::AccessDenied { .. } => ToolError::access_denied(e.to_string()),
            SandboxError::NoUsableRoots { .. } => ToolError::internal(e.to_string()),
        }
    }
}

impl DiagnosticError for SandboxError {
    fn hint(&self) -> Option<String> {
        match self {
            Self::AccessDenied { path } => Some(format!(
                "The tool tried to access '{path}' outside its sandbox."
            )),
            Self::NoUsableRoots { configured } if configured.is_empty() => {
                Some("No allowed paths were configured.".into())
            }
            Self::NoUsableRoots { .. } => Some(
                "Every allowed path is missing, unreadable, or not a directory.".into(),
            ),
        }
    }

    fn fix(&self) -> Option<String> {
        match self {
            Self::NoUsableRoots { .. } => Some(
                "Pass an existing directory:\n  burrow --allowed-paths /path/to/project\n\
                 or set it in the config file:\n  [sandbox]\n  allowed_paths = [\"/path/to/project\"]"
                    .into(),
            ),
            Self::AccessDenied { .. } => None,
        }
    }
}
