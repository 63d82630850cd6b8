//! Tool-level error model shared by every capability.
//!
//! A `ToolError` means "the protocol worked but the operation failed":
//! it travels back to the peer inside a successful `tools/call` result.
//! Only [`ToolError::Internal`] escapes that tier and becomes a protocol
//! error at the dispatcher boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable classification of a failed tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolErrorKind {
    /// The path resolved outside every allowed root.
    AccessDenied,
    /// The target does not exist.
    NotFound,
    /// Reading or writing failed, or the operation timed out.
    #[serde(rename = "IOFailure")]
    IoFailure,
    /// The content exceeds the configured size limit.
    TooLarge,
    /// A directory operation was pointed at a non-directory.
    NotADirectory,
    /// The arguments did not match the tool's input schema.
    InvalidArguments,
    /// Unexpected fault inside the handler.
    Internal,
}

impl ToolErrorKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::NotFound => "NotFound",
            Self::IoFailure => "IOFailure",
            Self::TooLarge => "TooLarge",
            Self::NotADirectory => "NotADirectory",
            Self::InvalidArguments => "InvalidArguments",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed tool invocation: kind plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// The kind of failure.
    pub kind: ToolErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl ToolError {
    /// Creates a new `ToolError`.
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an access-denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::AccessDenied, message)
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    /// Creates an I/O failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::IoFailure, message)
    }

    /// Creates a too-large error.
    pub fn too_large(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::TooLarge, message)
    }

    /// Creates a not-a-directory error.
    pub fn not_a_directory(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotADirectory, message)
    }

    /// Creates an invalid-arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    /// Creates an internal fault.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, message)
    }

    /// Whether this error must be surfaced as a protocol-level internal error.
    pub fn is_internal(&self) -> bool {
        self.kind == ToolErrorKind::Internal
    }

    /// Maps an I/O error on `path` to the matching tool error kind.
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(format!("no such file: {path}")),
            _ => Self::io(format!("{path}: {err}")),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Transforms technical errors into user-actionable diagnostics.
///
/// Implementors provide optional `hint` (cause explanation) and `fix`
/// (concrete remediation step) for each error variant.
pub trait DiagnosticError {
    /// A human-readable explanation of the likely cause.
    fn hint(&self) -> Option<String> {
        None
    }
    /// A concrete fix the user can apply (e.g. a config change).
    fn fix(&self) -> Option<String> {
        None
    }
}
