//! Built-in capabilities.
//!
//! Each sub-module exposes one tool as a handler struct plus its
//! `descriptor()`. Filesystem tools share a [`SandboxGuard`] and
//! [`FileLimits`].

pub mod create_directory;
pub mod greeting;
pub mod list_directory;
pub mod read_file;
pub mod write_file;

use std::sync::Arc;

use serde::Deserialize;

use burrow_sandbox::SandboxGuard;

use crate::registry::{RegistryError, ToolRegistry};

pub use create_directory::CreateDirectory;
pub use greeting::Greeting;
pub use list_directory::ListDirectory;
pub use read_file::ReadFile;
pub use write_file::WriteFile;

/// Default cap on file contents read or written, in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Size limits applied by the filesystem tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLimits {
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl Default for FileLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Arguments shared by every single-path tool.
#[derive(Debug, Deserialize)]
pub(crate) struct PathArgs {
    pub path: String,
}

/// Registers every built-in tool, in the order `tools/list` reports them.
///
/// # Errors
///
/// Returns `RegistryError::DuplicateName` if any built-in name is already
/// taken in `registry`.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    guard: Arc<SandboxGuard>,
    limits: FileLimits,
) -> Result<(), RegistryError> {
    registry.register(greeting::descriptor(), Greeting)?;
    registry.register(
        read_file::descriptor(),
        ReadFile::new(Arc::clone(&guard), limits),
    )?;
    registry.register(
        write_file::descriptor(),
        WriteFile::new(Arc::clone(&guard), limits),
    )?;
    registry.register(
        create_directory::descriptor(),
        CreateDirectory::new(Arc::clone(&guard)),
    )?;
    registry.register(list_directory::descriptor(), ListDirectory::new(guard))?;
    Ok(())
}

/// Builds a registry holding only the built-in tools.
///
/// # Errors
///
/// Propagates [`register_builtin_tools`] failures.
pub fn builtin_registry(
    guard: Arc<SandboxGuard>,
    limits: FileLimits,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry, guard, limits)?;
    Ok(registry)
}
