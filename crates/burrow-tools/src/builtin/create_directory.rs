//! `create_directory`: one directory level inside an allowed root.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use burrow_sandbox::SandboxGuard;
use burrow_types::ToolError;

use super::PathArgs;
use crate::descriptor::{ToolArgument, ToolDescriptor};
use crate::registry::{parse_arguments, ToolHandler, ToolOutput};

/// Tool name.
pub const NAME: &str = "create_directory";

/// Returns the `create_directory` descriptor.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Creates a directory inside an allowed directory. Succeeds if it already exists.",
        &[ToolArgument::required_string(
            "path",
            "Path of the directory to create",
        )],
    )
}

/// Creates directories.
#[derive(Debug, Clone)]
pub struct CreateDirectory {
    guard: Arc<SandboxGuard>,
}

impl CreateDirectory {
    /// Creates the handler.
    pub fn new(guard: Arc<SandboxGuard>) -> Self {
        Self { guard }
    }
}

#[async_trait]
impl ToolHandler for CreateDirectory {
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: PathArgs = parse_arguments(arguments)?;
        let path = self.guard.authorize(Path::new(&args.path))?;

        match tokio::fs::create_dir(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "created directory");
                Ok(ToolOutput::text(format!(
                    "Successfully created directory {}",
                    args.path
                )))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let meta = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| ToolError::from_io(&args.path, &e))?;
                if meta.is_dir() {
                    Ok(ToolOutput::text(format!(
                        "Directory {} already exists",
                        args.path
                    )))
                } else {
                    Err(ToolError::io(format!(
                        "{}: exists and is not a directory",
                        args.path
                    )))
                }
            }
            Err(e) => Err(ToolError::from_io(&args.path, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_types::ToolErrorKind;
    use serde_json::json;

    fn setup() -> (tempfile::TempDir, CreateDirectory) {
        let dir = tempfile::tempdir().expect("tempdir");
        let guard = Arc::new(SandboxGuard::new([dir.path()]).expect("guard"));
        (dir, CreateDirectory::new(guard))
    }

    #[tokio::test]
    async fn creates_and_is_idempotent() {
        let (dir, tool) = setup();
        let target = dir.path().join("new");
        let args = json!({"path": target.to_string_lossy()});
        tool.call(args.clone()).await.expect("first");
        assert!(target.is_dir());
        let again = tool.call(args).await.expect("second");
        assert!(again.text.contains("already exists"));
    }

    #[tokio::test]
    async fn file_in_the_way_is_io_failure() {
        let (dir, tool) = setup();
        let target = dir.path().join("f");
        std::fs::write(&target, "x").expect("write");
        let err = tool
            .call(json!({"path": target.to_string_lossy()}))
            .await
            .expect_err("file");
        assert_eq!(err.kind, ToolErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn nested_missing_parent_is_denied() {
        let (dir, tool) = setup();
        let err = tool
            .call(json!({"path": dir.path().join("a/b").to_string_lossy()}))
            .await
            .expect_err("nested");
        assert_eq!(err.kind, ToolErrorKind::AccessDenied);
    }
}
