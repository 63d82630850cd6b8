//! `write_file`: creates or overwrites a sandboxed file.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use burrow_sandbox::SandboxGuard;
use burrow_types::ToolError;

use super::FileLimits;
use crate::descriptor::{ToolArgument, ToolDescriptor};
use crate::registry::{parse_arguments, ToolHandler, ToolOutput};

/// Tool name.
pub const NAME: &str = "write_file";

/// Returns the `write_file` descriptor.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Creates a new file or completely overwrites an existing file inside an allowed directory.",
        &[
            ToolArgument::required_string("path", "Path of the file to write"),
            ToolArgument::required_string("content", "Text content to write"),
        ],
    )
}

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    path: String,
    content: String,
}

/// Writes whole files; identical arguments always yield identical bytes.
#[derive(Debug, Clone)]
pub struct WriteFile {
    guard: Arc<SandboxGuard>,
    limits: FileLimits,
}

impl WriteFile {
    /// Creates the handler.
    pub fn new(guard: Arc<SandboxGuard>, limits: FileLimits) -> Self {
        Self { guard, limits }
    }
}

#[async_trait]
impl ToolHandler for WriteFile {
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: WriteFileArgs = parse_arguments(arguments)?;
        if args.content.len() as u64 > self.limits.max_file_size {
            return Err(ToolError::too_large(format!(
                "content for {} exceeds the maximum file size of {} bytes",
                args.path, self.limits.max_file_size
            )));
        }

        let path = self.guard.authorize(Path::new(&args.path))?;
        if let Ok(meta) = tokio::fs::metadata(&path).await {
            if meta.is_dir() {
                return Err(ToolError::io(format!("{}: is a directory", args.path)));
            }
        }

        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?;
        tracing::debug!(path = %path.display(), bytes = args.content.len(), "wrote file");

        Ok(ToolOutput::text(format!(
            "Successfully wrote {} bytes to {}",
            args.content.len(),
            args.path
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_types::ToolErrorKind;
    use serde_json::json;

    fn setup(max: u64) -> (tempfile::TempDir, WriteFile) {
        let dir = tempfile::tempdir().expect("tempdir");
        let guard = Arc::new(SandboxGuard::new([dir.path()]).expect("guard"));
        (dir, WriteFile::new(guard, FileLimits { max_file_size: max }))
    }

    #[tokio::test]
    async fn creates_file() {
        let (dir, tool) = setup(1024);
        let target = dir.path().join("new.txt");
        let out = tool
            .call(json!({"path": target.to_string_lossy(), "content": "hello"}))
            .await
            .expect("write");
        assert!(out.text.contains("5 bytes"));
        assert_eq!(std::fs::read_to_string(&target).expect("read"), "hello");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let (dir, tool) = setup(1024);
        let target = dir.path().join("f.txt");
        std::fs::write(&target, "old content that is longer").expect("seed");
        tool.call(json!({"path": target.to_string_lossy(), "content": "new"}))
            .await
            .expect("write");
        assert_eq!(std::fs::read_to_string(&target).expect("read"), "new");
    }

    #[tokio::test]
    async fn content_over_limit_is_too_large() {
        let (dir, tool) = setup(2);
        let target = dir.path().join("f.txt");
        let err = tool
            .call(json!({"path": target.to_string_lossy(), "content": "abc"}))
            .await
            .expect_err("too large");
        assert_eq!(err.kind, ToolErrorKind::TooLarge);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn directory_target_is_io_failure() {
        let (dir, tool) = setup(1024);
        let err = tool
            .call(json!({"path": dir.path().to_string_lossy(), "content": "x"}))
            .await
            .expect_err("dir");
        assert_eq!(err.kind, ToolErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn missing_parent_is_access_denied() {
        let (dir, tool) = setup(1024);
        let target = dir.path().join("no/such/dir/f.txt");
        let err = tool
            .call(json!({"path": target.to_string_lossy(), "content": "x"}))
            .await
            .expect_err("denied");
        assert_eq!(err.kind, ToolErrorKind::AccessDenied);
    }
}
