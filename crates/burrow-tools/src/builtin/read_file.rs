//! `read_file`: returns the full text of a sandboxed file.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use burrow_sandbox::SandboxGuard;
use burrow_types::ToolError;

use super::{FileLimits, PathArgs};
use crate::descriptor::{ToolArgument, ToolDescriptor};
use crate::registry::{parse_arguments, ToolHandler, ToolOutput};

/// Tool name.
pub const NAME: &str = "read_file";

/// Returns the `read_file` descriptor.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Reads the complete contents of a UTF-8 text file inside an allowed directory.",
        &[ToolArgument::required_string(
            "path",
            "Path of the file to read",
        )],
    )
}

/// Reads whole files, bounded by `FileLimits::max_file_size`.
#[derive(Debug, Clone)]
pub struct ReadFile {
    guard: Arc<SandboxGuard>,
    limits: FileLimits,
}

impl ReadFile {
    /// Creates the handler.
    pub fn new(guard: Arc<SandboxGuard>, limits: FileLimits) -> Self {
        Self { guard, limits }
    }

    fn too_large(&self, path: &str) -> ToolError {
        ToolError::too_large(format!(
            "{path} exceeds the maximum file size of {} bytes",
            self.limits.max_file_size
        ))
    }
}

#[async_trait]
impl ToolHandler for ReadFile {
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: PathArgs = parse_arguments(arguments)?;
        let path = self.guard.authorize(Path::new(&args.path))?;
        let max = self.limits.max_file_size;

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?;
        if meta.is_dir() {
            return Err(ToolError::io(format!("{}: is a directory", args.path)));
        }
        if meta.len() > max {
            return Err(self.too_large(&args.path));
        }

        // The file may grow between metadata and read; read one byte past
        // the limit so growth is reported instead of truncated.
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?;
        let mut buf = Vec::with_capacity(usize::try_from(meta.len()).unwrap_or(0));
        file.take(max.saturating_add(1))
            .read_to_end(&mut buf)
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?;
        if buf.len() as u64 > max {
            return Err(self.too_large(&args.path));
        }

        let text = String::from_utf8(buf)
            .map_err(|_| ToolError::io(format!("{}: not valid UTF-8 text", args.path)))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "read file");
        Ok(ToolOutput::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_types::ToolErrorKind;
    use serde_json::json;

    fn setup(max: u64) -> (tempfile::TempDir, ReadFile) {
        let dir = tempfile::tempdir().expect("tempdir");
        let guard = Arc::new(SandboxGuard::new([dir.path()]).expect("guard"));
        let tool = ReadFile::new(guard, FileLimits { max_file_size: max });
        (dir, tool)
    }

    fn arg(dir: &tempfile::TempDir, name: &str) -> Value {
        json!({"path": dir.path().join(name).to_string_lossy()})
    }

    #[tokio::test]
    async fn reads_text() {
        let (dir, tool) = setup(1024);
        std::fs::write(dir.path().join("a.txt"), "hello").expect("write");
        let out = tool.call(arg(&dir, "a.txt")).await.expect("read");
        assert_eq!(out.text, "hello");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (dir, tool) = setup(1024);
        let err = tool.call(arg(&dir, "nope.txt")).await.expect_err("missing");
        assert_eq!(err.kind, ToolErrorKind::NotFound);
    }

    #[tokio::test]
    async fn oversized_file_is_too_large() {
        let (dir, tool) = setup(4);
        std::fs::write(dir.path().join("big.txt"), "12345").expect("write");
        let err = tool.call(arg(&dir, "big.txt")).await.expect_err("too large");
        assert_eq!(err.kind, ToolErrorKind::TooLarge);
    }

    #[tokio::test]
    async fn file_at_exact_limit_is_read() {
        let (dir, tool) = setup(5);
        std::fs::write(dir.path().join("edge.txt"), "12345").expect("write");
        let out = tool.call(arg(&dir, "edge.txt")).await.expect("read");
        assert_eq!(out.text, "12345");
    }

    #[tokio::test]
    async fn directory_is_io_failure() {
        let (dir, tool) = setup(1024);
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let err = tool.call(arg(&dir, "sub")).await.expect_err("dir");
        assert_eq!(err.kind, ToolErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn binary_content_is_io_failure() {
        let (dir, tool) = setup(1024);
        std::fs::write(dir.path().join("bin"), [0xff, 0xfe, 0x00]).expect("write");
        let err = tool.call(arg(&dir, "bin")).await.expect_err("binary");
        assert_eq!(err.kind, ToolErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn outside_root_is_access_denied() {
        let (_dir, tool) = setup(1024);
        let other = tempfile::tempdir().expect("other");
        std::fs::write(other.path().join("s.txt"), "secret").expect("write");
        let err = tool
            .call(json!({"path": other.path().join("s.txt").to_string_lossy()}))
            .await
            .expect_err("denied");
        assert_eq!(err.kind, ToolErrorKind::AccessDenied);
    }
}
