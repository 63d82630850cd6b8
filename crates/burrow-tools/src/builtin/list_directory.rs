//! `list_directory`: entries of a sandboxed directory, sorted by name.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use burrow_sandbox::SandboxGuard;
use burrow_types::ToolError;

use super::PathArgs;
use crate::descriptor::{ToolArgument, ToolDescriptor};
use crate::registry::{parse_arguments, ToolHandler, ToolOutput};

/// Tool name.
pub const NAME: &str = "list_directory";

/// Returns the `list_directory` descriptor.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Lists the entries of a directory inside an allowed directory, sorted by name.",
        &[ToolArgument::required_string(
            "path",
            "Path of the directory to list",
        )],
    )
}

/// Kind of a directory entry. Symlinks are reported as such, not followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Other,
}

/// One listed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// Lists directories.
#[derive(Debug, Clone)]
pub struct ListDirectory {
    guard: Arc<SandboxGuard>,
}

impl ListDirectory {
    /// Creates the handler.
    pub fn new(guard: Arc<SandboxGuard>) -> Self {
        Self { guard }
    }
}

#[async_trait]
impl ToolHandler for ListDirectory {
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: PathArgs = parse_arguments(arguments)?;
        let path = self.guard.authorize(Path::new(&args.path))?;

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?;
        if !meta.is_dir() {
            return Err(ToolError::not_a_directory(format!(
                "{} is not a directory",
                args.path
            )));
        }

        let mut reader = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::from_io(&args.path, &e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ToolError::from_io(&args.path, &e))?;
            let entry_type = if file_type.is_symlink() {
                EntryType::Symlink
            } else if file_type.is_dir() {
                EntryType::Directory
            } else if file_type.is_file() {
                EntryType::File
            } else {
                EntryType::Other
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                entry_type,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let structured = serde_json::json!({
            "directory": args.path,
            "entries": entries,
        });
        Ok(ToolOutput::text(render(&args.path, &entries)).with_structured(structured))
    }
}

fn render(path: &str, entries: &[DirEntry]) -> String {
    let dirs: Vec<&DirEntry> = entries
        .iter()
        .filter(|e| e.entry_type == EntryType::Directory)
        .collect();
    let others: Vec<&DirEntry> = entries
        .iter()
        .filter(|e| e.entry_type != EntryType::Directory)
        .collect();

    let mut out = format!("Directory: {path}\n\nFiles ({}):\n", others.len());
    for e in &others {
        match e.entry_type {
            EntryType::Symlink => out.push_str(&format!("  {} (symlink)\n", e.name)),
            _ => out.push_str(&format!("  {}\n", e.name)),
        }
    }
    out.push_str(&format!("\nDirectories ({}):\n", dirs.len()));
    for e in &dirs {
        out.push_str(&format!("  {}/\n", e.name));
    }
    out
}
