//! Filesystem guard constraining capabilities to allow-listed roots.
//!
//! Every call re-canonicalises the requested path; nothing is cached, and
//! the path handed back is the one the caller must open.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SandboxError;

/// Policy object consulted by every filesystem-backed capability.
///
/// Holds an ordered, immutable set of canonical root directories.
#[derive(Debug, Clone)]
pub struct SandboxGuard {
    roots: Vec<PathBuf>,
}

impl SandboxGuard {
    /// Builds a guard from configured roots, canonicalising each once.
    ///
    /// Roots that cannot be canonicalised or are not directories are
    /// skipped with a warning. Duplicates collapse to their first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::NoUsableRoots` if no root survives.
    pub fn new<I, P>(roots: I) -> Result<Self, SandboxError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut canonical_roots: Vec<PathBuf> = Vec::new();
        let mut configured = Vec::new();

        for root in roots {
            let root = root.as_ref();
            configured.push(root.display().to_string());
            match canonical_root(root) {
                Ok(canonical) => {
                    if !canonical_roots.contains(&canonical) {
                        debug!(root = %canonical.display(), "allowed root");
                        canonical_roots.push(canonical);
                    }
                }
                Err(e) => warn!(root = %root.display(), error = %e, "skipping unusable root"),
            }
        }

        if canonical_roots.is_empty() {
            return Err(SandboxError::NoUsableRoots { configured });
        }
        Ok(Self {
            roots: canonical_roots,
        })
    }

    /// Returns the canonical allowed roots, in configuration order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolves `requested` to a canonical absolute path inside a root.
    ///
    /// Relative paths resolve against the process working directory.
    /// An existing target is canonicalised in full (`.`, `..` and
    /// symlinks). A missing target is admitted only when its parent
    /// canonicalises and its final component is a plain name; this lets
    /// `write_file` create files and `read_file` report `NotFound` without
    /// revealing anything outside the roots.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::AccessDenied` when the canonical path lies
    /// outside every root or cannot be canonicalised.
    pub fn authorize(&self, requested: &Path) -> Result<PathBuf, SandboxError> {
        let denied = || SandboxError::AccessDenied {
            path: requested.display().to_string(),
        };

        if requested.as_os_str().is_empty() {
            return Err(denied());
        }

        let canonical = match std::fs::canonicalize(requested) {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                resolve_missing(requested).ok_or_else(denied)?
            }
            Err(e) => {
                debug!(path = %requested.display(), error = %e, "canonicalization failed");
                return Err(denied());
            }
        };

        if self.contains(&canonical) {
            Ok(canonical)
        } else {
            warn!(
                path = %requested.display(),
                resolved = %canonical.display(),
                "path outside allowed roots"
            );
            Err(denied())
        }
    }

    /// Whether an already canonical path equals or descends from a root.
    pub fn contains(&self, canonical: &Path) -> bool {
        self.roots.iter().any(|root| canonical.starts_with(root))
    }
}

fn canonical_root(root: &Path) -> io::Result<PathBuf> {
    let canonical = std::fs::canonicalize(root)?;
    if !canonical.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "allowed root is not a directory",
        ));
    }
    Ok(canonical)
}

/// Canonicalises the parent of a missing target and re-attaches the name.
fn resolve_missing(requested: &Path) -> Option<PathBuf> {
    let name = match requested.components().next_back()? {
        Component::Normal(name) => name,
        _ => return None,
    };

    let parent = match requested.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let candidate = std::fs::canonicalize(parent).ok()?.join(name);

    // A dangling symlink also reports NotFound; following it on write
    // would escape the parent directory.
    if std::fs::symlink_metadata(&candidate).is_ok() {
        return None;
    }
    Some(candidate)
}
