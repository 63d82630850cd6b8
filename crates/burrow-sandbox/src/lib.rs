//! # burrow-sandbox
//!
//! Path sandboxing for filesystem capabilities.
//! Deny-by-default: a path is admissible only when its canonical form
//! equals or descends from one of the allow-listed roots.

pub mod error;
pub mod filesystem;

pub use error::SandboxError;
pub use filesystem::SandboxGuard;
