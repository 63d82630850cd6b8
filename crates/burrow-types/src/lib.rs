//! # burrow-types
//!
//! Domain types shared across the burrow crates.
//! This crate contains pure data types with no I/O
//! (serde is its only dependency).

pub mod error;

pub use error::{DiagnosticError, ToolError, ToolErrorKind};
