//! # burrow-config
//!
//! Configuration management for burrow.
//! Supports layered config: defaults -> file -> env vars -> CLI flags.

pub mod loader;
pub mod schema;
pub mod size;

pub use loader::{figment, load_config, CliOverrides, ConfigError, ENV_PREFIX};
pub use schema::{BurrowConfig, LogFormat, LoggingConfig, SandboxConfig, ServerConfig};
pub use size::{parse_size, ByteSize};
