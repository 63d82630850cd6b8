//! Configuration loader (file + env + CLI merge).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use thiserror::Error;

use burrow_types::DiagnosticError;

use crate::schema::{BurrowConfig, LogFormat};

/// Environment variable prefix; nesting uses `__`
/// (`BURROW_SANDBOX__MAX_FILE_SIZE=1MB`).
pub const ENV_PREFIX: &str = "BURROW_";

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to load or merge configuration.
    #[error("configuration error: {0}")]
    Load(String),
    /// The named config file does not exist.
    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    /// The config file extension is not one we can parse.
    #[error("unsupported config format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// A size value could not be parsed.
    #[error("invalid size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },
}

impl DiagnosticError for ConfigError {
    fn hint(&self) -> Option<String> {
        match self {
            Self::Load(_) => Some("a config value has the wrong type or an unknown key".into()),
            Self::FileNotFound { .. } => Some("the --config path does not exist".into()),
            Self::UnsupportedFormat { .. } => {
                Some("config files must end in .toml, .yaml, .yml or .json".into())
            }
            Self::InvalidSize { .. } => Some("sizes are a byte count with an optional unit".into()),
        }
    }

    fn fix(&self) -> Option<String> {
        match self {
            Self::Load(_) => Some(
                "valid sections are [sandbox], [server] and [logging]; \
                 check spelling against the documented keys"
                    .into(),
            ),
            Self::FileNotFound { path } => {
                Some(format!("create {} or drop the --config flag", path.display()))
            }
            Self::UnsupportedFormat { path } => {
                Some(format!("rename {} with a supported extension", path.display()))
            }
            Self::InvalidSize { .. } => Some("use a value such as 4096, 512K, 10MB or 1GiB".into()),
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// Replaces `sandbox.allowed_paths` when non-empty.
    pub allowed_paths: Vec<PathBuf>,
    /// Replaces `sandbox.max_file_size`, in bytes.
    pub max_file_size: Option<u64>,
    /// Replaces `logging.level`.
    pub log_level: Option<String>,
    /// Replaces `logging.format`.
    pub log_format: Option<LogFormat>,
}

/// Builds the layered figment:
/// 1. Default values
/// 2. Config file (if given)
/// 3. Environment variables (`BURROW_` prefix)
/// 4. CLI overrides
///
/// # Errors
///
/// `FileNotFound` or `UnsupportedFormat` for a bad config path.
pub fn figment(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(BurrowConfig::default()));

    if let Some(path) = config_path {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        figment = match ext.as_deref() {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if !cli.allowed_paths.is_empty() {
        figment = figment.merge(Serialized::default(
            "sandbox.allowed_paths",
            &cli.allowed_paths,
        ));
    }
    if let Some(size) = cli.max_file_size {
        figment = figment.merge(Serialized::default("sandbox.max_file_size", size));
    }
    if let Some(level) = &cli.log_level {
        figment = figment.merge(Serialized::default("logging.level", level));
    }
    if let Some(format) = cli.log_format {
        figment = figment.merge(Serialized::default("logging.format", format));
    }

    Ok(figment)
}

/// Loads and validates the merged configuration.
///
/// # Errors
///
/// Any [`figment`] error, or `ConfigError::Load` when the merged values
/// do not fit the schema.
pub fn load_config(
    config_path: Option<&Path>,
    cli: &CliOverrides,
) -> Result<BurrowConfig, ConfigError> {
    let config: BurrowConfig = figment(config_path, cli)?
        .extract()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    tracing::debug!(
        roots = config.sandbox.allowed_paths.len(),
        max_file_size = config.sandbox.max_file_size.bytes(),
        "configuration loaded"
    );
    Ok(config)
}
