//! burrow - sandboxed filesystem MCP server over stdio.

use std::path::PathBuf;

use clap::Parser;

use burrow_config::{parse_size, CliOverrides, LogFormat};

mod logging;
mod serve;

/// burrow - serve filesystem tools to an MCP client, confined to allowed roots.
#[derive(Debug, Parser)]
#[command(name = "burrow", version, about)]
struct Cli {
    /// Directories the tools may touch. Replaces `sandbox.allowed_paths`.
    #[arg(long, num_args = 1..)]
    allowed_paths: Vec<PathBuf>,

    /// Configuration file (.toml, .yaml, .yml or .json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Largest file read or written, e.g. 4096, 512K, 10MB.
    #[arg(long, value_parser = parse_max_file_size)]
    max_file_size: Option<u64>,

    /// Log filter directive (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format: plain or json (for log aggregation).
    #[arg(long, value_parser = ["plain", "json"])]
    log_format: Option<String>,

    /// Verbosity level (-v, -vv). Takes precedence over the configured level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            allowed_paths: self.allowed_paths.clone(),
            max_file_size: self.max_file_size,
            log_level: self.log_level.clone(),
            log_format: self.log_format.as_deref().map(|f| match f {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            }),
        }
    }
}

fn parse_max_file_size(value: &str) -> Result<u64, String> {
    parse_size(value).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = serve::load(cli.config.as_deref(), &cli.overrides())?;
    logging::init(&config.logging, cli.verbose)?;

    tracing::debug!(config = ?cli.config, "burrow starting");

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(serve::execute(&config));
    // A pending stdin read cannot be cancelled; do not wait for it.
    runtime.shutdown_background();
    result
}
