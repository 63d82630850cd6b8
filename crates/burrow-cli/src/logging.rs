//! Tracing initialisation. Logs always go to stderr; stdout carries protocol frames only.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use burrow_config::{LogFormat, LoggingConfig};

/// Picks the filter directive: `-v` counts win over the configured level.
fn directive(configured: &str, verbose: u8) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces the directive.
///
/// # Errors
///
/// Returns an error if the directive is not a valid filter or a subscriber
/// is already installed.
pub fn init(config: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive(&config.level, verbose))
            .map_err(|e| anyhow::anyhow!("invalid log level '{}': {e}", config.level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init(),
        LogFormat::Plain => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("logging init error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_used_without_verbose() {
        assert_eq!(directive("warn", 0), "warn");
    }

    #[test]
    fn verbose_count_overrides() {
        assert_eq!(directive("warn", 1), "debug");
        assert_eq!(directive("warn", 3), "trace");
    }
}
