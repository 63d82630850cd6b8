//! Wiring: configuration → sandbox → tool registry → MCP server on stdio.

use std::path::Path;
use std::sync::Arc;

use burrow_config::{load_config, BurrowConfig, CliOverrides};
use burrow_mcp::{HandlerOptions, McpHandler};
use burrow_sandbox::SandboxGuard;
use burrow_tools::{builtin_registry, FileLimits};
use burrow_transport_stdio::{McpServer, ServerOptions, StdioTransport};
use burrow_types::DiagnosticError;

/// Prints the cause and fix of a startup error, then wraps it for `main`.
fn report<E: DiagnosticError + std::fmt::Display>(context: &str, e: E) -> anyhow::Error {
    if let Some(hint) = e.hint() {
        eprintln!("\n  Cause: {hint}");
    }
    if let Some(fix) = e.fix() {
        eprintln!("  Fix:   {fix}\n");
    }
    anyhow::anyhow!("{context}: {e}")
}

/// Loads the layered configuration.
///
/// # Errors
///
/// Returns the configuration error after printing its diagnostic.
pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> anyhow::Result<BurrowConfig> {
    load_config(config_path, cli).map_err(|e| report("configuration failed", e))
}

/// Builds the request handler: sandbox, built-in tools and call timeout.
///
/// # Errors
///
/// Fails when no allowed root is usable or a tool name collides.
pub fn build_handler(config: &BurrowConfig) -> anyhow::Result<McpHandler> {
    let guard = SandboxGuard::new(&config.sandbox.allowed_paths)
        .map_err(|e| report("sandbox setup failed", e))?;
    for root in guard.roots() {
        tracing::info!(root = %root.display(), "allowed root");
    }

    let limits = FileLimits {
        max_file_size: config.sandbox.max_file_size.bytes(),
    };
    let registry = builtin_registry(Arc::new(guard), limits)
        .map_err(|e| anyhow::anyhow!("tool registration failed: {e}"))?;

    Ok(McpHandler::new(
        Arc::new(registry),
        HandlerOptions {
            call_timeout: config.server.call_timeout(),
        },
    ))
}

/// Largest accepted input line: a `write_file` payload of `max_file_size`
/// bytes may grow sixfold when JSON-escaped (`\u0000`), plus the envelope.
fn frame_limit(max_file_size: u64) -> usize {
    let limit = max_file_size.saturating_mul(6).saturating_add(1024 * 1024);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Serves MCP on stdin/stdout until EOF or Ctrl-C.
///
/// # Errors
///
/// Returns startup errors and unrecoverable transport errors.
pub async fn execute(config: &BurrowConfig) -> anyhow::Result<()> {
    let handler = build_handler(config)?;
    let tools = handler.registry().len();

    let transport = StdioTransport::new(tokio::io::stdin(), tokio::io::stdout())
        .with_max_frame_len(frame_limit(config.sandbox.max_file_size.bytes()));
    let server = McpServer::new(transport, handler).with_options(ServerOptions {
        max_concurrent_calls: config.server.max_concurrent_calls,
    });

    tracing::info!(
        tools,
        max_concurrent_calls = config.server.max_concurrent_calls,
        "burrow MCP server ready on stdio"
    );

    server
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            } else {
                std::future::pending::<()>().await;
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    tracing::info!("burrow MCP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_mcp::SessionState;

    fn config_with_roots(roots: Vec<std::path::PathBuf>) -> BurrowConfig {
        let mut config = BurrowConfig::default();
        config.sandbox.allowed_paths = roots;
        config
    }

    #[test]
    fn handler_registers_builtin_tools() {
        let dir = tempfile::tempdir().expect("tempdir");
        let handler =
            build_handler(&config_with_roots(vec![dir.path().to_path_buf()])).expect("handler");
        assert_eq!(handler.registry().len(), 5);
        assert_eq!(handler.session().state(), SessionState::Uninitialized);
    }

    #[test]
    fn frame_limit_scales_with_file_size() {
        assert_eq!(frame_limit(0), 1024 * 1024);
        assert_eq!(frame_limit(10), 60 + 1024 * 1024);
        assert!(frame_limit(10 * 1024 * 1024) > 60 * 1024 * 1024);
        assert_eq!(frame_limit(u64::MAX), usize::MAX);
    }

    #[test]
    fn no_roots_is_a_startup_error() {
        let err = build_handler(&config_with_roots(Vec::new())).expect_err("no roots");
        assert!(err.to_string().contains("sandbox setup failed"));
    }

    #[test]
    fn missing_roots_are_a_startup_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gone = dir.path().join("does-not-exist");
        assert!(build_handler(&config_with_roots(vec![gone])).is_err());
    }

    #[test]
    fn missing_config_file_reports_error() {
        let err = load(Some(Path::new("/nonexistent/burrow.toml")), &CliOverrides::default())
            .expect_err("missing file");
        assert!(err.to_string().contains("configuration failed"));
    }
}
