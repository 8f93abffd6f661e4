//! stderr logging bootstrap for the CLI.
//!
//! stdout carries command output only, so every log record goes to stderr.

use anyhow::{Context, Result};
use flexi_logger::{Logger, LoggerHandle};
use log::info;

/// Starts the logger; `RUST_LOG` wins over `fallback` when it is set.
///
/// The returned handle must stay alive for the lifetime of the process.
pub fn init_logging(explicit: Option<&str>, fallback: &str) -> Result<LoggerHandle> {
    let logger = match explicit {
        Some(level) => Logger::try_with_str(level)
            .with_context(|| format!("invalid log level `{level}`"))?,
        None => Logger::try_with_env_or_str(fallback)
            .with_context(|| format!("invalid log level `{fallback}`"))?,
    };
    let handle = logger
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .context("failed to start logger")?;
    info!(
        "event=app_start module=cli status=ok platform={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}
