//! Logging setup: stderr plus a per-session log file.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ClientConfig;

/// Setup logging to both stderr and file.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the program.
pub fn setup_logging(config: &ClientConfig) -> Result<WorkerGuard> {
    let session_id = config
        .session_id
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("session_%Y%m%d_%H%M%S").to_string());

    let session_log_dir = config.log_dir.join(&session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!("Failed to create log directory {}", session_log_dir.display())
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "charsheet.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        session = %session_id,
        log_file = %session_log_dir.join("charsheet.log").display(),
        "logging initialized"
    );
    Ok(guard)
}
