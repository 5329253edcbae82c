//! Process-wide tracing bootstrap.

use anyhow::{Context, Result, anyhow};
use core_config::LoggingConfig;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber writing to `directory/file` through a
/// non-blocking appender. `RUST_LOG` wins over the configured filter.
///
/// The returned guard flushes the writer on drop; keep it alive for the
/// lifetime of the process. Fails when a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "creating log directory {}",
            config.directory.display()
        )
    })?;
    let log_path = config.directory.join(&config.file);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("invalid log filter `{}`", config.filter))?;

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("global tracing subscriber already installed")?;

    tracing::info!(target: "runtime.session", path = %log_path.display(), "logging_initialized");
    Ok(guard)
}

/// Route panics through tracing before the default hook runs. Idempotent.
pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}
