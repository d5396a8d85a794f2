/// Structured logging to a file.
///
/// The terminal is in raw mode on the alternate screen while the game
/// runs, so log lines never go to stdout/stderr. `RUST_LOG` overrides the
/// configured level.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub fn init(cfg: &LogConfig) -> anyhow::Result<()> {
    if let Some(dir) = cfg.file.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .with_context(|| format!("opening log file {}", cfg.file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    tracing::info!(file = %cfg.file.display(), "logging started");
    Ok(())
}
