use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file. Logging stays off when it is unset.
pub const LOG_ENV: &str = "GITPICK_LOG";

/// Sends tracing output to the file named by `GITPICK_LOG`, filtered by `RUST_LOG`.
/// The terminal belongs to the selection screen, so nothing is ever logged there.
pub fn init_tracing() -> Result<()> {
    let log_path = match std::env::var(LOG_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => return Ok(()),
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .with(EnvFilter::from_default_env())
        .try_init()
        .map_err(|error| anyhow!("{}", error))?;

    tracing::info!("logging to {}", log_path.display());
    Ok(())
}
