//! Log output setup.
//!
//! stdout belongs to the dashboard (or to the JSON stream in headless
//! mode), so logs only ever go to a file. Without a log file no subscriber
//! is installed and every `tracing` macro is a no-op.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Send logs to `path`, filtered by `RUST_LOG` (default `info`).
///
/// The returned guard flushes pending lines when dropped; keep it alive
/// until the end of `main`.
pub fn init_file_logging(path: &Path) -> Result<WorkerGuard> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(filter),
        )
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}
