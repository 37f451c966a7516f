//! vlx-worker - native host for the VLX Inventario offline worker.
//!
//! Dispatches lifecycle, fetch, sync and notification events to the worker
//! from the command line, backed by the on-disk cache.

mod host;

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use host::{Command, Host, USAGE};
use vlx_worker_core::WorkerConfig;

/// Log file name prefix inside `<cache dir>/logs`
const LOG_FILE_PREFIX: &str = "vlx-worker.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer on drop.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || matches!(args[0].as_str(), "help" | "-h" | "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    let command = Command::parse(&args)?;

    let config = WorkerConfig::load()?;
    let cache_dir = config.cache_dir()?;
    let _guard = init_tracing(&cache_dir.join("logs"));
    info!(cache = %config.cache_name(), "vlx-worker starting");

    let mut host = Host::new(config, &cache_dir).await?;
    host.run(command).await
}
