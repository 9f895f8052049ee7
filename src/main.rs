//! tempo - a desktop stopwatch and timer
//!
//! This is the main entry point: it initializes logging, loads the
//! configuration, and hands the process to the windowing shell.

use std::time::Duration;

use anyhow::Result;
use tokio::runtime::Runtime;

use tempo_app::config::{load_config, Config};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting tempo {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.apply_env_overrides();

    // Async runtime for network, filesystem, and dialog futures; the
    // windowing shell keeps the main thread.
    let runtime = Runtime::new()?;

    let result = tempo_shell::run(config, runtime.handle().clone());

    // The event loop has exited; give background tasks a moment to wind
    // down instead of blocking forever on a hung download.
    log::info!("Event loop exited, shutting down runtime");
    runtime.shutdown_timeout(Duration::from_secs(2));

    result.map_err(Into::into)
}
