//! mq-exporter library
//!
//! This crate provides the core functionality for collecting IBM MQ
//! manager and queue status via `dspmq`/`runmqsc` and exporting it in
//! Prometheus format.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod exporter;
pub mod pipeline;
pub mod push;
pub mod server;
pub mod transformer;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize the logging subsystem
///
/// Logs go to stderr so stdout stays clean for `--dry-run` output.
///
/// # Arguments
/// * `level` - Default level when `RUST_LOG` is unset
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
