//! mq-exporter - IBM MQ status exporter
//!
//! Collects manager and queue status from local IBM MQ installations and
//! pushes it to a Prometheus push gateway, or serves it over HTTP.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mq_exporter::{cli::Cli, config::Config, exporter::Exporter, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    mq_exporter::init_logging(cli.log_level.into())?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting mq-exporter");

    // Load configuration, then apply CLI overrides
    let mut config = Config::load_or_default(&cli.config)?;
    cli.apply(&mut config);
    config.validate()?;

    if cli.validate {
        println!("Configuration is valid");
        return Ok(());
    }

    if cli.serve {
        let port = config.server.port;
        return server::run(config, port).await;
    }

    let exporter = Exporter::from_config(config, cli.dry_run)?;
    if cli.once || cli.dry_run {
        exporter.run_once().await?;
    } else {
        exporter.run().await?;
    }

    Ok(())
}
