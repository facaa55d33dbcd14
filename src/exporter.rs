//! Push-mode driver
//!
//! Runs the pipeline on an interval and hands each manager's text to the
//! push gateway, or to stdout for `--dry-run`.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::collector::MqCommand;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::push::PushClient;
use crate::transformer::merge;

/// Where collected text goes
pub enum Sink {
    /// Push gateway
    Push(PushClient),
    /// Standard output
    Stdout,
}

/// Totals of one collection cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub managers: usize,
    pub delivered: usize,
    pub failed: usize,
    pub entity_errors: usize,
}

/// Push loop over a [`Pipeline`]
pub struct Exporter {
    config: Config,
    pipeline: Pipeline,
    sink: Sink,
}

impl Exporter {
    pub fn new(config: Config, pipeline: Pipeline, sink: Sink) -> Self {
        Self {
            config,
            pipeline,
            sink,
        }
    }

    /// Exporter over the local MQ binaries
    ///
    /// # Errors
    /// Fails when the push client cannot be built.
    pub fn from_config(config: Config, dry_run: bool) -> Result<Self> {
        let pipeline = Pipeline::new(Arc::new(MqCommand::new(&config.mq)));
        let sink = if dry_run {
            Sink::Stdout
        } else {
            Sink::Push(PushClient::new(&config.pushgateway)?)
        };
        Ok(Self::new(config, pipeline, sink))
    }

    /// Run one collection cycle
    ///
    /// # Errors
    /// Fails only when the manager list cannot be obtained.
    pub async fn run_once(&self) -> Result<CycleStats> {
        let managers = self.pipeline.managers(&self.config.mq.managers).await?;
        let results = self.pipeline.collect_all(&managers).await;

        let mut stats = CycleStats {
            managers: managers.len(),
            ..CycleStats::default()
        };
        let mut printed: Vec<String> = Vec::new();

        for (manager, result) in results {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(manager = %manager, error = %e, "Collection failed");
                    stats.failed += 1;
                    continue;
                }
            };

            for e in &outcome.errors {
                warn!(manager = %manager, error = %e, "Entity skipped");
            }
            stats.entity_errors += outcome.errors.len();

            if outcome.text.is_empty() {
                stats.failed += 1;
                continue;
            }

            match &self.sink {
                Sink::Push(client) => match client.push(&manager, outcome.text).await {
                    Ok(()) => stats.delivered += 1,
                    Err(e) => {
                        error!(manager = %manager, error = %e, retryable = e.is_retryable(), "Push failed");
                        stats.failed += 1;
                    }
                },
                Sink::Stdout => {
                    printed.push(outcome.text);
                    stats.delivered += 1;
                }
            }
        }

        // one document, so each family keeps a single HELP/TYPE
        if !printed.is_empty() {
            let texts: Vec<&str> = printed.iter().map(String::as_str).collect();
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(merge(&texts).as_bytes())?;
            stdout.flush()?;
        }

        info!(
            managers = stats.managers,
            delivered = stats.delivered,
            failed = stats.failed,
            entity_errors = stats.entity_errors,
            "Collection cycle complete"
        );

        Ok(stats)
    }

    /// Run cycles every `collection.interval_secs` until a shutdown signal
    pub async fn run(&self) -> Result<()> {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.collection.interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let shutdown = crate::server::shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Collection cycle failed");
                    }
                }
            }
        }

        info!("Exporter stopped");
        Ok(())
    }
}
