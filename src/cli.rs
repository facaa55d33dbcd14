//! CLI argument parsing for mq-exporter
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: MQ_EXPORTER_CONFIG)
//! - `--manager` / `-m`: Manager to collect, repeatable (overrides config file)
//! - `--pushgateway-url`: Push gateway base URL (env: MQ_EXPORTER_PUSHGATEWAY_URL)
//! - `--port` / `-p`: Server port for `--serve` (env: MQ_EXPORTER_PORT)
//! - `--interval`: Seconds between push cycles (env: MQ_EXPORTER_INTERVAL)
//! - `--once`: Run a single collection cycle and exit
//! - `--dry-run`: Print metrics to stdout instead of pushing (implies `--once`)
//! - `--serve`: Serve metrics over HTTP instead of pushing
//! - `--validate`: Validate configuration and exit
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: MQ_EXPORTER_LOG_LEVEL)
//!
//! # Precedence
//!
//! Configuration values are resolved in the following order (highest to lowest priority):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

/// mq-exporter - IBM MQ status exporter for Prometheus
///
/// Runs `dspmq` and `runmqsc` against local queue managers and pushes
/// manager and queue metrics to a Prometheus push gateway.
#[derive(Parser, Debug)]
#[command(name = "mq-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "MQ_EXPORTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Queue manager to collect; repeat for several (overrides config file)
    #[arg(short, long = "manager", value_name = "QMNAME")]
    pub managers: Vec<String>,

    /// Push gateway base URL (overrides config file)
    #[arg(long, value_name = "URL", env = "MQ_EXPORTER_PUSHGATEWAY_URL")]
    pub pushgateway_url: Option<String>,

    /// Server port for --serve (overrides config file)
    #[arg(short, long, value_name = "PORT", env = "MQ_EXPORTER_PORT")]
    pub port: Option<u16>,

    /// Seconds between push cycles (overrides config file)
    #[arg(long, value_name = "SECS", env = "MQ_EXPORTER_INTERVAL")]
    pub interval: Option<u64>,

    /// Run a single collection cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print metrics to stdout instead of pushing (implies --once)
    #[arg(long)]
    pub dry_run: bool,

    /// Serve metrics over HTTP instead of pushing
    #[arg(long, conflicts_with_all = ["once", "dry_run"])]
    pub serve: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub validate: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "MQ_EXPORTER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,
}

impl Cli {
    /// Apply CLI overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if !self.managers.is_empty() {
            config.mq.managers = self.managers.clone();
        }
        if let Some(ref url) = self.pushgateway_url {
            config.pushgateway.url = url.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(interval) = self.interval {
            config.collection.interval_secs = interval;
        }
    }
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["mq-exporter"]);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert!(cli.managers.is_empty());
        assert_eq!(cli.pushgateway_url, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.interval, None);
        assert!(!cli.once);
        assert!(!cli.dry_run);
        assert!(!cli.serve);
        assert!(!cli.validate);
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_cli_repeated_managers() {
        let cli = Cli::parse_from(["mq-exporter", "-m", "QM1", "--manager", "QM2", "--once"]);
        assert_eq!(cli.managers, vec!["QM1", "QM2"]);
        assert!(cli.once);
    }

    #[test]
    fn test_cli_serve_conflicts_with_once() {
        assert!(Cli::try_parse_from(["mq-exporter", "--serve", "--once"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "mq-exporter",
            "-m",
            "QM9",
            "--pushgateway-url",
            "http://gw:9091",
            "-p",
            "9999",
            "--interval",
            "15",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.mq.managers, vec!["QM9"]);
        assert_eq!(config.pushgateway.url, "http://gw:9091");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.collection.interval_secs, 15);
    }

    #[test]
    fn test_apply_keeps_config_without_flags() {
        let cli = Cli::parse_from(["mq-exporter"]);
        let mut config = Config::default();
        config.mq.managers = vec!["FROM_FILE".to_string()];
        cli.apply(&mut config);
        assert_eq!(config.mq.managers, vec!["FROM_FILE"]);
    }
}
