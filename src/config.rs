//! Configuration management for mq-exporter
//!
//! Handles loading and validating configuration from YAML files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// MQ command configuration
    #[serde(default)]
    pub mq: MqConfig,

    /// Push gateway configuration
    #[serde(default)]
    pub pushgateway: PushgatewayConfig,

    /// Push loop configuration
    #[serde(default)]
    pub collection: CollectionConfig,

    /// HTTP server configuration (serve mode)
    #[serde(default)]
    pub server: ServerConfig,
}

/// MQ command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqConfig {
    /// Path to `dspmq`
    #[serde(default = "default_dspmq_path")]
    pub dspmq_path: String,

    /// Path to `runmqsc`
    #[serde(default = "default_runmqsc_path")]
    pub runmqsc_path: String,

    /// Command timeout in milliseconds
    #[serde(default = "default_command_timeout")]
    pub timeout_ms: u64,

    /// Managers to collect; empty means every manager `dspmq` reports
    #[serde(default)]
    pub managers: Vec<String>,

    /// MQSC generic queue name passed to DISPLAY commands
    #[serde(default = "default_queue_pattern")]
    pub queue_pattern: String,
}

/// Push gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushgatewayConfig {
    /// Push gateway base URL
    #[serde(default = "default_pushgateway_url")]
    pub url: String,

    /// Job grouping label
    #[serde(default = "default_job")]
    pub job: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_push_timeout")]
    pub timeout_ms: u64,
}

/// Push loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Seconds between collection cycles
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// Default value functions
fn default_dspmq_path() -> String {
    "dspmq".to_string()
}

fn default_runmqsc_path() -> String {
    "runmqsc".to_string()
}

fn default_command_timeout() -> u64 {
    10000
}

fn default_queue_pattern() -> String {
    "*".to_string()
}

fn default_pushgateway_url() -> String {
    "http://localhost:9091".to_string()
}

fn default_job() -> String {
    "mq_exporter".to_string()
}

fn default_push_timeout() -> u64 {
    5000
}

fn default_interval() -> u64 {
    60
}

fn default_port() -> u16 {
    9157
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for MqConfig {
    fn default() -> Self {
        Self {
            dspmq_path: default_dspmq_path(),
            runmqsc_path: default_runmqsc_path(),
            timeout_ms: default_command_timeout(),
            managers: Vec::new(),
            queue_pattern: default_queue_pattern(),
        }
    }
}

impl Default for PushgatewayConfig {
    fn default() -> Self {
        Self {
            url: default_pushgateway_url(),
            job: default_job(),
            timeout_ms: default_push_timeout(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_metrics_path(),
            bind_address: default_bind_address(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    ///
    /// # Note
    /// - If the file doesn't exist, returns `ConfigError::ReadError`
    /// - Use `Config::load_or_default()` if you want fallback to defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mq.timeout_ms == 0 || self.pushgateway.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.mq.queue_pattern.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Queue pattern must not be empty".to_string(),
            ));
        }

        if self.mq.managers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "Manager names must not be empty".to_string(),
            ));
        }

        if self.collection.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Collection interval must be greater than 0".to_string(),
            ));
        }

        let url = Url::parse(&self.pushgateway.url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Invalid pushgateway url '{}': {}",
                self.pushgateway.url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "Pushgateway url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.pushgateway.job.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Pushgateway job must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "Metrics path must start with '/'".to_string(),
            ));
        }

        if self.server.path == "/" || self.server.path == "/health" {
            return Err(ConfigError::ValidationError(format!(
                "Metrics path '{}' conflicts with a built-in route",
                self.server.path
            )));
        }

        Ok(())
    }
}
