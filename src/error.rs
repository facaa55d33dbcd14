//! Error types for mq-exporter
//!
//! This module defines the error types used throughout the application.
//! Parse errors are scoped to a single entity and collected; transport
//! errors fail the whole invocation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while turning command output into records and samples
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A value that should be a numeric scalar was not
    #[error("Malformed value for field '{field}': '{fragment}'")]
    MalformedToken { field: String, fragment: String },

    /// An entity block without its distinguished name field
    #[error("Missing name field '{field}' in block '{block}'")]
    MissingNameField { field: String, block: String },

    /// A field required by a metric family is absent
    #[error("Missing required field '{field}'")]
    MissingRequiredField { field: String },

    /// Date and time fields that do not combine into a timestamp
    #[error("Invalid timestamp for '{field}': date '{date}', time '{time}'")]
    InvalidTimestamp {
        field: String,
        date: String,
        time: String,
    },
}

/// A parse error attributed to one queue or manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity}: {source}")]
pub struct EntityError {
    /// Queue or manager name
    pub entity: String,
    #[source]
    pub source: ParseError,
}

impl EntityError {
    pub fn new(entity: impl Into<String>, source: ParseError) -> Self {
        Self {
            entity: entity.into(),
            source,
        }
    }
}

/// Failures of the external command or of the push to the gateway
#[derive(Error, Debug)]
pub enum TransportError {
    /// Command could not be started
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while talking to a running child
    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Command exited unsuccessfully
    #[error("'{program}' exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    /// Command or push did not finish in time.
    /// The value is the configured timeout in milliseconds.
    #[error("Timed out after {0}ms")]
    Timeout(u64),

    /// Push client could not be built
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    /// Push request failed
    #[error("Push request failed: {0}")]
    HttpRequest(#[source] reqwest::Error),

    /// Gateway answered with a non-success status
    #[error("Push gateway returned status {0}")]
    HttpStatus(u16),

    /// Push URL could not be formed
    #[error("Invalid push URL: {0}")]
    InvalidUrl(String),

    /// Collection task panicked or was cancelled
    #[error("Collection task for '{manager}' failed: {reason}")]
    TaskFailed { manager: String, reason: String },
}

impl TransportError {
    /// 재시도 가능한 에러인지 확인
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_)
                | TransportError::Io { .. }
                | TransportError::HttpRequest(_)
                | TransportError::HttpStatus(500..=599)
        )
    }

    /// HTTP 상태 코드 추출
    pub fn http_status(&self) -> Option<u16> {
        match self {
            TransportError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Command or push failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::collector::DiscoverError> for AppError {
    fn from(err: crate::collector::DiscoverError) -> Self {
        match err {
            crate::collector::DiscoverError::Transport(e) => AppError::Transport(e),
            crate::collector::DiscoverError::Parse(e) => {
                AppError::Internal(format!("Failed to list managers: {}", e))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, public_message, log_message) = match self {
            AppError::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error",
                e.to_string(),
            ),
            AppError::Transport(e) => (StatusCode::BAD_GATEWAY, "Upstream error", e.to_string()),
            AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error", e),
        };

        tracing::error!(status = %status, error = %log_message, "Request failed");

        (status, public_message).into_response()
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Timeout(100).is_retryable());
        assert!(TransportError::HttpStatus(503).is_retryable());
        assert!(!TransportError::HttpStatus(400).is_retryable());
        assert!(!TransportError::NonZeroExit {
            program: "dspmq".to_string(),
            code: 72,
            stderr: "AMQ7048E".to_string(),
        }
        .is_retryable());
    }

    #[test]
    fn test_entity_error_display() {
        let err = EntityError::new(
            "DEV.QUEUE.1",
            ParseError::MissingRequiredField {
                field: "curdepth".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "DEV.QUEUE.1: Missing required field 'curdepth'"
        );
        assert_eq!(TransportError::HttpStatus(502).http_status(), Some(502));
    }
}
