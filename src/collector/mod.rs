//! MQ 상태 수집 모듈
//!
//! Runs the MQ administration commands and parses their `KEY(value)`
//! output into records.
//!
//! # Example
//!
//! ```ignore
//! use mq_exporter::collector::{build_queue_records, CommandRunner, MqCommand, MqTask};
//!
//! let runner = MqCommand::new(&config.mq);
//! let raw = runner.run(MqTask::QueueDepth, "QM1").await?;
//! let (records, errors) = build_queue_records(&raw);
//! ```

mod command;
mod record;
mod tokenizer;

pub use command::{CommandRunner, Invocation, MqCommand, MqTask};
pub use record::{
    build_manager_record, build_queue_records, combine_timestamp, group_by_name, list_entities,
    transform_for, FieldTransform, FieldValue, Record, TimestampPart, FIELD_TRANSFORMS,
    MANAGER_NAME_FIELD, QUEUE_NAME_FIELD,
};
pub use tokenizer::{split_blocks, tokenize, FieldPair};

use crate::error::{ParseError, TransportError};

/// Discover the managers known to the local installation
pub async fn discover_managers(runner: &dyn CommandRunner) -> Result<Vec<String>, DiscoverError> {
    let raw = runner.run(MqTask::ListManagers, "").await?;
    Ok(list_entities(&raw, MANAGER_NAME_FIELD)?)
}

/// Failure of [`discover_managers`]
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
