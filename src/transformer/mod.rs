//! Metric transformation module
//!
//! This module turns parsed MQ records into Prometheus exposition text
//! using the family tables in [`families`].

pub mod families;
pub mod formatter;

pub use families::{
    Label, LabelSource, MetricFamily, MetricType, ValueKind, INDICATORS, INDICATOR_LABEL,
    MANAGER_FAMILIES, QUEUE_DEPTH_FAMILIES, QUEUE_MONITOR_FAMILIES,
};
pub use formatter::{merge, preamble, MetricRenderer, MetricSample, RenderOutput, CONTENT_TYPE};
