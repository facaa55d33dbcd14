//! Metric family definitions
//!
//! Immutable tables describing every family the exporter emits: its name,
//! help text, the record field holding the value, and the ordered label
//! list. The renderer takes one of these tables explicitly.
//!
//! # Example
//!
//! ```ignore
//! use mq_exporter::transformer::{MetricRenderer, QUEUE_DEPTH_FAMILIES};
//!
//! let renderer = MetricRenderer::new(QUEUE_DEPTH_FAMILIES);
//! ```

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    /// Gauge metric - a value that can go up and down
    #[default]
    Gauge,
}

impl MetricType {
    /// Returns the Prometheus type string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a family reads its value field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Numeric text printed by MQ
    Plain,
    /// 0/1 produced by the status transform
    Status,
    /// Unix seconds produced by the date+time transform
    Timestamp,
    /// Short/long-term pair; rendered as two samples split by `indicator`
    IntervalPair,
}

/// Where a label value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Manager passed to the renderer
    Manager,
    /// Name of the entity being rendered
    Entity,
    /// A text field of the record
    Field(&'static str),
}

/// One label of a family, in output position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub name: &'static str,
    pub source: LabelSource,
}

impl Label {
    pub const fn new(name: &'static str, source: LabelSource) -> Self {
        Self { name, source }
    }

    pub const fn field(name: &'static str) -> Self {
        Self::new(name, LabelSource::Field(name))
    }
}

/// Label added to [`ValueKind::IntervalPair`] samples
pub const INDICATOR_LABEL: &str = "indicator";

/// Indicator values, in emission order
pub const INDICATORS: [&str; 2] = ["short_term", "long_term"];

/// A metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricFamily {
    /// Full metric name, `<domain>_<subject>`
    pub name: &'static str,
    /// One-line description
    pub help: &'static str,
    pub metric_type: MetricType,
    /// Record field providing the sample value
    pub field: &'static str,
    pub kind: ValueKind,
    /// Labels in output order
    pub labels: &'static [Label],
}

const MANAGER_LABELS: &[Label] = &[
    Label::field("default"),
    Label::field("instname"),
    Label::field("instpath"),
    Label::field("instver"),
    Label::field("qmname"),
    Label::field("standby"),
];

const QUEUE_DEPTH_LABELS: &[Label] = &[
    Label::new("qmname", LabelSource::Manager),
    Label::new("queuename", LabelSource::Entity),
    Label::field("type"),
];

const QUEUE_MONITOR_LABELS: &[Label] = &[
    Label::new("qmname", LabelSource::Manager),
    Label::new("queuename", LabelSource::Entity),
];

/// Manager status family
pub const MANAGER_FAMILIES: &[MetricFamily] = &[MetricFamily {
    name: "mq_manager_status",
    help: "Current status of MQ manager.",
    metric_type: MetricType::Gauge,
    field: "status",
    kind: ValueKind::Status,
    labels: MANAGER_LABELS,
}];

/// Families rendered from `DISPLAY QUEUE` output
pub const QUEUE_DEPTH_FAMILIES: &[MetricFamily] = &[
    MetricFamily {
        name: "mq_queue_curdepth",
        help: "Current depth of queue.",
        metric_type: MetricType::Gauge,
        field: "curdepth",
        kind: ValueKind::Plain,
        labels: QUEUE_DEPTH_LABELS,
    },
    MetricFamily {
        name: "mq_queue_maxdepth",
        help: "Maximum depth of queue.",
        metric_type: MetricType::Gauge,
        field: "maxdepth",
        kind: ValueKind::Plain,
        labels: QUEUE_DEPTH_LABELS,
    },
];

/// Families rendered from `DISPLAY QSTATUS MONITOR` output
pub const QUEUE_MONITOR_FAMILIES: &[MetricFamily] = &[
    MetricFamily {
        name: "mq_queue_lget",
        help: "Timestamp on which the last message was retrieved from the queue.",
        metric_type: MetricType::Gauge,
        field: "lget",
        kind: ValueKind::Timestamp,
        labels: QUEUE_MONITOR_LABELS,
    },
    MetricFamily {
        name: "mq_queue_lput",
        help: "Timestamp on which the last message was put to the queue.",
        metric_type: MetricType::Gauge,
        field: "lput",
        kind: ValueKind::Timestamp,
        labels: QUEUE_MONITOR_LABELS,
    },
    MetricFamily {
        name: "mq_queue_msgage",
        help: "Age of the oldest message on the queue.",
        metric_type: MetricType::Gauge,
        field: "msgage",
        kind: ValueKind::Plain,
        labels: QUEUE_MONITOR_LABELS,
    },
    MetricFamily {
        name: "mq_queue_qtime",
        help: "Interval between messages being put on the queue and then being destructively read.",
        metric_type: MetricType::Gauge,
        field: "qtime",
        kind: ValueKind::IntervalPair,
        labels: QUEUE_MONITOR_LABELS,
    },
];
