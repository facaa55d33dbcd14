//! Prometheus Exposition Format output
//!
//! Renders records against a [`MetricFamily`] table into the text
//! exposition format (version 0.0.4).
//!
//! # Exposition Format
//!
//! ```text
//! # HELP <family> <help_text>
//! # TYPE <family> gauge
//! <family>{<label1>="<value1>", <label2>="<value2>"} <value>
//! ```

use std::collections::HashMap;

use crate::collector::{FieldValue, Record};
use crate::error::{EntityError, ParseError};

use super::families::{
    LabelSource, MetricFamily, MetricType, ValueKind, INDICATORS, INDICATOR_LABEL,
};

/// Content type of rendered output
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// One sample line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    pub family: &'static str,
    /// Labels in output order
    pub labels: Vec<(&'static str, String)>,
    pub value: String,
}

impl MetricSample {
    /// Format as `family{l="v", ...} value`
    pub fn to_line(&self) -> String {
        let mut line = String::from(self.family);

        if !self.labels.is_empty() {
            let label_pairs: Vec<String> = self
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
                .collect();

            line.push('{');
            line.push_str(&label_pairs.join(", "));
            line.push('}');
        }

        line.push(' ');
        line.push_str(&self.value);
        line
    }
}

/// Text produced by one render call plus the records it rejected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    pub text: String,
    pub errors: Vec<EntityError>,
    /// Number of sample lines in `text`
    pub samples: usize,
}

/// Exposition renderer over a fixed family table
///
/// # Example
///
/// ```ignore
/// use mq_exporter::transformer::{MetricRenderer, QUEUE_DEPTH_FAMILIES};
///
/// let output = MetricRenderer::new(QUEUE_DEPTH_FAMILIES).render("QM1", &records);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MetricRenderer<'a> {
    families: &'a [MetricFamily],
}

impl<'a> MetricRenderer<'a> {
    pub fn new(families: &'a [MetricFamily]) -> Self {
        Self { families }
    }

    /// Render `(entity name, record)` pairs for `manager`
    ///
    /// # Notes
    ///
    /// - Families appear in table order; HELP and TYPE once per family that
    ///   has at least one sample
    /// - Within a family, samples follow record order
    /// - A record that fails any family contributes no samples; its error is
    ///   collected and the rest are still rendered
    pub fn render(&self, manager: &str, records: &[(String, Record)]) -> RenderOutput {
        let mut accepted: Vec<Vec<Vec<MetricSample>>> = Vec::with_capacity(records.len());
        let mut errors = Vec::new();

        for (entity, record) in records {
            let per_family: Result<Vec<Vec<MetricSample>>, ParseError> = self
                .families
                .iter()
                .map(|family| samples_for(family, manager, entity, record))
                .collect();

            match per_family {
                Ok(samples) => accepted.push(samples),
                Err(e) => {
                    tracing::warn!(
                        manager = %manager,
                        entity = %entity,
                        error = %e,
                        "Skipping record"
                    );
                    errors.push(EntityError::new(entity.clone(), e));
                }
            }
        }

        let mut text = String::with_capacity(accepted.len() * self.families.len() * 100);
        let mut count = 0;

        for (index, family) in self.families.iter().enumerate() {
            let mut lines = accepted.iter().flat_map(|rec| rec[index].iter()).peekable();
            if lines.peek().is_none() {
                continue;
            }

            text.push_str(&preamble(family.name, family.help, family.metric_type));
            for sample in lines {
                text.push_str(&sample.to_line());
                text.push('\n');
                count += 1;
            }
        }

        RenderOutput {
            text,
            errors,
            samples: count,
        }
    }
}

/// `# HELP` and `# TYPE` lines for one family
pub fn preamble(name: &str, help: &str, metric_type: MetricType) -> String {
    format!(
        "# HELP {} {}\n# TYPE {} {}\n",
        name,
        escape_help(help),
        name,
        metric_type.as_str()
    )
}

/// Merge rendered texts so each family appears once with all its samples
///
/// Families keep the order of first occurrence; the first HELP/TYPE seen
/// for a family wins.
pub fn merge(texts: &[&str]) -> String {
    let mut groups: HashMap<&str, (Vec<&str>, Vec<&str>)> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for line in texts.iter().flat_map(|text| text.lines()) {
        let (name, is_comment) = match line
            .strip_prefix("# HELP ")
            .or_else(|| line.strip_prefix("# TYPE "))
        {
            Some(rest) => (rest.split(' ').next().unwrap_or(rest), true),
            None if line.starts_with('#') => continue,
            None => (line.split(['{', ' ']).next().unwrap_or(line), false),
        };
        if name.is_empty() {
            continue;
        }

        let (comments, samples) = groups.entry(name).or_insert_with(|| {
            order.push(name);
            (Vec::new(), Vec::new())
        });

        if !is_comment {
            samples.push(line);
        } else if comments.len() < 2 && !comments.iter().any(|c| c[..6] == line[..6]) {
            comments.push(line);
        }
    }

    let mut output = String::new();
    for name in order {
        if let Some((comments, samples)) = groups.remove(name) {
            for line in comments.into_iter().chain(samples) {
                output.push_str(line);
                output.push('\n');
            }
        }
    }
    output
}

/// Samples of one family for one record
///
/// An empty vector means the value was blank and the sample is skipped.
fn samples_for(
    family: &MetricFamily,
    manager: &str,
    entity: &str,
    record: &Record,
) -> Result<Vec<MetricSample>, ParseError> {
    let labels = family
        .labels
        .iter()
        .map(|label| -> Result<(&'static str, String), ParseError> {
            let value = match label.source {
                LabelSource::Manager => manager.to_string(),
                LabelSource::Entity => entity.to_string(),
                LabelSource::Field(field) => record
                    .get(field)
                    .map(FieldValue::to_string)
                    .ok_or_else(|| missing(field))?,
            };
            Ok((label.name, value))
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    let value = record.get(family.field).ok_or_else(|| missing(family.field))?;

    let values: Vec<(Option<&'static str>, String)> = match (family.kind, value) {
        (ValueKind::Plain, FieldValue::Text(s)) => vec![(None, s.clone())],
        (ValueKind::Plain | ValueKind::Status | ValueKind::Timestamp, FieldValue::Integer(i)) => {
            vec![(None, i.to_string())]
        }
        (ValueKind::IntervalPair, FieldValue::Pair(short, long)) => vec![
            (Some(INDICATORS[0]), short.clone()),
            (Some(INDICATORS[1]), long.clone()),
        ],
        (_, FieldValue::Text(s)) if s.is_empty() => vec![(None, String::new())],
        (_, other) => return Err(malformed(family.field, &other.to_string())),
    };

    let mut samples = Vec::with_capacity(values.len());
    for (indicator, value) in values {
        if value.is_empty() {
            tracing::debug!(family = family.name, entity = %entity, "Blank value, sample skipped");
            continue;
        }
        if !is_scalar(&value) {
            return Err(malformed(family.field, &value));
        }

        let mut sample_labels = labels.clone();
        if let Some(indicator) = indicator {
            sample_labels.push((INDICATOR_LABEL, indicator.to_string()));
        }

        samples.push(MetricSample {
            family: family.name,
            labels: sample_labels,
            value,
        });
    }

    Ok(samples)
}

fn missing(field: &str) -> ParseError {
    ParseError::MissingRequiredField {
        field: field.to_string(),
    }
}

fn malformed(field: &str, fragment: &str) -> ParseError {
    ParseError::MalformedToken {
        field: field.to_string(),
        fragment: fragment.to_string(),
    }
}

/// Integer or decimal without separators
fn is_scalar(value: &str) -> bool {
    value.parse::<i64>().is_ok() || value.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Escapes backslash and newline characters.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Escapes backslash, double-quote, and newline characters.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
