//! Record builder
//!
//! Turns tokenized pairs for one entity into a [`Record`], applying the
//! field-specific transforms listed in [`FIELD_TRANSFORMS`].

use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

use super::tokenizer::{split_blocks, tokenize, FieldPair};
use crate::error::{EntityError, ParseError};

/// Distinguished name field of `dspmq` output
pub const MANAGER_NAME_FIELD: &str = "QMNAME";

/// Distinguished name field of `runmqsc` queue output
pub const QUEUE_NAME_FIELD: &str = "QUEUE";

/// Input format of MQ date/time fields, always read as UTC
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Status word mapped to `1`
const RUNNING_STATUS: &str = "Running";

/// A built field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw text as printed by MQ
    Text(String),
    /// Status flag (0/1) or Unix timestamp
    Integer(i64),
    /// Comma-separated short/long-term pair
    Pair(String, String),
}

impl FieldValue {
    /// Text 값 참조
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Pair(a, b) => write!(f, "{}, {}", a, b),
        }
    }
}

/// Half of a date/time pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPart {
    Date,
    Time,
}

/// Field-specific transform applied at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTransform {
    /// `Running` → 1, anything else → 0
    Status,
    /// Half of a date/time pair combined into `target`
    Timestamp {
        target: &'static str,
        part: TimestampPart,
    },
    /// `a, b` → [`FieldValue::Pair`]
    Split,
}

/// Lower-case field name → transform
pub const FIELD_TRANSFORMS: &[(&str, FieldTransform)] = &[
    ("status", FieldTransform::Status),
    (
        "lgetdate",
        FieldTransform::Timestamp {
            target: "lget",
            part: TimestampPart::Date,
        },
    ),
    (
        "lgettime",
        FieldTransform::Timestamp {
            target: "lget",
            part: TimestampPart::Time,
        },
    ),
    (
        "lputdate",
        FieldTransform::Timestamp {
            target: "lput",
            part: TimestampPart::Date,
        },
    ),
    (
        "lputtime",
        FieldTransform::Timestamp {
            target: "lput",
            part: TimestampPart::Time,
        },
    ),
    ("qtime", FieldTransform::Split),
];

/// Look up the transform for a lower-case field name
pub fn transform_for(field: &str) -> Option<FieldTransform> {
    FIELD_TRANSFORMS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, transform)| *transform)
}

/// One queue or manager, keyed by lower-case field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Build a record from the pairs of one entity
    ///
    /// Names are lower-cased and the last duplicate wins. Date/time halves
    /// are replaced by their combined key.
    ///
    /// # Errors
    /// - `MissingRequiredField` when only one half of a date/time pair is present
    /// - `InvalidTimestamp` when a pair does not parse as `YYYY-MM-DD HH.MM.SS`
    pub fn build(pairs: &[FieldPair]) -> Result<Self, ParseError> {
        let mut raw: HashMap<String, String> = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            raw.insert(pair.name.to_lowercase(), pair.value.clone());
        }

        let mut fields = HashMap::with_capacity(raw.len());
        // target → (date, time), checked in target order
        let mut stamps: BTreeMap<&'static str, (Option<String>, Option<String>)> = BTreeMap::new();

        for (name, value) in raw {
            match transform_for(&name) {
                Some(FieldTransform::Status) => {
                    let flag = i64::from(value == RUNNING_STATUS);
                    fields.insert(name, FieldValue::Integer(flag));
                }
                Some(FieldTransform::Timestamp { target, part }) => {
                    let entry = stamps.entry(target).or_default();
                    match part {
                        TimestampPart::Date => entry.0 = Some(value),
                        TimestampPart::Time => entry.1 = Some(value),
                    }
                }
                Some(FieldTransform::Split) => {
                    let built = match value.split_once(',') {
                        Some((short, long)) => {
                            FieldValue::Pair(short.trim().to_string(), long.trim().to_string())
                        }
                        None => FieldValue::Text(value),
                    };
                    fields.insert(name, built);
                }
                None => {
                    fields.insert(name, FieldValue::Text(value));
                }
            }
        }

        for (target, (date, time)) in stamps {
            let timestamp = match (date, time) {
                (Some(date), Some(time)) => combine_timestamp(target, &date, &time)?,
                (Some(_), None) => {
                    return Err(ParseError::MissingRequiredField {
                        field: format!("{}time", target),
                    })
                }
                (None, _) => {
                    return Err(ParseError::MissingRequiredField {
                        field: format!("{}date", target),
                    })
                }
            };
            fields.insert(target.to_string(), FieldValue::Integer(timestamp));
        }

        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text value of a field, if present and untransformed
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    /// Manager status flag (`1` when running)
    pub fn status(&self) -> Option<i64> {
        self.get("status").and_then(FieldValue::as_integer)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names, sorted for stable iteration
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Combine `YYYY-MM-DD` and `HH.MM.SS` into Unix seconds (UTC)
///
/// Both halves blank means the event never happened and yields `0`.
pub fn combine_timestamp(field: &str, date: &str, time: &str) -> Result<i64, ParseError> {
    if date.is_empty() && time.is_empty() {
        return Ok(0);
    }

    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| ParseError::InvalidTimestamp {
            field: field.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        })
}

/// Names of the entities in a newline-delimited block, in order of appearance
///
/// Duplicates are kept.
///
/// # Errors
/// Returns `MissingNameField` for the first non-blank block without `name_field`.
pub fn list_entities(raw: &str, name_field: &str) -> Result<Vec<String>, ParseError> {
    split_blocks(raw)
        .map(|block| {
            tokenize(block)
                .into_iter()
                .find(|pair| pair.name == name_field && !pair.value.is_empty())
                .map(|pair| pair.value)
                .ok_or_else(|| ParseError::MissingNameField {
                    field: name_field.to_string(),
                    block: block.to_string(),
                })
        })
        .collect()
}

/// Group the token stream of a whole output into per-entity pair lists
///
/// A new group starts at each `name_field` token; tokens before the first
/// one are ignored. Works for one-line and multi-line `runmqsc` layouts.
pub fn group_by_name(raw: &str, name_field: &str) -> Vec<(String, Vec<FieldPair>)> {
    let mut groups: Vec<(String, Vec<FieldPair>)> = Vec::new();

    for pair in split_blocks(raw).flat_map(tokenize) {
        if pair.name == name_field {
            groups.push((pair.value.clone(), vec![pair]));
        } else if let Some((_, pairs)) = groups.last_mut() {
            pairs.push(pair);
        }
    }

    groups
}

/// Build one record per queue, collecting per-queue failures
pub fn build_queue_records(raw: &str) -> (Vec<(String, Record)>, Vec<EntityError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (name, pairs) in group_by_name(raw, QUEUE_NAME_FIELD) {
        match Record::build(&pairs) {
            Ok(record) => records.push((name, record)),
            Err(e) => {
                tracing::warn!(queue = %name, error = %e, "Failed to build queue record");
                errors.push(EntityError::new(name, e));
            }
        }
    }

    (records, errors)
}

/// Build the record of a manager status block
pub fn build_manager_record(raw: &str) -> Result<Record, ParseError> {
    let pairs: Vec<FieldPair> = split_blocks(raw).flat_map(tokenize).collect();
    if !pairs.iter().any(|p| p.name == MANAGER_NAME_FIELD) {
        return Err(ParseError::MissingNameField {
            field: MANAGER_NAME_FIELD.to_string(),
            block: raw.trim().to_string(),
        });
    }
    Record::build(&pairs)
}
