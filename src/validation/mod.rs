//! Reading validation and field classification
//!
//! Each field of an incoming reading is classified independently: finite
//! numbers inside their configured range become float measurements, non-empty
//! strings become tags, everything else is rejected with a reason. A single
//! rejected field never affects the rest of the reading.

use crate::config::ValidationConfig;
use serde_json::{Map, Value};
use tracing::debug;

/// Reason a field was rejected during classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Value was JSON null
    Null,
    /// Numeric value was NaN or infinite
    NonFinite,
    /// Numeric value fell outside the configured inclusive range
    OutOfRange,
    /// String value was empty
    EmptyText,
    /// Value kind has no storage representation (bool, array, object)
    UnsupportedType,
}

impl RejectReason {
    /// Stable label used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Null => "null",
            RejectReason::NonFinite => "non_finite",
            RejectReason::OutOfRange => "out_of_range",
            RejectReason::EmptyText => "empty_text",
            RejectReason::UnsupportedType => "unsupported_type",
        }
    }
}

/// Classification outcome for one input field
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedField {
    /// Finite, in-range number stored as a float measurement
    Numeric { name: String, value: f64 },
    /// Non-empty string stored as a tag dimension
    Tag { name: String, value: String },
    /// Dropped field, logged and excluded from storage
    Rejected { name: String, reason: RejectReason },
}

/// A storable point: at least one numeric field, zero or more tags.
///
/// The measurement name and the fixed device tag are attached by the
/// storage layer; this type carries only what the reading contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingPoint {
    /// Numeric measurements
    pub fields: Vec<(String, f64)>,
    /// String dimensions
    pub tags: Vec<(String, String)>,
}

/// Classify every field of a raw reading.
///
/// Pure function: no field is mandatory and iteration order does not affect
/// the resulting set. Rejections are logged at debug level.
pub fn classify(reading: &Map<String, Value>, config: &ValidationConfig) -> Vec<ClassifiedField> {
    reading
        .iter()
        .map(|(name, value)| classify_field(name, value, config))
        .collect()
}

fn classify_field(name: &str, value: &Value, config: &ValidationConfig) -> ClassifiedField {
    let rejected = |reason: RejectReason| {
        debug!(field = name, reason = reason.as_str(), "field rejected");
        ClassifiedField::Rejected {
            name: name.to_string(),
            reason,
        }
    };

    match value {
        Value::Null => rejected(RejectReason::Null),
        Value::Number(n) => match n.as_f64() {
            Some(v) => classify_number(name, v, config),
            None => rejected(RejectReason::NonFinite),
        },
        Value::String(s) => {
            if s.is_empty() {
                rejected(RejectReason::EmptyText)
            } else {
                ClassifiedField::Tag {
                    name: name.to_string(),
                    value: s.clone(),
                }
            }
        }
        _ => rejected(RejectReason::UnsupportedType),
    }
}

/// Classify one numeric value against the configured ranges.
///
/// The finiteness check runs before any range lookup: NaN and infinities are
/// rejected even for fields with no configured range.
pub fn classify_number(name: &str, value: f64, config: &ValidationConfig) -> ClassifiedField {
    let rejected = |reason: RejectReason| {
        debug!(field = name, reason = reason.as_str(), value, "field rejected");
        ClassifiedField::Rejected {
            name: name.to_string(),
            reason,
        }
    };

    if !value.is_finite() {
        return rejected(RejectReason::NonFinite);
    }
    if let Some((min, max)) = config.ranges.get(name) {
        if value < *min || value > *max {
            return rejected(RejectReason::OutOfRange);
        }
    }
    ClassifiedField::Numeric {
        name: name.to_string(),
        value,
    }
}

/// Build a storable point from a classified reading.
///
/// Returns `None` when no numeric fields survived classification; that is a
/// successful no-op, not an error.
pub fn build_point(classified: &[ClassifiedField]) -> Option<ReadingPoint> {
    let mut fields = Vec::new();
    let mut tags = Vec::new();

    for entry in classified {
        match entry {
            ClassifiedField::Numeric { name, value } => fields.push((name.clone(), *value)),
            ClassifiedField::Tag { name, value } => tags.push((name.clone(), value.clone())),
            ClassifiedField::Rejected { .. } => {}
        }
    }

    if fields.is_empty() {
        return None;
    }

    Some(ReadingPoint { fields, tags })
}
