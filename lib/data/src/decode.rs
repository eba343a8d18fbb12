//! List payload decoding.
//!
//! The API is not uniform: some endpoints return a bare JSON array,
//! others wrap rows in an envelope with `data` plus one of several
//! total counters. Anything else is malformed and rendered as an
//! empty list rather than an error.

use serde_json::Value;

/// A list response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Top-level array of rows.
    Bare(Vec<Value>),

    /// Object whose `data` field is the row array; the full envelope
    /// is kept for callers that read other fields off it.
    Enveloped { rows: Vec<Value>, envelope: Value },

    /// Neither of the above.
    Malformed(Value),
}

impl Payload {
    pub fn classify(value: Value) -> Self {
        if let Value::Array(rows) = value {
            return Payload::Bare(rows);
        }
        if let Some(Value::Array(rows)) = value.get("data") {
            return Payload::Enveloped {
                rows: rows.clone(),
                envelope: value,
            };
        }
        Payload::Malformed(value)
    }

    /// Total row count for pagination.
    ///
    /// Bare arrays have no envelope, so their length is the total. For
    /// envelopes the counters are tried in order: `meta.total`, then
    /// `total`, then `pagination.total`, falling back to the page
    /// length.
    pub fn total(&self) -> u64 {
        match self {
            Payload::Bare(rows) => rows.len() as u64,
            Payload::Enveloped { rows, envelope } => envelope
                .pointer("/meta/total")
                .and_then(Value::as_u64)
                .or_else(|| envelope.get("total").and_then(Value::as_u64))
                .or_else(|| envelope.pointer("/pagination/total").and_then(Value::as_u64))
                .unwrap_or(rows.len() as u64),
            Payload::Malformed(_) => 0,
        }
    }
}
