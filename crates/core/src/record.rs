//! Input record handed to the predictive model
//!
//! The record is an arbitrary JSON object. Its field set belongs to the model;
//! nothing here checks names or types.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ScoringError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InputRecord {
    fields: Map<String, Value>,
}

impl InputRecord {
    /// Accept a decoded payload. Only JSON objects are records.
    pub fn from_value(payload: Value) -> Result<Self, ScoringError> {
        match payload {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Err(ScoringError::InvalidRequest(
                "request body is missing".to_string(),
            )),
            other => Err(ScoringError::InvalidRequest(format!(
                "expected a JSON object of features, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.fields.get(feature)
    }

    /// Present and not `null`
    pub fn has(&self, feature: &str) -> bool {
        matches!(self.fields.get(feature), Some(v) if !v.is_null())
    }

    /// Numeric value of a feature, accepting numeric strings
    pub fn number(&self, feature: &str) -> Option<f64> {
        self.fields.get(feature).and_then(coerce_f64)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Coerce a JSON value to `f64` the way a float conversion would:
/// numbers pass through, strings are parsed, everything else is rejected.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
