//! Scoring service: one record in, one health index and state out.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ScoringError;
use crate::health_state::{classify, HealthState};
use crate::predictor::Predictor;
use crate::record::{coerce_f64, json_kind, InputRecord};

/// Raw model output is a fraction; the index is expressed in percent.
pub const INDEX_SCALE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub health_index: f64,
    pub health_state: HealthState,
    /// Never populated by this service
    pub recommended_action: String,
}

impl ScoringResult {
    /// Scale a raw score and classify it. Out-of-band values are not clamped.
    pub fn from_raw_score(raw: f64) -> Self {
        let health_index = raw * INDEX_SCALE;
        Self {
            health_index,
            health_state: classify(health_index),
            recommended_action: String::new(),
        }
    }
}

/// Stateless orchestrator around a shared, read-only predictor
#[derive(Clone)]
pub struct ScoringService {
    predictor: Arc<dyn Predictor>,
}

impl ScoringService {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    /// Score a decoded payload end to end
    pub fn score(&self, payload: Value) -> Result<ScoringResult, ScoringError> {
        let record = self.prepare(payload)?;
        self.score_record(&record)
    }

    /// Validate a payload into a record without touching the model.
    ///
    /// Rejects non-objects and records lacking any feature the predictor
    /// declares as required.
    pub fn prepare(&self, payload: Value) -> Result<InputRecord, ScoringError> {
        let record = InputRecord::from_value(payload)?;
        let missing: Vec<&str> = self
            .predictor
            .required_features()
            .iter()
            .filter(|name| !record.has(name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ScoringError::InvalidRequest(format!(
                "missing required features: {}",
                missing.join(", ")
            )));
        }
        Ok(record)
    }

    /// Run the predictor exactly once and assemble the result
    pub fn score_record(&self, record: &InputRecord) -> Result<ScoringResult, ScoringError> {
        let output = self.predictor.predict(record)?;
        let result = assemble(output)?;
        tracing::debug!(
            model = self.predictor.name(),
            features = record.len(),
            health_index = result.health_index,
            health_state = %result.health_state,
            "Scored record"
        );
        Ok(result)
    }
}

/// Turn raw model output into a result
pub fn assemble(output: Value) -> Result<ScoringResult, ScoringError> {
    let raw = coerce_f64(&output).ok_or_else(|| {
        ScoringError::InvalidModelOutput(format!(
            "expected a numeric score, got {}",
            json_kind(&output)
        ))
    })?;
    if !raw.is_finite() {
        return Err(ScoringError::InvalidModelOutput(format!(
            "score {} is not a finite number",
            raw
        )));
    }
    let result = ScoringResult::from_raw_score(raw);
    // Large finite scores can still overflow once scaled
    if !result.health_index.is_finite() {
        return Err(ScoringError::InvalidModelOutput(format!(
            "score {} overflows the health index",
            raw
        )));
    }
    Ok(result)
}
