//! Predictive capability seam
//!
//! A predictor is loaded once at startup and shared read-only across requests,
//! so implementations must be side-effect free per call.

use serde_json::Value;
use thiserror::Error;

use crate::record::InputRecord;

#[derive(Debug, Error)]
pub enum PredictError {
    /// The record does not fit the model's schema (bad feature value)
    #[error("record rejected by model schema: {0}")]
    Schema(String),

    /// The model itself failed while scoring
    #[error("model failed: {0}")]
    Internal(String),

    /// The model did not answer within the configured budget
    #[error("model timed out after {0} ms")]
    Timeout(u64),
}

impl PredictError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::Schema(_))
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self, PredictError::Internal(_) | PredictError::Timeout(_))
    }
}

pub trait Predictor: Send + Sync {
    /// Short identifier used in logs and the health endpoint
    fn name(&self) -> &str;

    /// Features the model cannot score without. Defaults to none.
    fn required_features(&self) -> &[String] {
        &[]
    }

    /// Score one record. The raw output is expected to be a number in `[0, 1]`
    /// but is returned untyped; the scoring service does the coercion.
    fn predict(&self, record: &InputRecord) -> Result<Value, PredictError>;
}
