//! Error taxonomy for a scoring request
//! Classification never fails; everything here is raised around the model call.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::predictor::PredictError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    PredictionFailure,
    InvalidModelOutput,
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::PredictionFailure => "prediction_failure",
            ErrorCode::InvalidModelOutput => "invalid_model_output",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Prediction failed: {0}")]
    PredictionFailure(#[from] PredictError),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),
}

impl ScoringError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScoringError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ScoringError::PredictionFailure(_) => ErrorCode::PredictionFailure,
            ScoringError::InvalidModelOutput(_) => ErrorCode::InvalidModelOutput,
        }
    }

    /// True when the caller is at fault (bad payload or a feature the model rejects)
    pub fn is_client_error(&self) -> bool {
        match self {
            ScoringError::InvalidRequest(_) => true,
            ScoringError::PredictionFailure(cause) => cause.is_client_error(),
            ScoringError::InvalidModelOutput(_) => false,
        }
    }

    /// Whether repeating the same request might succeed
    pub fn is_retriable(&self) -> bool {
        match self {
            ScoringError::PredictionFailure(cause) => cause.is_retriable(),
            _ => false,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            retriable: self.is_retriable(),
        }
    }
}

/// Wire form of a failed scoring request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(rename = "error")]
    pub code: ErrorCode,
    pub message: String,
    pub retriable: bool,
}
