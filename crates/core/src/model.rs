//! Weighted sensor model
//!
//! A calibrated linear model over normalized sensor readings:
//!
//! ```text
//! score = Σ weight_i × (1 − badness_i)
//! ```
//!
//! where `badness_i` is the reading normalized into `[0, 1]` over its acceptable
//! range (0 = ideal, 1 = at or beyond the limit). Features with an `ideal` value
//! are scored by their absolute deviation from it.
//!
//! The calibration is loaded from a JSON artifact once at startup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predictor::{PredictError, Predictor};
use crate::record::InputRecord;

// ============================================================================
// Constants
// ============================================================================

/// Name reported for the built-in calibration
pub const DEFAULT_MODEL_NAME: &str = "weighted-sensor-default";

/// Allowed drift of the weight sum away from 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model calibration: {0}")]
    Invalid(String),
}

// ============================================================================
// Artifact Types
// ============================================================================

/// One input of the model and how to normalize it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCalibration {
    pub name: String,
    pub weight: f64,
    pub min: f64,
    pub max: f64,
    /// Score by distance from this value instead of distance from `min`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<f64>,
}

impl FeatureCalibration {
    /// Normalize a reading into `[0, 1]`, 0 being best
    pub fn badness(&self, value: f64) -> f64 {
        let (value, lo, hi) = match self.ideal {
            Some(ideal) => {
                let span = (ideal - self.min).max(self.max - ideal);
                ((value - ideal).abs(), 0.0, span)
            }
            None => (value, self.min, self.max),
        };
        let clamped = value.clamp(lo, hi);
        (clamped - lo) / (hi - lo)
    }
}

/// Serialized form of a `WeightedSensorModel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub features: Vec<FeatureCalibration>,
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.name.trim().is_empty() {
            return Err(ArtifactError::Invalid("model name is empty".to_string()));
        }
        if self.features.is_empty() {
            return Err(ArtifactError::Invalid("no features defined".to_string()));
        }

        let mut seen = HashSet::new();
        for f in &self.features {
            if !seen.insert(f.name.as_str()) {
                return Err(ArtifactError::Invalid(format!(
                    "duplicate feature: {}",
                    f.name
                )));
            }
            if !f.weight.is_finite() || f.weight < 0.0 {
                return Err(ArtifactError::Invalid(format!(
                    "feature {} has invalid weight {}",
                    f.name, f.weight
                )));
            }
            if !f.min.is_finite() || !f.max.is_finite() || f.max <= f.min {
                return Err(ArtifactError::Invalid(format!(
                    "feature {} has empty range [{}, {}]",
                    f.name, f.min, f.max
                )));
            }
            if let Some(ideal) = f.ideal {
                if !(f.min..=f.max).contains(&ideal) {
                    return Err(ArtifactError::Invalid(format!(
                        "feature {} ideal {} outside [{}, {}]",
                        f.name, ideal, f.min, f.max
                    )));
                }
            }
        }

        let total: f64 = self.features.iter().map(|f| f.weight).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ArtifactError::Invalid(format!(
                "weights sum to {}, expected 1.0",
                total
            )));
        }

        Ok(())
    }
}

impl Default for ModelArtifact {
    /// Field calibration used by the bridge dashboard
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            features: vec![
                FeatureCalibration {
                    name: "Strain_microstrain".to_string(),
                    weight: 0.45,
                    min: 0.0,
                    max: 20_000.0,
                    ideal: None,
                },
                FeatureCalibration {
                    name: "Vibration_ms2".to_string(),
                    weight: 0.40,
                    min: 0.0,
                    max: 5.0,
                    ideal: None,
                },
                FeatureCalibration {
                    name: "Temperature_C".to_string(),
                    weight: 0.15,
                    min: -10.0,
                    max: 50.0,
                    ideal: Some(20.0),
                },
            ],
        }
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone)]
pub struct WeightedSensorModel {
    artifact: ModelArtifact,
    required: Vec<String>,
}

impl WeightedSensorModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        artifact.validate()?;
        let required = artifact.features.iter().map(|f| f.name.clone()).collect();
        Ok(Self { artifact, required })
    }

    /// Load and validate a JSON artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let model = Self::from_artifact(artifact)?;
        tracing::info!(
            model = %model.artifact.name,
            features = model.required.len(),
            "Loaded model artifact from {:?}",
            path
        );
        Ok(model)
    }

    /// Built-in calibration
    pub fn builtin() -> Self {
        let artifact = ModelArtifact::default();
        let required = artifact.features.iter().map(|f| f.name.clone()).collect();
        Self { artifact, required }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    fn score(&self, record: &InputRecord) -> Result<f64, PredictError> {
        let mut score = 0.0;
        for f in &self.artifact.features {
            let value = record
                .number(&f.name)
                .ok_or_else(|| match record.get(&f.name) {
                    None | Some(Value::Null) => {
                        PredictError::Schema(format!("missing feature {}", f.name))
                    }
                    Some(other) => {
                        PredictError::Schema(format!("feature {} is not numeric: {}", f.name, other))
                    }
                })?;
            if !value.is_finite() {
                return Err(PredictError::Schema(format!(
                    "feature {} is not finite",
                    f.name
                )));
            }
            score += f.weight * (1.0 - f.badness(value));
        }
        Ok(score)
    }
}

impl Predictor for WeightedSensorModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn required_features(&self) -> &[String] {
        &self.required
    }

    fn predict(&self, record: &InputRecord) -> Result<Value, PredictError> {
        let score = self.score(record)?;
        Ok(Value::from(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> InputRecord {
        InputRecord::from_value(v).unwrap()
    }

    fn raw(model: &WeightedSensorModel, v: Value) -> f64 {
        model.predict(&record(v)).unwrap().as_f64().unwrap()
    }

    #[test]
    fn test_default_artifact_is_valid() {
        ModelArtifact::default().validate().unwrap();
        let model = WeightedSensorModel::builtin();
        assert_eq!(model.name(), DEFAULT_MODEL_NAME);
        assert_eq!(
            model.required_features(),
            ["Strain_microstrain", "Vibration_ms2", "Temperature_C"]
        );
    }

    #[test]
    fn test_ideal_conditions_score_one() {
        let model = WeightedSensorModel::builtin();
        let score = raw(
            &model,
            json!({"Strain_microstrain": 0, "Vibration_ms2": 0, "Temperature_C": 20}),
        );
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_worst_conditions_score_zero() {
        let model = WeightedSensorModel::builtin();
        let score = raw(
            &model,
            json!({"Strain_microstrain": 50000, "Vibration_ms2": 9.0, "Temperature_C": -40}),
        );
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn test_partial_degradation() {
        let model = WeightedSensorModel::builtin();
        // strain half way, vibration ideal, temperature 15 degrees off over a 30 degree span
        let score = raw(
            &model,
            json!({"Strain_microstrain": 10000, "Vibration_ms2": 0, "Temperature_C": 35}),
        );
        let expected = 0.45 * 0.5 + 0.40 + 0.15 * 0.5;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_strings_and_extra_fields() {
        let model = WeightedSensorModel::builtin();
        let score = raw(
            &model,
            json!({
                "Strain_microstrain": "0",
                "Vibration_ms2": 0,
                "Temperature_C": 20,
                "Humidity_percent": 55,
                "bridge": "B-17"
            }),
        );
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_numeric_feature_is_schema_error() {
        let model = WeightedSensorModel::builtin();
        let err = model
            .predict(&record(json!({
                "Strain_microstrain": "high",
                "Vibration_ms2": 0,
                "Temperature_C": 20
            })))
            .unwrap_err();
        assert!(matches!(err, PredictError::Schema(_)));
    }

    #[test]
    fn test_validate_rejects_bad_calibrations() {
        let mut artifact = ModelArtifact::default();
        artifact.features[0].weight = 0.9;
        assert!(matches!(artifact.validate(), Err(ArtifactError::Invalid(_))));

        let mut artifact = ModelArtifact::default();
        artifact.features[1].max = artifact.features[1].min;
        assert!(artifact.validate().is_err());

        let mut artifact = ModelArtifact::default();
        artifact.features[2].ideal = Some(80.0);
        assert!(artifact.validate().is_err());

        let mut artifact = ModelArtifact::default();
        artifact.features[1].name = artifact.features[0].name.clone();
        assert!(artifact.validate().is_err());

        let artifact = ModelArtifact {
            name: "empty".to_string(),
            features: vec![],
        };
        assert!(artifact.validate().is_err());
    }
}
