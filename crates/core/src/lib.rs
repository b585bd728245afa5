pub mod error;
pub mod health_state;
pub mod model;
pub mod predictor;
pub mod record;
pub mod scoring;

pub use error::{ErrorCode, ErrorReport, ScoringError};
pub use health_state::{classify, HealthState};
pub use model::{ArtifactError, FeatureCalibration, ModelArtifact, WeightedSensorModel};
pub use predictor::{PredictError, Predictor};
pub use record::InputRecord;
pub use scoring::{ScoringResult, ScoringService};
