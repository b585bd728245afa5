//! Health state bands for the Bridge Quality Index
//!
//! Bands are half-open `[lower, upper)` except the top band, which includes 100.
//! Anything outside `[0, 100]`, NaN included, is `ErrorData`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HealthState {
    #[serde(rename = "EXCELLENT")]
    Excellent,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "FAIR")]
    Fair,
    #[serde(rename = "POOR")]
    Poor,
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "ERROR DATA")]
    ErrorData,
}

impl HealthState {
    /// All states, best first
    pub const ALL: [HealthState; 6] = [
        HealthState::Excellent,
        HealthState::Good,
        HealthState::Fair,
        HealthState::Poor,
        HealthState::Critical,
        HealthState::ErrorData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
            Self::Critical => "CRITICAL",
            Self::ErrorData => "ERROR DATA",
        }
    }

    /// True for the out-of-band fallback
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ErrorData)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHealthState(pub String);

impl fmt::Display for UnknownHealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown health state: {}", self.0)
    }
}

impl std::error::Error for UnknownHealthState {}

impl FromStr for HealthState {
    type Err = UnknownHealthState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        HealthState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownHealthState(s.to_string()))
    }
}

/// Map a health index onto its band.
///
/// Total over every `f64`: each comparison against NaN is false, so NaN
/// drops through to `ErrorData` alongside the infinities.
pub fn classify(bqi: f64) -> HealthState {
    if (80.0..=100.0).contains(&bqi) {
        HealthState::Excellent
    } else if (60.0..80.0).contains(&bqi) {
        HealthState::Good
    } else if (40.0..60.0).contains(&bqi) {
        HealthState::Fair
    } else if (20.0..40.0).contains(&bqi) {
        HealthState::Poor
    } else if (0.0..20.0).contains(&bqi) {
        HealthState::Critical
    } else {
        HealthState::ErrorData
    }
}
