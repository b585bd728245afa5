//! /health endpoint
//!
//! Reports build info and the model the server was started with:
//! - Build info
//! - Loaded model name, source and required features
//! - Uptime
//!
//! The model is loaded before the listener binds, so a server that answers
//! this endpoint is always able to score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use bqi_core::Predictor;

// ============================================================================
// Health Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub build: BuildInfo,
    pub model: ModelStatus,
    pub verdict: HealthVerdict,
    pub uptime_secs: i64,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_time: Option<String>,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_sha: option_env!("GIT_SHA").map(String::from),
            build_time: option_env!("BUILD_TIME").map(String::from),
        }
    }
}

/// Where the serving model came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Built-in calibration, no artifact configured
    Builtin,
    Artifact(PathBuf),
}

impl ModelSource {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("builtin"),
            Self::Artifact(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub name: String,
    /// Artifact path, or "builtin"
    pub source: String,
    pub builtin: bool,
    pub required_features: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Healthy,
    Degraded,
}

impl HealthVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
        }
    }
}

// ============================================================================
// Health Check Implementation
// ============================================================================

pub struct HealthCheckConfig<'a> {
    pub predictor: &'a dyn Predictor,
    pub model_source: &'a ModelSource,
    pub started_at: DateTime<Utc>,
}

pub fn check_health(config: &HealthCheckConfig<'_>) -> HealthResponse {
    let now = Utc::now();
    let required_features = config.predictor.required_features().to_vec();

    // Uncalibrated for this site, or a model that ignores its inputs
    let verdict = if config.model_source.is_builtin() || required_features.is_empty() {
        HealthVerdict::Degraded
    } else {
        HealthVerdict::Healthy
    };

    HealthResponse {
        build: BuildInfo::current(),
        model: ModelStatus {
            name: config.predictor.name().to_string(),
            source: config.model_source.to_string(),
            builtin: config.model_source.is_builtin(),
            required_features,
            loaded_at: config.started_at,
        },
        verdict,
        uptime_secs: (now - config.started_at).num_seconds().max(0),
        checked_at: now,
    }
}
