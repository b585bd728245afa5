//! Server configuration from CLI flags with environment fallbacks
//!
//! Usage:
//!   bqi-server --port 5000 --model models/bridge_model.json
//!   BQI_SERVER_PORT=8080 BQI_PREDICT_TIMEOUT_MS=500 bqi-server

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::health::ModelSource;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PREDICT_TIMEOUT_MS: u64 = 2_000;

/// Bridge Quality Index scoring server
#[derive(Parser, Debug, Clone)]
#[command(name = "bqi-server")]
#[command(about = "Serves POST /predict: sensor record in, health index and state out")]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(short, long, env = "BQI_SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BQI_SERVER_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Model artifact (JSON). The built-in calibration is used when absent.
    #[arg(short, long, env = "BQI_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Per-request prediction budget in milliseconds
    #[arg(
        long,
        env = "BQI_PREDICT_TIMEOUT_MS",
        default_value_t = DEFAULT_PREDICT_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub predict_timeout_ms: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }

    pub fn model_source(&self) -> ModelSource {
        match &self.model {
            Some(path) => ModelSource::Artifact(path.clone()),
            None => ModelSource::Builtin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["bqi-server"]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.addr(), "0.0.0.0:5000");
        assert!(config.model.is_none());
        assert_eq!(config.model_source(), ModelSource::Builtin);
        assert_eq!(config.predict_timeout(), Duration::from_millis(2_000));
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "bqi-server",
            "-p",
            "8080",
            "--bind",
            "127.0.0.1",
            "--model",
            "models/bridge_model.json",
            "--predict-timeout-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(
            config.model_source(),
            ModelSource::Artifact(PathBuf::from("models/bridge_model.json"))
        );
        assert_eq!(config.predict_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ServerConfig::try_parse_from(["bqi-server", "--predict-timeout-ms", "0"]);
        assert!(result.is_err());
    }
}
