// bqi-server main.rs
// HTTP scoring endpoint for the Bridge Quality Index

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use bqi_core::{Predictor, WeightedSensorModel};
use bqi_server::{build_app, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bqi_server=info,bqi_core=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::parse();

    // The model is loaded once, before the listener exists, and never mutated
    let predictor: Arc<dyn Predictor> = match &config.model {
        Some(path) => Arc::new(
            WeightedSensorModel::load(path)
                .with_context(|| format!("Failed to load model artifact {:?}", path))?,
        ),
        None => {
            tracing::warn!("No model artifact configured, using built-in calibration");
            Arc::new(WeightedSensorModel::builtin())
        }
    };

    tracing::info!("🧠 Model: {} ({})", predictor.name(), config.model_source());
    tracing::info!("⏱️ Prediction timeout: {} ms", config.predict_timeout_ms);

    let state = Arc::new(AppState::new(
        predictor,
        config.model_source(),
        config.predict_timeout(),
    ));
    let app = build_app(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 BQI scoring server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
