//! BQI Server Library
//!
//! Exposes the scoring router and its state for in-process testing.

pub mod api;
pub mod config;
pub mod health;

pub use api::{api_router, ApiError, AppState, SharedState};
pub use config::ServerConfig;
pub use health::{
    check_health, BuildInfo, HealthCheckConfig, HealthResponse, HealthVerdict, ModelSource,
    ModelStatus,
};

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full application: scoring routes plus CORS and request tracing
pub fn build_app(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
