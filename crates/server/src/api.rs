//! Scoring API
//!
//! - POST /predict, POST /api/predict - score one sensor record
//! - GET /health, GET /api/health - build and model status
//!
//! Successful responses carry exactly `healthIndex`, `healthState` and
//! `recommendedAction`. Failures carry an `ErrorReport` and never a partial
//! result.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use bqi_core::{
    ErrorReport, PredictError, Predictor, ScoringError, ScoringResult, ScoringService,
};

use crate::health::{check_health, HealthCheckConfig, HealthResponse, ModelSource};

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    service: ScoringService,
    model_source: ModelSource,
    predict_timeout: Duration,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        model_source: ModelSource,
        predict_timeout: Duration,
    ) -> Self {
        Self {
            service: ScoringService::new(predictor),
            model_source,
            predict_timeout,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

// ============================================================================
// Error Response
// ============================================================================

/// A scoring failure on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    report: ErrorReport,
}

impl ApiError {
    fn status_for(err: &ScoringError) -> StatusCode {
        match err {
            ScoringError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ScoringError::PredictionFailure(PredictError::Schema(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ScoringError::PredictionFailure(PredictError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ScoringError::PredictionFailure(PredictError::Timeout(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ScoringError::InvalidModelOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        Self {
            status: Self::status_for(&err),
            report: err.report(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let err = ScoringError::InvalidRequest(rejection.body_text());
        // Keep axum's 4xx (415 content type, 413 body limit); anything else is a 400
        let status = if rejection.status().is_client_error() {
            rejection.status()
        } else {
            StatusCode::BAD_REQUEST
        };
        Self {
            status,
            report: err.report(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.report)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn predict(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ScoringResult>, ApiError> {
    let request_id = uuid::Uuid::new_v4();

    let outcome = match payload {
        Ok(Json(payload)) => score(&state, payload).await.map_err(ApiError::from),
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    match &outcome {
        // Still a valid response, but the model has drifted out of band
        Ok(result) if result.health_state.is_error() => tracing::warn!(
            %request_id,
            health_index = result.health_index,
            "Model score outside the 0-100 index range, returning {}",
            result.health_state
        ),
        Ok(result) => tracing::info!(
            %request_id,
            health_index = result.health_index,
            health_state = %result.health_state,
            "Scored request"
        ),
        Err(err) if err.status.is_client_error() => tracing::warn!(
            %request_id,
            status = err.status.as_u16(),
            error = err.report.code.as_str(),
            "Rejected request: {}",
            err.report.message
        ),
        Err(err) => tracing::error!(
            %request_id,
            status = err.status.as_u16(),
            error = err.report.code.as_str(),
            "Scoring failed: {}",
            err.report.message
        ),
    }

    outcome.map(Json)
}

/// Validate on the request task, then run the one model call on the blocking
/// pool under the configured budget.
async fn score(state: &SharedState, payload: Value) -> Result<ScoringResult, ScoringError> {
    let record = state.service.prepare(payload)?;

    let service = state.service.clone();
    let task = tokio::task::spawn_blocking(move || service.score_record(&record));

    match tokio::time::timeout(state.predict_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(PredictError::Internal(format!(
            "scoring task aborted: {}",
            join_err
        ))
        .into()),
        Err(_) => Err(PredictError::Timeout(state.predict_timeout.as_millis() as u64).into()),
    }
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(check_health(&HealthCheckConfig {
        predictor: state.service.predictor().as_ref(),
        model_source: &state.model_source,
        started_at: state.started_at,
    }))
}

// ============================================================================
// Router
// ============================================================================

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/api/predict", post(predict))
        .route("/health", get(health))
        .route("/api/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use bqi_core::WeightedSensorModel;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(WeightedSensorModel::builtin()),
            ModelSource::Builtin,
            Duration::from_secs(1),
        );
        api_router(Arc::new(state))
    }

    #[tokio::test]
    async fn test_health_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_without_content_type_is_415() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ScoringError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                PredictError::Schema("x".into()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PredictError::Internal("x".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (PredictError::Timeout(5).into(), StatusCode::GATEWAY_TIMEOUT),
            (
                ScoringError::InvalidModelOutput("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
