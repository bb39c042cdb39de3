// SPDX-License-Identifier: MIT

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cronos::config::Settings;
use crate::cronos::report::ComplianceReport;
use crate::cronos::request::{Admission, AnalyzeRequest, ExtractRequest, ExtractResponse, SimulateRequest};
use crate::engine::error::{CronosError, Result};
use crate::engine::simulate::SimulationResult;
use crate::engine::Analyzer;

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let analyzer = settings.analyzer();
        Self {
            settings: Arc::new(settings),
            analyzer: Arc::new(analyzer),
        }
    }
}

/// Error response: 400 for caller mistakes, 500 otherwise
pub struct ApiError(CronosError);

impl<E: Into<CronosError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        log::warn!("Request failed ({}): {}", status, self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .route("/api/simulate", post(simulate))
        .route("/api/extract", post(extract))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(settings: Settings) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], settings.server.port));
    let app = router(AppState::new(settings));

    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> std::result::Result<Json<ComplianceReport>, ApiError> {
    request.admit(&state.settings.limits)?;
    let report = state.analyzer.analyze(&request)?;
    Ok(Json(ComplianceReport::new(report)))
}

pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> std::result::Result<Json<SimulationResult>, ApiError> {
    request.admit(&state.settings.limits)?;
    Ok(Json(request.run()?))
}

pub async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> std::result::Result<Json<ExtractResponse>, ApiError> {
    request.admit(&state.settings.limits)?;
    Ok(Json(request.run()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RiskLevel, Status};

    fn state() -> AppState {
        AppState::new(Settings::default())
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health_check().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_analyze_identical() {
        let request: AnalyzeRequest = serde_json::from_value(json!({
            "old_condition": "price > 50",
            "new_condition": "price > 50"
        }))
        .unwrap();
        let Ok(Json(report)) = analyze(State(state()), Json(request)).await else {
            panic!("analysis failed");
        };
        assert_eq!(report.summary.status, Status::Pass);
        assert_eq!(report.summary.risk_level, RiskLevel::Low);
        assert_eq!(report.summary.violation_count, 0);
    }

    #[tokio::test]
    async fn test_analyze_bad_condition_is_400() {
        let request: AnalyzeRequest = serde_json::from_value(json!({
            "old_condition": "price is high",
            "new_condition": "price > 50"
        }))
        .unwrap();
        let Err(err) = analyze(State(state()), Json(request)).await else {
            panic!("expected rejection");
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admission_rejects_large_source() {
        let mut settings = Settings::default();
        settings.limits.max_source_bytes = 4;
        let request = ExtractRequest {
            source_code: "if x > 1:\n    pass\n".to_string(),
        };
        let result = extract(State(AppState::new(settings)), Json(request)).await;
        assert!(matches!(
            result,
            Err(ApiError(CronosError::Request(_)))
        ));
    }

    #[test]
    fn test_io_errors_are_500() {
        let err = ApiError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
