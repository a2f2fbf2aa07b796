//! HTTP boundary for the scanner.

use crate::application::scanner::ScanService;
use crate::domain::scan::{ScanReport, ScanResult};
use crate::infrastructure::observability::Metrics;
use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<ScanService>,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    /// Threshold in billions. Kept as text so a malformed value reads as zero
    /// instead of rejecting the request.
    pub min_mcap: Option<String>,
}

impl ScanQuery {
    pub fn threshold_billion(&self) -> f64 {
        self.min_mcap
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
            .map(|v| v.max(0.0))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub universe: usize,
}

/// Build the router. `/metrics` is only mounted when `metrics_enabled`.
pub fn router(state: AppState, metrics_enabled: bool) -> Router {
    let mut app = Router::new()
        .route("/api/scan", get(scan))
        .route("/api/scan/report", get(report))
        .route("/health", get(health));
    if metrics_enabled {
        app = app.route("/metrics", get(metrics));
    }
    app.with_state(state)
}

pub async fn scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Json<Vec<ScanResult>> {
    Json(state.scanner.scan(query.threshold_billion()).await)
}

pub async fn report(
    State(state): State<AppState>,
) -> Result<Json<ScanReport>, StatusCode> {
    state
        .scanner
        .last_report()
        .map(|report| Json(report.as_ref().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        universe: state.scanner.universe_size(),
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
