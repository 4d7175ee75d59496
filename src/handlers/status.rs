use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    AppState,
    models::responses::{ApiStatusResponse, HealthResponse},
};

pub async fn root() -> &'static str {
    "Commerce Analytics API"
}

/// Handler for GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        data_loaded: state.store.current().is_some(),
        timestamp: Utc::now(),
    })
}

/// Handler for GET /api/status
pub async fn api_status(State(state): State<AppState>) -> Json<ApiStatusResponse> {
    let generation = state.store.current();
    Json(ApiStatusResponse {
        api_version: env!("CARGO_PKG_VERSION").to_string(),
        data_status: if generation.is_some() {
            "loaded".to_string()
        } else {
            "not_loaded".to_string()
        },
        generation_id: generation.as_ref().map(|g| g.generation_id.to_string()),
        as_of: generation.as_ref().map(|g| g.as_of),
        data_summary: generation.as_ref().map(|g| g.record_counts),
        causality_exclusions: generation.as_ref().map(|g| g.causality_exclusions),
        available_endpoints: vec![
            "/metrics/churn".to_string(),
            "/metrics/anomalies".to_string(),
            "/segments/high_value".to_string(),
            "/analytics/revenue".to_string(),
            "/analytics/customers".to_string(),
            "/analytics/cohorts".to_string(),
        ],
    })
}
