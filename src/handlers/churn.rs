use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    models::responses::{ChurnMetricsResponse, ErrorResponse},
};

/// Handler for GET /metrics/churn
pub async fn get_churn_metrics(
    State(state): State<AppState>,
) -> Result<Json<ChurnMetricsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let generation = state.store.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No analytics generation published yet".to_string(),
            }),
        )
    })?;

    tracing::debug!(
        "Serving churn metrics from generation {}",
        generation.generation_id
    );

    Ok(Json(ChurnMetricsResponse::from(&generation.churn)))
}
