use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    models::responses::{AnomaliesResponse, ErrorResponse},
};

/// Handler for GET /metrics/anomalies
///
/// Returns the 3-sigma flagged transactions and the burst-anomaly groups
/// of the published generation. The two lists are independent and may
/// contain the same transaction.
pub async fn get_anomalies(
    State(state): State<AppState>,
) -> Result<Json<AnomaliesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let generation = state.store.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No analytics generation published yet".to_string(),
            }),
        )
    })?;

    tracing::debug!(
        "Serving {} flagged transactions and {} burst groups from generation {}",
        generation.anomalies.flagged.len(),
        generation.anomalies.burst_groups.len(),
        generation.generation_id
    );

    Ok(Json(AnomaliesResponse::from(&generation.anomalies)))
}
