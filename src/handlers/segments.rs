use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    models::responses::{ErrorResponse, HighValueSegmentsResponse, round2},
};

/// Handler for GET /segments/high_value
///
/// Customers at or above the 80th percentile of total spend, sorted by
/// total spend descending (customer id as tiebreaker), together with
/// the cutoff itself.
pub async fn get_high_value_segments(
    State(state): State<AppState>,
) -> Result<Json<HighValueSegmentsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let generation = state.store.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No analytics generation published yet".to_string(),
            }),
        )
    })?;

    let threshold = generation.high_value_threshold;
    let mut summaries: Vec<_> = generation
        .customer_summaries
        .iter()
        .filter(|s| threshold.map_or(false, |t| s.total_spent >= t))
        .collect();
    summaries.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });

    Ok(Json(HighValueSegmentsResponse {
        high_value_threshold: threshold.map(round2),
        customers: summaries.into_iter().map(Into::into).collect(),
    }))
}
