use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    models::analytics::CohortCell,
    models::responses::ErrorResponse,
};

/// Handler for GET /analytics/cohorts
///
/// The full retention matrix, one row per populated (cohort_month,
/// period_offset) pair, sorted by cohort month then offset.
pub async fn get_cohort_retention(
    State(state): State<AppState>,
) -> Result<Json<Vec<CohortCell>>, (StatusCode, Json<ErrorResponse>)> {
    let generation = state.store.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No analytics generation published yet".to_string(),
            }),
        )
    })?;

    Ok(Json(generation.cohort_cells.clone()))
}
