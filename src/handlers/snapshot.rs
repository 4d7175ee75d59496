use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    models::responses::{ErrorResponse, SnapshotAccepted, SnapshotPayload},
    services::compute,
};

/// Handler for POST /snapshot
///
/// Entry point for the ingestion collaborator: recomputes all derived
/// tables from the submitted record set and publishes them as a new
/// generation. On an input integrity error the recomputation is rejected
/// in full and the prior generation remains published.
pub async fn ingest_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<SnapshotPayload>,
) -> Result<(StatusCode, Json<SnapshotAccepted>), (StatusCode, Json<ErrorResponse>)> {
    let (snapshot, as_of) = payload.into_parts();

    let generation = compute::compute_generation(&snapshot, as_of).map_err(|e| {
        tracing::warn!("Snapshot rejected, keeping prior generation: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let published = state.store.publish(generation);

    Ok((
        StatusCode::CREATED,
        Json(SnapshotAccepted {
            generation_id: published.generation_id.to_string(),
            as_of: published.as_of,
            customers: published.record_counts.customers,
            transactions: published.record_counts.transactions,
            events: published.record_counts.events,
            causality_exclusions: published.causality_exclusions,
        }),
    ))
}
