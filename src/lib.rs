// src/lib.rs

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use services::store::AggregationStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AggregationStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Arc::new(AggregationStore::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub mod models {
    pub mod analytics;
    pub mod record;
    pub mod responses;
}

pub mod services {
    pub mod anomaly;
    pub mod cohort;
    pub mod compute;
    pub mod segmentation;
    pub mod store;
}

pub mod handlers {
    pub mod anomalies;
    pub mod churn;
    pub mod cohorts;
    pub mod customers;
    pub mod revenue;
    pub mod segments;
    pub mod snapshot;
    pub mod status;
}

/// Build the API router. Shared between `main` and the integration tests.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status::root))
        .route("/health", get(handlers::status::health))
        .route("/api/status", get(handlers::status::api_status))
        .route("/snapshot", post(handlers::snapshot::ingest_snapshot))
        .route("/metrics/churn", get(handlers::churn::get_churn_metrics))
        .route("/metrics/anomalies", get(handlers::anomalies::get_anomalies))
        .route("/segments/high_value", get(handlers::segments::get_high_value_segments))
        .route("/analytics/revenue", get(handlers::revenue::get_revenue_analytics))
        .route("/analytics/customers", get(handlers::customers::get_customer_analytics))
        .route("/analytics/cohorts", get(handlers::cohorts::get_cohort_retention))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
