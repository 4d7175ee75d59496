use std::env;

use commerce_analytics::{AppState, api_router, models::responses::SnapshotPayload, services::compute};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,commerce_analytics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let state = AppState::new();

    // Optionally publish an initial generation from a snapshot file
    // produced by the ingestion collaborator (or `generate_snapshot`).
    if let Ok(path) = env::var("SNAPSHOT_PATH") {
        match load_snapshot(&state, &path) {
            Ok(()) => tracing::info!("Published initial generation from {}", path),
            Err(e) => tracing::error!("Failed to load snapshot from {}: {}", path, e),
        }
    }

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

fn load_snapshot(
    state: &AppState,
    path: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let raw = std::fs::read_to_string(path)?;
    let payload: SnapshotPayload = serde_json::from_str(&raw)?;
    let (snapshot, as_of) = payload.into_parts();
    let generation = compute::compute_generation(&snapshot, as_of)?;
    state.store.publish(generation);
    Ok(())
}
