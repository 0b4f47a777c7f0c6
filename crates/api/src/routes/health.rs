use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether a fresh catalog snapshot is currently cached.
    pub catalog_cached: bool,
}

/// GET /health -- returns service health and cache warmth.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog_cached = state.catalog.is_fresh(chrono::Utc::now()).await;

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        catalog_cached,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
