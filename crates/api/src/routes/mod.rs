pub mod catalog;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /catalog                        filtered catalog (GET, ?q= & ?fuzzy=)
/// /catalog/convert                selection -> repo ids (POST)
///
/// /jobs                           submit batch (POST)
/// /jobs/{request_key}             batch snapshot (GET)
/// /jobs/{request_key}/events      status updates over SSE (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/jobs", jobs::router())
}
