//! Routes and handlers for the `/jobs` resource.
//!
//! Batch submission is idempotent on the canonical request key; status
//! changes stream to subscribers over Server-Sent Events.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use aureole_core::batch::RequestKey;
use aureole_core::error::CoreError;
use aureole_core::types::RepoId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub repo_ids: Vec<RepoId>,
}

/// A request key that does not parse can never name a recorded batch,
/// so bad syntax and unknown keys both surface as 404.
fn batch_not_found(raw: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "JobBatch",
        key: raw.to_string(),
    })
}

fn parse_key(raw: &str) -> Result<RequestKey, AppError> {
    raw.parse().map_err(|_| batch_not_found(raw))
}

/// POST /api/v1/jobs
///
/// Submit a batch of repository ids. Returns 201 with the new batch, or
/// 200 with the existing one when the same id set was already submitted
/// (idempotent resubmission, no second backend call). 400 for an empty
/// id list, 502 when the task backend call fails.
async fn submit_batch(
    State(state): State<AppState>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
    let submission = state.relay.submit(input.repo_ids).await?;

    let status = if submission.created {
        tracing::info!(
            request_key = %submission.batch.request_key,
            "Batch submitted"
        );
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(submission.batch)))
}

/// GET /api/v1/jobs/{request_key}
///
/// Current snapshot of a batch; 404 if the key was never recorded.
async fn get_batch(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let key = parse_key(&raw_key)?;
    let batch = state
        .relay
        .get(&key)
        .await
        .ok_or_else(|| batch_not_found(&raw_key))?;

    Ok(Json(batch))
}

/// GET /api/v1/jobs/{request_key}/events
///
/// Push channel of batch status updates over Server-Sent Events. Emits an
/// immediate `connected` event carrying the current snapshot, then an
/// `update` event per observed status change, ending after the terminal
/// `completed` update. Subscribers that connect after completion get only
/// the `connected` event; there is no replay.
async fn batch_events(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let key = parse_key(&raw_key)?;
    let (batch, receiver) = state
        .relay
        .subscribe(&key)
        .await
        .ok_or_else(|| batch_not_found(&raw_key))?;

    let connected = Event::default().event("connected").json_data(serde_json::json!({
        "request_key": batch.request_key,
        "state": batch.state,
        "timestamp": chrono::Utc::now(),
    }));

    let updates = match receiver {
        Some(rx) => BroadcastStream::new(rx)
            // A lagged receiver skips the dropped updates and goes on;
            // the stream ends when the batch's channel closes.
            .filter_map(|item| async move { item.ok() })
            .map(|update| Event::default().event("update").json_data(&update))
            .boxed(),
        None => stream::empty().boxed(),
    };

    let stream = stream::once(async move { connected }).chain(updates);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Routes mounted at `/jobs`.
///
/// ```text
/// POST   /                        -> submit_batch
/// GET    /{request_key}           -> get_batch
/// GET    /{request_key}/events    -> batch_events (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_batch))
        .route("/{request_key}", get(get_batch))
        .route("/{request_key}/events", get(batch_events))
}
