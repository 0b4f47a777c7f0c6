use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use aureole_catalog::CatalogFetchError;
use aureole_core::error::CoreError;
use aureole_relay::SubmitError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and the upstream client errors,
/// and implements [`IntoResponse`] to produce consistent JSON error
/// responses of the shape `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `aureole_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The catalog service was unreachable or answered with an error.
    #[error("Catalog upstream unavailable: {0}")]
    Upstream(#[from] CatalogFetchError),

    /// Batch submission failed (validation or the task backend call).
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with key {key} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Upstream failures ---
            // Surfaced once to the caller; no automatic retry. The caller
            // (the UI) owns user-visible messaging and manual retry.
            AppError::Upstream(err) => {
                tracing::warn!(error = %err, "Catalog upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "Failed to fetch data from the catalog service".to_string(),
                )
            }

            AppError::Submit(SubmitError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Submit(SubmitError::Submission(err)) => {
                tracing::warn!(error = %err, "Task submission upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "SUBMISSION_ERROR",
                    "Failed to submit jobs to the task backend".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
