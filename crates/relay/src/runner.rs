//! REST client for the task runner endpoints of the analytics backend.
//!
//! Wraps the `run_tasks` (batch submission) and `task_status` (status
//! check) endpoints using [`reqwest`].

use async_trait::async_trait;
use serde::Deserialize;

use aureole_core::types::RepoId;

/// The terminal-success status string reported by the task backend.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Errors from the task runner REST layer.
#[derive(Debug, thiserror::Error)]
pub enum TaskRunnerError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The task backend returned a non-2xx status code.
    #[error("Task runner error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Task submission and status checking.
///
/// The relay depends on this trait rather than on a concrete HTTP client
/// so tests can script the backend's answers.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Submit one batch of repository ids. Returns the backend job ids,
    /// one per spawned job.
    async fn submit(&self, repo_ids: &[RepoId]) -> Result<Vec<String>, TaskRunnerError>;

    /// Check the status of previously submitted jobs. Returns one status
    /// string per job id, in request order.
    async fn statuses(&self, job_ids: &[String]) -> Result<Vec<String>, TaskRunnerError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SubmitResult {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    results: Vec<SubmitResult>,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    status: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    results: Vec<StatusResult>,
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Production [`TaskRunner`] over the analytics backend's HTTP API.
pub struct HttpTaskRunner {
    client: reqwest::Client,
    api_url: String,
}

impl HttpTaskRunner {
    /// Create a client for the task backend.
    ///
    /// * `api_url` - base HTTP URL, e.g. `http://localhost:4995`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or [`TaskRunnerError::Api`] with the status
    /// and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TaskRunnerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TaskRunnerError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TaskRunner for HttpTaskRunner {
    async fn submit(&self, repo_ids: &[RepoId]) -> Result<Vec<String>, TaskRunnerError> {
        let body = serde_json::json!({ "repo_ids": repo_ids });

        let response = self
            .client
            .post(format!("{}/api/run_tasks", self.api_url))
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<SubmitResponse>().await?;
        Ok(parsed.results.into_iter().map(|r| r.job_id).collect())
    }

    async fn statuses(&self, job_ids: &[String]) -> Result<Vec<String>, TaskRunnerError> {
        let body = serde_json::json!({ "job_ids": job_ids });

        let response = self
            .client
            .post(format!("{}/api/task_status", self.api_url))
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<StatusResponse>().await?;
        Ok(parsed.results.into_iter().map(|r| r.status).collect())
    }
}
