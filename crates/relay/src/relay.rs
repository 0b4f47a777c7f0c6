//! The process-wide job batch registry.
//!
//! [`JobRelay`] owns the batch table, the per-batch update channels, and
//! the handle to the task backend. It is created once at startup, wrapped
//! in `Arc`, and injected into request handlers through application state
//! rather than living in a true global.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use aureole_core::batch::{JobBatch, RequestKey};
use aureole_core::types::RepoId;

use crate::bus::{BatchUpdate, UpdateBus};
use crate::poll;
use crate::runner::{TaskRunner, TaskRunnerError};

/// Default interval between status polls for one batch.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Errors from batch submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The submitted id list was empty or otherwise unusable.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The task backend call failed. The batch stays recorded as pending
    /// with no backend job ids; resubmitting the same key retries.
    #[error("Task submission failed: {0}")]
    Submission(#[from] TaskRunnerError),
}

/// Outcome of a submission, so the HTTP layer can distinguish a freshly
/// created batch from an idempotent dedup hit.
#[derive(Debug, Clone)]
pub struct Submission {
    pub batch: JobBatch,
    pub created: bool,
}

/// Job status relay: batch registry, poll-loop supervisor, and fan-out hub.
pub struct JobRelay {
    runner: Arc<dyn TaskRunner>,
    poll_interval: Duration,
    batches: RwLock<HashMap<RequestKey, JobBatch>>,
    /// Keys whose upstream submission call is currently outstanding, so a
    /// concurrent resubmit cannot trigger a second call.
    in_flight: RwLock<HashSet<RequestKey>>,
    bus: UpdateBus,
    shutdown: CancellationToken,
}

impl JobRelay {
    pub fn new(runner: Arc<dyn TaskRunner>, poll_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            runner,
            poll_interval,
            batches: RwLock::new(HashMap::new()),
            in_flight: RwLock::new(HashSet::new()),
            bus: UpdateBus::new(),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn with_default_interval(runner: Arc<dyn TaskRunner>) -> Arc<Self> {
        Self::new(runner, DEFAULT_POLL_INTERVAL)
    }

    /// Submit a batch of repository ids.
    ///
    /// The id list is canonicalized into a [`RequestKey`]; resubmission of
    /// the same set (any order, any duplication) is idempotent and does
    /// not call the backend again. The one exception is a recorded batch
    /// whose earlier submission call failed (empty `backend_job_ids`):
    /// resubmitting it retries the upstream call.
    pub async fn submit(self: &Arc<Self>, repo_ids: Vec<RepoId>) -> Result<Submission, SubmitError> {
        let key = RequestKey::new(repo_ids)
            .ok_or_else(|| SubmitError::Validation("repo_ids must be a non-empty list".into()))?;

        // Record the pending batch and mark the key in flight in one
        // guarded section, so a concurrent resubmit of the same set sees
        // either the recorded job ids or the in-flight marker — the
        // upstream call happens at most once per key.
        {
            let mut batches = self.batches.write().await;
            let mut in_flight = self.in_flight.write().await;

            if let Some(batch) = batches.get(&key) {
                let dedup_hit = !batch.backend_job_ids.is_empty()
                    || batch.state.is_terminal()
                    || in_flight.contains(&key);
                if dedup_hit {
                    tracing::debug!(request_key = %key, "Duplicate submission collapsed");
                    return Ok(Submission {
                        batch: batch.clone(),
                        created: false,
                    });
                }
            }

            batches
                .entry(key.clone())
                .or_insert_with(|| JobBatch::pending(key.clone(), chrono::Utc::now()));
            in_flight.insert(key.clone());
        }
        self.bus.open(key.clone()).await;

        let submit_result = self.runner.submit(key.repo_ids()).await;
        self.in_flight.write().await.remove(&key);

        let job_ids = match submit_result {
            Ok(job_ids) => job_ids,
            Err(e) => {
                tracing::warn!(request_key = %key, error = %e, "Task submission failed");
                return Err(e.into());
            }
        };

        let batch = {
            let mut batches = self.batches.write().await;
            let batch = batches
                .entry(key.clone())
                .or_insert_with(|| JobBatch::pending(key.clone(), chrono::Utc::now()));
            batch.backend_job_ids = job_ids.clone();
            batch.clone()
        };

        tracing::info!(
            request_key = %key,
            jobs = job_ids.len(),
            "Batch submitted, poll loop starting"
        );

        tokio::spawn(poll::run(
            Arc::clone(self),
            key,
            job_ids,
            self.shutdown.child_token(),
        ));

        Ok(Submission {
            batch,
            created: true,
        })
    }

    /// Snapshot of a recorded batch, if any.
    pub async fn get(&self, key: &RequestKey) -> Option<JobBatch> {
        self.batches.read().await.get(key).cloned()
    }

    /// Subscribe to a batch's status updates.
    ///
    /// Returns `None` for an unknown key. For a known batch the receiver
    /// is `None` when the batch has already completed — late subscribers
    /// get no replay, only the current snapshot.
    pub async fn subscribe(
        &self,
        key: &RequestKey,
    ) -> Option<(JobBatch, Option<broadcast::Receiver<BatchUpdate>>)> {
        let batch = self.get(key).await?;
        let receiver = self.bus.subscribe(key).await;
        Some((batch, receiver))
    }

    /// Cancel every poll loop. Used on graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn runner(&self) -> &dyn TaskRunner {
        self.runner.as_ref()
    }

    pub(crate) fn bus(&self) -> &UpdateBus {
        &self.bus
    }

    /// Mark a batch completed. Terminal: once set it never reverts.
    pub(crate) async fn mark_completed(&self, key: &RequestKey) {
        if let Some(batch) = self.batches.write().await.get_mut(key) {
            batch.state = aureole_core::batch::BatchState::Completed;
        }
    }
}
