//! Background status poll loop, one task per pending batch.
//!
//! Every `poll_interval` the loop asks the task backend for the batch's
//! per-job statuses. Poll failures are logged and swallowed so a transient
//! backend hiccup does not abandon in-flight tracking; there is no backoff
//! and no retry cap. The loop ends exactly once: when every job reports
//! terminal success (batch completed, final update broadcast, channel
//! closed) or when the relay shuts down.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use aureole_core::batch::{BatchState, RequestKey};

use crate::bus::BatchUpdate;
use crate::relay::JobRelay;
use crate::runner::STATUS_SUCCESS;

/// Run the poll loop for one batch. Iterations are strictly sequential;
/// loops for different batches run independently.
pub(crate) async fn run(
    relay: Arc<JobRelay>,
    key: RequestKey,
    job_ids: Vec<String>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(relay.poll_interval());
    let mut last_statuses: Option<Vec<String>> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(request_key = %key, "Poll loop cancelled");
                break;
            }
            _ = interval.tick() => {
                let statuses = match relay.runner().statuses(&job_ids).await {
                    Ok(statuses) => statuses,
                    Err(e) => {
                        // Availability over strict surfacing: keep polling.
                        tracing::warn!(request_key = %key, error = %e, "Status poll failed");
                        continue;
                    }
                };

                let all_succeeded =
                    !statuses.is_empty() && statuses.iter().all(|s| s == STATUS_SUCCESS);

                if all_succeeded {
                    relay.mark_completed(&key).await;
                    relay
                        .bus()
                        .publish(BatchUpdate {
                            request_key: key.clone(),
                            state: BatchState::Completed,
                            job_statuses: statuses,
                            timestamp: chrono::Utc::now(),
                        })
                        .await;
                    relay.bus().close(&key).await;
                    tracing::info!(request_key = %key, "Batch completed");
                    break;
                }

                // Only a change in the observed statuses is an update.
                if last_statuses.as_ref() != Some(&statuses) {
                    relay
                        .bus()
                        .publish(BatchUpdate {
                            request_key: key.clone(),
                            state: BatchState::Pending,
                            job_statuses: statuses.clone(),
                            timestamp: chrono::Utc::now(),
                        })
                        .await;
                    last_statuses = Some(statuses);
                }
            }
        }
    }
}
