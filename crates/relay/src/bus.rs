//! Per-batch broadcast fan-out of status updates.
//!
//! Each pending batch owns one `tokio::sync::broadcast` channel keyed by
//! its [`RequestKey`]. Subscribers receive every update published for
//! that key; when the batch completes the sender is dropped so every
//! subscriber's stream ends. Slow or disconnected receivers are handled
//! by the broadcast primitive itself: a failed delivery is an implicit
//! unsubscribe, never an error for the publisher.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use aureole_core::batch::{BatchState, RequestKey};
use aureole_core::types::Timestamp;

/// Buffer capacity per batch channel.
const CHANNEL_CAPACITY: usize = 64;

/// One observed status change for a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub request_key: RequestKey,
    pub state: BatchState,
    /// Per-job backend statuses as observed by the poll that produced
    /// this update, in job order.
    pub job_statuses: Vec<String>,
    pub timestamp: Timestamp,
}

/// Registry of per-batch broadcast channels.
pub struct UpdateBus {
    channels: RwLock<HashMap<RequestKey, broadcast::Sender<BatchUpdate>>>,
}

impl UpdateBus {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Open a channel for a batch. Idempotent: an existing channel for
    /// the key is kept.
    pub async fn open(&self, key: RequestKey) {
        let mut channels = self.channels.write().await;
        channels
            .entry(key)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
    }

    /// Subscribe to a batch's updates. Returns `None` when no channel is
    /// open for the key (unknown batch, or already completed — late
    /// subscribers get no replay).
    pub async fn subscribe(&self, key: &RequestKey) -> Option<broadcast::Receiver<BatchUpdate>> {
        self.channels
            .read()
            .await
            .get(key)
            .map(|sender| sender.subscribe())
    }

    /// Publish an update to all current subscribers of the batch.
    ///
    /// With zero subscribers the update is silently dropped.
    pub async fn publish(&self, update: BatchUpdate) {
        if let Some(sender) = self.channels.read().await.get(&update.request_key) {
            // Ignore the SendError — it only means there are no receivers.
            let _ = sender.send(update);
        }
    }

    /// Close a batch's channel, ending every subscriber's stream.
    pub async fn close(&self, key: &RequestKey) {
        self.channels.write().await.remove(key);
    }

    /// Number of open channels (pending batches with fan-out).
    pub async fn open_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ids: &[i64]) -> RequestKey {
        RequestKey::new(ids.to_vec()).unwrap()
    }

    fn update(key: &RequestKey, state: BatchState) -> BatchUpdate {
        BatchUpdate {
            request_key: key.clone(),
            state,
            job_statuses: vec!["RUNNING".into()],
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_updates() {
        let bus = UpdateBus::new();
        let k = key(&[1, 2]);
        bus.open(k.clone()).await;

        let mut rx = bus.subscribe(&k).await.expect("channel should be open");
        bus.publish(update(&k, BatchState::Pending)).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.request_key, k);
        assert_eq!(received.state, BatchState::Pending);
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = UpdateBus::new();
        let k = key(&[1]);
        bus.open(k.clone()).await;
        bus.publish(update(&k, BatchState::Pending)).await;
    }

    #[tokio::test]
    async fn close_ends_subscriber_streams_and_blocks_late_subscribers() {
        let bus = UpdateBus::new();
        let k = key(&[1]);
        bus.open(k.clone()).await;

        let mut rx = bus.subscribe(&k).await.unwrap();
        bus.close(&k).await;

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        assert!(bus.subscribe(&k).await.is_none());
        assert_eq!(bus.open_count().await, 0);
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let bus = UpdateBus::new();
        let k = key(&[1]);
        bus.open(k.clone()).await;

        let mut rx = bus.subscribe(&k).await.unwrap();
        // A second open must not replace the channel and orphan rx.
        bus.open(k.clone()).await;
        bus.publish(update(&k, BatchState::Pending)).await;

        assert!(rx.recv().await.is_ok());
    }
}
