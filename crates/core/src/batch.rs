//! Job batches and their canonical request keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{RepoId, Timestamp};

/// Canonical identity of a submitted repo-id set.
///
/// Two submissions with the same set of ids, in any order and with any
/// duplication, produce the same key. The key is a structured value over
/// the sorted, deduplicated ids, so `[1, 23]` and `[12, 3]` can never
/// collide the way a naive string join would let them.
///
/// `Display` renders the sorted comma-joined form for URLs and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RequestKey {
    ids: Vec<RepoId>,
}

impl RequestKey {
    /// Canonicalize a repo-id list: sort, deduplicate. Empty input yields
    /// `None`; an empty set is not a submittable batch.
    pub fn new(mut ids: Vec<RepoId>) -> Option<Self> {
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            None
        } else {
            Some(Self { ids })
        }
    }

    /// The canonical (sorted, deduplicated) repo ids.
    pub fn repo_ids(&self) -> &[RepoId] {
        &self.ids
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in &self.ids {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{id}")?;
            first = false;
        }
        Ok(())
    }
}

/// Error parsing a request key from its comma-joined string form.
#[derive(Debug, thiserror::Error)]
#[error("Invalid request key: {0}")]
pub struct ParseRequestKeyError(String);

impl FromStr for RequestKey {
    type Err = ParseRequestKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(|part| part.trim().parse::<RepoId>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseRequestKeyError(s.to_string()))?;
        RequestKey::new(ids).ok_or_else(|| ParseRequestKeyError(s.to_string()))
    }
}

impl From<RequestKey> for String {
    fn from(key: RequestKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for RequestKey {
    type Error = ParseRequestKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Lifecycle of a job batch.
///
/// `Pending` is initial; `Completed` is terminal and entered only when
/// every backend job reports terminal success. There is no failed state:
/// a batch whose backend jobs never succeed stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Pending,
    Completed,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchState::Completed)
    }
}

/// A deduplicated unit of submitted work, tracked to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobBatch {
    pub request_key: RequestKey,
    pub repo_ids: Vec<RepoId>,
    pub submitted_at: Timestamp,
    pub state: BatchState,
    /// Backend job ids returned by the task runner. Empty when the
    /// submission call itself failed; a resubmit with the same key will
    /// retry the call in that case.
    pub backend_job_ids: Vec<String>,
}

impl JobBatch {
    /// A freshly submitted, still-running batch.
    pub fn pending(request_key: RequestKey, submitted_at: Timestamp) -> Self {
        let repo_ids = request_key.repo_ids().to_vec();
        Self {
            request_key,
            repo_ids,
            submitted_at,
            state: BatchState::Pending,
            backend_job_ids: Vec::new(),
        }
    }
}
