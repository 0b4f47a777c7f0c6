//! Catalog snapshot types.
//!
//! A [`Catalog`] is the fetched collection of selectable repository and
//! organization items. It is an immutable snapshot: the cache replaces it
//! wholesale on refresh and never mutates it in place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{RepoId, Timestamp};

/// Whether a catalog item names a single repository or a whole organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "repo")]
    Repository,
    #[serde(rename = "org")]
    Organization,
}

/// Stable identifier of a catalog item: the repository id for a repo,
/// the organization name for an org.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemKey {
    Repo(RepoId),
    Org(String),
}

/// A unit of selectable search content.
///
/// `label` carries the kind prefix shown in the dropdown (`repo: ...` /
/// `org: ...`); `original_label` is the unprefixed display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub label: String,
    pub key: ItemKey,
    pub kind: ItemKind,
    pub original_label: String,
    /// The repository id itself for a repository; every contained
    /// repository id for an organization. Never empty.
    pub member_repo_ids: Vec<RepoId>,
}

impl CatalogItem {
    /// Build a repository item. `member_repo_ids` is exactly `[id]`.
    pub fn repository(label: impl Into<String>, id: RepoId) -> Self {
        let original = label.into();
        Self {
            label: format!("repo: {original}"),
            key: ItemKey::Repo(id),
            kind: ItemKind::Repository,
            original_label: original,
            member_repo_ids: vec![id],
        }
    }

    /// Build an organization item over its contained repository ids.
    pub fn organization(name: impl Into<String>, member_repo_ids: Vec<RepoId>) -> Self {
        let original = name.into();
        Self {
            label: format!("org: {original}"),
            key: ItemKey::Org(original.clone()),
            kind: ItemKind::Organization,
            original_label: original,
            member_repo_ids,
        }
    }

    /// Selection identity: two items are the same tag when kind and key match.
    pub fn same_tag(&self, other: &CatalogItem) -> bool {
        self.kind == other.kind && self.key == other.key
    }
}

/// The fetched catalog snapshot, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
    pub total_items: usize,
    pub last_updated: Option<Timestamp>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>, last_updated: Option<Timestamp>) -> Self {
        let total_items = items.len();
        Self {
            items,
            total_items,
            last_updated,
        }
    }

    /// An empty catalog is a valid fetch result, not an error.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A cached catalog snapshot plus the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub catalog: Catalog,
    pub fetched_at: Timestamp,
}

impl CacheEntry {
    pub fn new(catalog: Catalog, fetched_at: Timestamp) -> Self {
        Self {
            catalog,
            fetched_at,
        }
    }

    /// An entry exactly at the TTL boundary counts as expired.
    pub fn is_expired(&self, now: Timestamp, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age >= chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
    }
}
