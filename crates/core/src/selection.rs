//! The user's current tag selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::types::RepoId;

/// Ordered, duplicate-free set of chosen catalog items.
///
/// Items are compared by `(kind, key)`. Both mutations are pure state
/// transitions with no I/O: `add` is a no-op when the tag is already
/// present, `remove` drops the matching tag if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    items: Vec<CatalogItem>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &CatalogItem) -> bool {
        self.items.iter().any(|tag| tag.same_tag(item))
    }

    /// Add a tag. Duplicate adds (same kind and key) are no-ops.
    pub fn add(&mut self, item: CatalogItem) {
        if !self.contains(&item) {
            self.items.push(item);
        }
    }

    /// Remove a tag by its `(kind, key)` identity.
    pub fn remove(&mut self, item: &CatalogItem) {
        self.items.retain(|tag| !tag.same_tag(item));
    }

    /// Flatten the selection into the distinct repository ids it covers,
    /// in first-seen order.
    pub fn repo_ids(&self) -> Vec<RepoId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for item in &self.items {
            for &id in &item.member_repo_ids {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}
