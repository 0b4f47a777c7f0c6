//! HTTP client for the catalog service.
//!
//! Wraps the analytics backend's `/api/data` endpoint with [`reqwest`] and
//! maps its JSON payload onto the core [`Catalog`] snapshot. Only the
//! fields the search pipeline needs are deserialized; everything else in
//! the upstream response is ignored.

use async_trait::async_trait;
use serde::Deserialize;

use aureole_core::catalog::{Catalog, CatalogItem, ItemKey, ItemKind};
use aureole_core::types::{RepoId, Timestamp};

/// Errors from the catalog fetch layer.
#[derive(Debug, thiserror::Error)]
pub enum CatalogFetchError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog service returned a non-2xx status code.
    #[error("Catalog service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Source of catalog snapshots.
///
/// The cache depends on this trait rather than on a concrete HTTP client
/// so tests can substitute a scripted upstream.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch a fresh catalog snapshot. A snapshot with zero items is a
    /// valid result, not an error.
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogFetchError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One entry of the upstream `all_items` list.
#[derive(Debug, Deserialize)]
struct WireItem {
    label: String,
    value: serde_json::Value,
    #[serde(rename = "type")]
    item_type: String,
    original_label: String,
    #[serde(default)]
    repo_ids: Vec<RepoId>,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    total_items: Option<usize>,
    #[serde(default)]
    last_updated: Option<Timestamp>,
}

/// Upstream response envelope. `repositories` / `organizations` are also
/// present but redundant with `all_items`, which preserves upstream order.
#[derive(Debug, Deserialize)]
struct WireResponse {
    all_items: Vec<WireItem>,
    #[serde(default)]
    metadata: Option<WireMetadata>,
}

impl WireItem {
    fn into_item(self) -> Option<CatalogItem> {
        let (kind, key) = match self.item_type.as_str() {
            "repo" => (ItemKind::Repository, ItemKey::Repo(self.value.as_i64()?)),
            "org" => (
                ItemKind::Organization,
                ItemKey::Org(self.value.as_str()?.to_string()),
            ),
            _ => return None,
        };

        // Older upstream payloads omit repo_ids; a repository's set is
        // always just its own id.
        let member_repo_ids = if self.repo_ids.is_empty() {
            match key {
                ItemKey::Repo(id) => vec![id],
                ItemKey::Org(_) => return None,
            }
        } else {
            self.repo_ids
        };

        Some(CatalogItem {
            label: self.label,
            key,
            kind,
            original_label: self.original_label,
            member_repo_ids,
        })
    }
}

fn catalog_from_wire(wire: WireResponse) -> Catalog {
    let items: Vec<CatalogItem> = wire
        .all_items
        .into_iter()
        .filter_map(WireItem::into_item)
        .collect();

    let last_updated = wire.metadata.as_ref().and_then(|m| m.last_updated);
    let mut catalog = Catalog::new(items, last_updated);
    if let Some(total) = wire.metadata.and_then(|m| m.total_items) {
        catalog.total_items = total;
    }
    catalog
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Production [`CatalogClient`] over the analytics backend's HTTP API.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    api_url: String,
}

impl HttpCatalogClient {
    /// Create a client for the catalog service.
    ///
    /// * `api_url` - base HTTP URL, e.g. `http://localhost:5001`.
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
    /// unchanged on success, or [`CatalogFetchError::Api`] with the status
    /// and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CatalogFetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogFetchError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogFetchError> {
        let response = self
            .client
            .get(format!("{}/api/data", self.api_url))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let wire = response.json::<WireResponse>().await?;
        Ok(catalog_from_wire(wire))
    }
}
