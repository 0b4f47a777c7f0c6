//! Route and handler for the `/catalog` resource.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use aureole_catalog::{filter, fuzzy_filter};
use aureole_core::catalog::{CatalogItem, ItemKey, ItemKind};
use aureole_core::selection::SelectionSet;
use aureole_core::types::{RepoId, Timestamp};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Search text; absent or empty returns the first page of the catalog.
    #[serde(default)]
    pub q: Option<String>,
    /// Use fuzzy (edit-distance) matching instead of substring matching.
    #[serde(default)]
    pub fuzzy: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// Filtered items, capped at the filter's result limit.
    pub items: Vec<CatalogItem>,
    /// Size of the full catalog snapshot, not of the filtered view.
    pub total_items: usize,
    pub last_updated: Option<Timestamp>,
}

/// GET /api/v1/catalog?q=<string>&fuzzy=<bool>
///
/// Serves the catalog through the TTL cache and filters it against the
/// query. Returns 502 `UPSTREAM_UNAVAILABLE` when the cache misses and
/// the catalog service cannot be reached; an empty match list is a valid
/// 200, not an error.
async fn get_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
) -> AppResult<Json<CatalogResponse>> {
    let catalog = state.catalog.get().await?;

    let query = params.q.as_deref().unwrap_or("");
    let items = if params.fuzzy {
        fuzzy_filter(&catalog, query)
    } else {
        filter(&catalog, query)
    };

    tracing::debug!(
        query,
        fuzzy = params.fuzzy,
        matched = items.len(),
        "Catalog filtered"
    );

    Ok(Json(CatalogResponse {
        items,
        total_items: catalog.total_items,
        last_updated: catalog.last_updated,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Selected item keys: repository ids and/or organization names.
    #[serde(default)]
    pub selections: Vec<ItemKey>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    /// Distinct repository ids covered by the selection, first-seen order.
    pub repo_ids: Vec<RepoId>,
}

/// POST /api/v1/catalog/convert
///
/// Resolve a tag selection into the flat repository-id list the job
/// endpoints accept. Repository ids pass through as themselves; an
/// organization name expands to its member repositories via the catalog.
/// Organization names the catalog does not know are skipped.
async fn convert_selection(
    State(state): State<AppState>,
    Json(input): Json<ConvertRequest>,
) -> AppResult<Json<ConvertResponse>> {
    let catalog = state.catalog.get().await?;

    let mut selection = SelectionSet::new();
    for key in input.selections {
        match key {
            ItemKey::Repo(id) => {
                let item = catalog
                    .items
                    .iter()
                    .find(|i| i.kind == ItemKind::Repository && i.key == ItemKey::Repo(id))
                    .cloned()
                    .unwrap_or_else(|| CatalogItem::repository(id.to_string(), id));
                selection.add(item);
            }
            ItemKey::Org(name) => {
                if let Some(item) = catalog
                    .items
                    .iter()
                    .find(|i| i.kind == ItemKind::Organization && i.key == ItemKey::Org(name.clone()))
                {
                    selection.add(item.clone());
                }
            }
        }
    }

    Ok(Json(ConvertResponse {
        repo_ids: selection.repo_ids(),
    }))
}

/// Routes mounted at `/catalog`.
///
/// ```text
/// GET    /           -> get_catalog
/// POST   /convert    -> convert_selection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_catalog))
        .route("/convert", post(convert_selection))
}
