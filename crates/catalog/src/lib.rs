//! Catalog search cache for the Aureole backend.
//!
//! Serves the catalog of selectable repository/organization items with low
//! latency:
//!
//! - [`CatalogClient`] / [`HttpCatalogClient`] — upstream fetch over HTTP.
//! - [`CatalogCache`] — time-bounded in-memory cache (24 h TTL by default).
//! - [`filter`] / [`fuzzy_filter`] — query filtering over a snapshot.

pub mod cache;
pub mod client;
pub mod filter;

pub use cache::CatalogCache;
pub use client::{CatalogClient, CatalogFetchError, HttpCatalogClient};
pub use filter::{filter, fuzzy_filter, MAX_RESULTS};
