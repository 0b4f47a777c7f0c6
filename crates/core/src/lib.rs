//! Shared domain types for the Aureole backend.
//!
//! This crate holds the pure data model used by both the catalog search
//! cache and the job status relay: catalog items and snapshots, the user's
//! tag selection, job batches and their canonical request keys, and the
//! domain error enum. No I/O lives here.

pub mod batch;
pub mod catalog;
pub mod error;
pub mod selection;
pub mod types;

pub use batch::{BatchState, JobBatch, RequestKey};
pub use catalog::{CacheEntry, Catalog, CatalogItem, ItemKey, ItemKind};
pub use error::CoreError;
pub use selection::SelectionSet;
