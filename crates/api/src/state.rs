use std::sync::Arc;

use aureole_catalog::CatalogCache;
use aureole_relay::JobRelay;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The catalog
/// cache and the job relay are the two process-wide registries; they are
/// injected here rather than living in globals so tests can substitute
/// scripted upstreams.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// TTL-bounded catalog cache.
    pub catalog: Arc<CatalogCache>,
    /// Job batch registry and status fan-out.
    pub relay: Arc<JobRelay>,
}
