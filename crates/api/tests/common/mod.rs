//! Shared test harness: the full application router wired to scripted
//! upstreams, plus small request/response helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use aureole_api::config::ServerConfig;
use aureole_api::routes;
use aureole_api::state::AppState;
use aureole_catalog::{CatalogCache, CatalogClient, CatalogFetchError};
use aureole_core::catalog::{Catalog, CatalogItem};
use aureole_core::types::RepoId;
use aureole_relay::{JobRelay, TaskRunner, TaskRunnerError};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        catalog_api_url: "http://catalog.invalid".to_string(),
        task_api_url: "http://tasks.invalid".to_string(),
        catalog_cache_ttl_secs: 86400,
        poll_interval_secs: 10,
    }
}

// ---------------------------------------------------------------------------
// Scripted upstreams
// ---------------------------------------------------------------------------

/// Catalog upstream serving a fixed three-item catalog, optionally failing.
pub struct MockCatalog {
    pub fail: bool,
    pub fetches: AtomicUsize,
}

impl MockCatalog {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            fetches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CatalogFetchError::Api {
                status: 500,
                body: "upstream down".into(),
            });
        }
        Ok(Catalog::new(
            vec![
                CatalogItem::repository("https://github.com/chaoss/augur", 1),
                CatalogItem::repository("https://github.com/chaoss/grimoirelab", 2),
                CatalogItem::organization("chaoss", vec![1, 2]),
            ],
            None,
        ))
    }
}

/// Task backend whose jobs never finish (statuses stay RUNNING), so batch
/// snapshots observed by tests are deterministically pending.
pub struct MockRunner {
    pub fail_submit: bool,
    pub submit_calls: AtomicUsize,
}

impl MockRunner {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_submit: false,
            submit_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_submit: true,
            submit_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TaskRunner for MockRunner {
    async fn submit(&self, repo_ids: &[RepoId]) -> Result<Vec<String>, TaskRunnerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit {
            return Err(TaskRunnerError::Api {
                status: 503,
                body: "task backend down".into(),
            });
        }
        Ok(repo_ids.iter().map(|id| format!("job-{id}")).collect())
    }

    async fn statuses(&self, job_ids: &[String]) -> Result<Vec<String>, TaskRunnerError> {
        Ok(vec!["RUNNING".to_string(); job_ids.len()])
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with all middleware layers, using the
/// given scripted upstreams.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(
    catalog_client: Arc<dyn CatalogClient>,
    runner: Arc<dyn TaskRunner>,
) -> Router {
    let config = test_config();

    let catalog = Arc::new(CatalogCache::new(
        catalog_client,
        Duration::from_secs(config.catalog_cache_ttl_secs),
    ));
    let relay = JobRelay::new(runner, Duration::from_secs(config.poll_interval_secs));

    let state = AppState {
        config: Arc::new(config),
        catalog,
        relay,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:3000".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Default app: healthy catalog, task backend that accepts everything.
pub fn default_app() -> Router {
    build_test_app(MockCatalog::ok(), MockRunner::ok())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
