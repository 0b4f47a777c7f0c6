/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the catalog service.
    pub catalog_api_url: String,
    /// Base URL of the task runner service.
    pub task_api_url: String,
    /// Catalog cache TTL in seconds (default: 24 hours).
    pub catalog_cache_ttl_secs: u64,
    /// Interval between job status polls in seconds (default: `10`).
    pub poll_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                   |
    /// |--------------------------|---------------------------|
    /// | `HOST`                   | `0.0.0.0`                 |
    /// | `PORT`                   | `3000`                    |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`   |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                      |
    /// | `CATALOG_API_URL`        | `http://localhost:5001`   |
    /// | `TASK_API_URL`           | `http://localhost:4995`   |
    /// | `CATALOG_CACHE_TTL_SECS` | `86400`                   |
    /// | `POLL_INTERVAL_SECS`     | `10`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let catalog_api_url =
            std::env::var("CATALOG_API_URL").unwrap_or_else(|_| "http://localhost:5001".into());

        let task_api_url =
            std::env::var("TASK_API_URL").unwrap_or_else(|_| "http://localhost:4995".into());

        let catalog_cache_ttl_secs: u64 = std::env::var("CATALOG_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("CATALOG_CACHE_TTL_SECS must be a valid u64");

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            catalog_api_url,
            task_api_url,
            catalog_cache_ttl_secs,
            poll_interval_secs,
        }
    }
}
