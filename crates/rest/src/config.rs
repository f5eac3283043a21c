//! Server configuration for the usersearch HTTP API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `USERSEARCH_PORT` | 8080 | Server port |
//! | `USERSEARCH_HOST` | 127.0.0.1 | Host to bind |
//! | `USERSEARCH_LOG_LEVEL` | info | Log level |
//! | `USERSEARCH_MAX_BODY_SIZE` | 1048576 | Max request body (bytes) |
//! | `USERSEARCH_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `USERSEARCH_ENABLE_CORS` | true | Enable CORS |
//! | `USERSEARCH_CORS_ORIGINS` | * | Allowed origins |
//! | `USERSEARCH_CORS_METHODS` | GET,POST,PUT,DELETE,OPTIONS | Allowed methods |
//! | `USERSEARCH_CORS_HEADERS` | Content-Type,Authorization,Accept,X-Request-ID | Allowed headers |
//! | `USERSEARCH_BASE_URL` | http://localhost:8080 | Base URL for `Location` headers |
//! | `USERSEARCH_ENABLE_REQUEST_ID` | true | Set and propagate `x-request-id` |
//! | `USERSEARCH_STORAGE` | elasticsearch | Engine: `elasticsearch` or `memory` |
//! | `USERSEARCH_ES_NODES` | http://localhost:9200 | Elasticsearch node URLs (comma-separated) |
//! | `USERSEARCH_ES_USERNAME` | - | Basic auth username |
//! | `USERSEARCH_ES_PASSWORD` | - | Basic auth password |
//! | `USERSEARCH_ES_TIMEOUT_MS` | 30000 | Elasticsearch request timeout |
//! | `USERSEARCH_ES_INSECURE` | false | Skip TLS certificate validation |
//! | `USERSEARCH_USERS_INDEX` | users | Index holding user documents |
//! | `USERSEARCH_PAGE_SIZE` | - | Page size for unbounded listings |
//! | `USERSEARCH_REFRESH` | off | Write visibility: `off`, `wait_for`, `immediate` |
//! | `USERSEARCH_SKIP_INDEX_BOOTSTRAP` | false | Do not create the users index at startup |
//!
//! # Example
//!
//! ```rust
//! use usersearch_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     enable_cors: true,
//!     ..Default::default()
//! };
//! ```

use std::fmt;

use clap::{Parser, ValueEnum};
use usersearch_persistence::gateway::{GatewaySettings, USERS_INDEX};
use usersearch_persistence::types::RefreshPolicy;

/// Which search engine serves the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageMode {
    /// An Elasticsearch cluster.
    #[default]
    Elasticsearch,
    /// The in-process engine; data is lost on restart.
    Memory,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Elasticsearch => write!(f, "elasticsearch"),
            StorageMode::Memory => write!(f, "memory"),
        }
    }
}

/// Server configuration for the usersearch HTTP API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "usersearch")]
#[command(about = "HTTP API over Elasticsearch user and cross-index search")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "USERSEARCH_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "USERSEARCH_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "USERSEARCH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "USERSEARCH_MAX_BODY_SIZE", default_value = "1048576")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "USERSEARCH_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "USERSEARCH_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "USERSEARCH_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "USERSEARCH_CORS_METHODS",
        default_value = "GET,POST,PUT,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "USERSEARCH_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept,X-Request-ID"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers).
    #[arg(long, env = "USERSEARCH_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Enable request ID tracking.
    #[arg(long, env = "USERSEARCH_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Search engine serving the API.
    #[arg(long, env = "USERSEARCH_STORAGE", value_enum, default_value = "elasticsearch")]
    pub storage: StorageMode,

    /// Elasticsearch node URLs.
    #[arg(
        long,
        env = "USERSEARCH_ES_NODES",
        value_delimiter = ',',
        default_value = "http://localhost:9200"
    )]
    pub es_nodes: Vec<String>,

    /// Elasticsearch basic auth username.
    #[arg(long, env = "USERSEARCH_ES_USERNAME")]
    pub es_username: Option<String>,

    /// Elasticsearch basic auth password.
    #[arg(long, env = "USERSEARCH_ES_PASSWORD")]
    pub es_password: Option<String>,

    /// Elasticsearch request timeout in milliseconds.
    #[arg(long, env = "USERSEARCH_ES_TIMEOUT_MS", default_value = "30000")]
    pub es_timeout_ms: u64,

    /// Skip TLS certificate validation. Development only.
    #[arg(long, env = "USERSEARCH_ES_INSECURE", default_value = "false")]
    pub es_insecure: bool,

    /// Index holding user documents.
    #[arg(long, env = "USERSEARCH_USERS_INDEX", default_value = USERS_INDEX)]
    pub users_index: String,

    /// Page size for listings that do not fix their own. Engine default when unset.
    #[arg(long, env = "USERSEARCH_PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// When writes become visible to search (off, wait_for, immediate).
    #[arg(long, env = "USERSEARCH_REFRESH", default_value = "off")]
    pub refresh: RefreshPolicy,

    /// Do not create the users index at startup.
    #[arg(long, env = "USERSEARCH_SKIP_INDEX_BOOTSTRAP", default_value = "false")]
    pub skip_index_bootstrap: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept,X-Request-ID".to_string(),
            base_url: "http://localhost:8080".to_string(),
            enable_request_id: true,
            storage: StorageMode::Elasticsearch,
            es_nodes: vec!["http://localhost:9200".to_string()],
            es_username: None,
            es_password: None,
            es_timeout_ms: 30000,
            es_insecure: false,
            users_index: USERS_INDEX.to_string(),
            page_size: None,
            refresh: RefreshPolicy::Off,
            skip_index_bootstrap: false,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse_from(["usersearch"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the gateway settings derived from this configuration.
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            users_index: self.users_index.clone(),
            page_size: self.page_size,
            refresh: self.refresh,
        }
    }

    /// Returns the Elasticsearch backend configuration.
    #[cfg(feature = "elasticsearch")]
    pub fn elasticsearch_config(
        &self,
    ) -> usersearch_persistence::backends::elasticsearch::ElasticsearchConfig {
        use usersearch_persistence::backends::elasticsearch::{
            ElasticsearchAuth, ElasticsearchConfig,
        };

        let auth = match (&self.es_username, &self.es_password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ElasticsearchConfig {
            nodes: self.es_nodes.clone(),
            request_timeout_ms: self.es_timeout_ms,
            auth,
            disable_certificate_validation: self.es_insecure,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.page_size == Some(0) {
            errors.push("Page size cannot be 0".to_string());
        }

        if self.users_index.trim().is_empty() {
            errors.push("Users index cannot be empty".to_string());
        } else if self.users_index.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(format!(
                "Users index '{}' must be lowercase",
                self.users_index
            ));
        }

        if self.storage == StorageMode::Elasticsearch {
            if self.es_nodes.iter().all(|n| n.trim().is_empty()) {
                errors.push("At least one Elasticsearch node is required".to_string());
            }
            if self.es_username.is_some() != self.es_password.is_some() {
                errors.push(
                    "Elasticsearch username and password must be set together".to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0, the in-memory engine, and disables features
    /// that might interfere with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            log_level: "debug".to_string(),
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "http://localhost:0".to_string(),
            enable_request_id: false,
            storage: StorageMode::Memory,
            skip_index_bootstrap: true,
            ..Default::default()
        }
    }
}
