//! # usersearch-rest - HTTP API over user and cross-index search
//!
//! This crate exposes the operations of
//! [`QueryGateway`](usersearch_persistence::QueryGateway) as a JSON HTTP API:
//! listing, lookup and mutation of user documents, plus a family of searches
//! that span every index in the cluster.
//!
//! ## Engine Support
//!
//! The engine is any [`SearchEngine`] implementation:
//!
//! - `elasticsearch` - An Elasticsearch cluster (default feature)
//! - [`MemoryEngine`](usersearch_persistence::backends::memory::MemoryEngine) -
//!   In-process engine, always available
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use usersearch_persistence::backends::memory::MemoryEngine;
//! use usersearch_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::for_testing();
//!     let app = create_app_with_config(MemoryEngine::new(), config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern |
//! |-----------|-------------|-------------|
//! | list | GET | `/api/users` |
//! | create | POST | `/api/users` |
//! | sorted listing | GET | `/api/users/sorted` |
//! | field projection | GET | `/api/users/fields` |
//! | lookup | GET | `/api/users/{id}` |
//! | update | PUT | `/api/users/{id}` |
//! | delete | DELETE | `/api/users/{id}` |
//! | cross-index lookup | GET | `/api/search/any/{id}` |
//! | name prefix | GET | `/api/search/wildcard?query=` |
//! | fuzzy | GET | `/api/search/fuzzy?query=` |
//! | name or title | GET | `/api/search/bool?query=` |
//! | lenient multi-field | GET | `/api/search/multi-match?query=` |
//! | name or title prefix | GET | `/api/search/wildcard-fields?query=` |
//! | analyzed infix | GET | `/api/search/analyzed?query=` |
//!
//! Lookups that find nothing answer `204 No Content`; listings answer `[]`.
//!
//! ## Error Handling
//!
//! Errors are returned as `{"error": {"status", "code", "message"}}`:
//!
//! | HTTP Status | Code | Description |
//! |-------------|------|-------------|
//! | 400 | invalid | Malformed body, missing `name` or `query` |
//! | 404 | not-found | Update or delete of a missing document |
//! | 404 | index-not-found | The users index does not exist |
//! | 422 | processing | The engine rejected the query |
//! | 502 | bad-gateway | The engine answered with a failure or unusable data |
//! | 503 | unavailable | The engine could not be reached |
//! | 500 | exception | Internal server error |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and JSON error bodies
//! - [`config`] - Server configuration
//! - [`state`] - Application state (gateway, configuration)
//! - [`handlers`] - HTTP request handlers
//! - [`extractors`] - Axum extractors for bodies and query parameters
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::{ServerConfig, StorageMode};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use usersearch_persistence::core::SearchEngine;

/// Creates the Axum application with default configuration.
///
/// This is a convenience function that creates the app with default settings.
/// For more control, use [`create_app_with_config`].
pub fn create_app<E>(engine: E) -> Router
where
    E: SearchEngine + 'static,
{
    create_app_with_config(engine, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Example
///
/// ```rust
/// use usersearch_persistence::backends::memory::MemoryEngine;
/// use usersearch_rest::{ServerConfig, create_app_with_config};
///
/// let config = ServerConfig {
///     users_index: "people".to_string(),
///     ..ServerConfig::for_testing()
/// };
/// let app = create_app_with_config(MemoryEngine::new(), config);
/// ```
pub fn create_app_with_config<E>(engine: E, config: ServerConfig) -> Router
where
    E: SearchEngine + 'static,
{
    create_app_with_shared_engine(Arc::new(engine), config)
}

/// Creates the Axum application over an engine the caller keeps a handle to.
pub fn create_app_with_shared_engine<E>(engine: Arc<E>, config: ServerConfig) -> Router
where
    E: SearchEngine + 'static,
{
    info!(
        engine = engine.engine_name(),
        users_index = %config.users_index,
        "Creating REST API server"
    );

    let state = AppState::new(engine, config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ))
        .map_response(axum::response::IntoResponse::into_response)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_size));

    let router = router.layer(service_builder);

    // Add CORS if enabled
    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    // Request IDs are set outermost so tracing and responses both see them
    if config.enable_request_id {
        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    } else {
        router
    }
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "usersearch_rest={level},usersearch_persistence={level},usersearch={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
