//! Application state shared by all request handlers.

use std::sync::Arc;

use usersearch_persistence::core::SearchEngine;
use usersearch_persistence::gateway::QueryGateway;

use crate::config::ServerConfig;

/// Shared application state for the REST API.
///
/// Holds the query gateway, which owns the engine handle, and the server
/// configuration. Cloning is cheap; both live behind `Arc`s.
///
/// # Type Parameters
///
/// * `E` - The search engine type (must implement [`SearchEngine`])
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use usersearch_persistence::backends::memory::MemoryEngine;
/// use usersearch_rest::{AppState, ServerConfig};
///
/// let state = AppState::new(Arc::new(MemoryEngine::new()), ServerConfig::for_testing());
/// assert_eq!(state.gateway().settings().users_index, "users");
/// ```
pub struct AppState<E> {
    gateway: QueryGateway<E>,
    config: Arc<ServerConfig>,
}

// E sits behind an Arc inside the gateway and need not be Clone
impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: SearchEngine> AppState<E> {
    /// Creates a new AppState with the given engine and configuration.
    ///
    /// Gateway settings (users index, page size, refresh policy) are taken
    /// from the configuration.
    pub fn new(engine: Arc<E>, config: ServerConfig) -> Self {
        let gateway = QueryGateway::new(engine, config.gateway_settings());
        Self {
            gateway,
            config: Arc::new(config),
        }
    }

    /// Returns the query gateway.
    pub fn gateway(&self) -> &QueryGateway<E> {
        &self.gateway
    }

    /// Returns the search engine.
    pub fn engine(&self) -> &E {
        self.gateway.engine()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the base URL for the server.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }
}
