//! Test servers for the HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};

use usersearch_persistence::backends::memory::MemoryEngine;
use usersearch_persistence::core::SearchEngine;
use usersearch_persistence::error::{StorageError, StorageResult};
use usersearch_persistence::types::{RefreshPolicy, SearchRequest, SearchResponse};
use usersearch_rest::{AppState, ServerConfig, routing};

/// Base URL the test servers put in `Location` headers.
pub const BASE_URL: &str = "http://localhost:8080";

/// Test configuration with a known base URL.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        base_url: BASE_URL.to_string(),
        ..ServerConfig::for_testing()
    }
}

/// Creates a test server over an empty in-memory engine.
pub fn create_test_server() -> (TestServer, Arc<MemoryEngine>) {
    create_test_server_with(test_config())
}

/// Creates a test server over an empty in-memory engine with custom configuration.
pub fn create_test_server_with(config: ServerConfig) -> (TestServer, Arc<MemoryEngine>) {
    let engine = Arc::new(MemoryEngine::new());
    let state = AppState::new(Arc::clone(&engine), config);
    let app = routing::create_routes(state);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, engine)
}

/// Creates a test server through the full middleware stack.
pub fn create_full_app_server(config: ServerConfig) -> (TestServer, Arc<MemoryEngine>) {
    let engine = Arc::new(MemoryEngine::new());
    let app = usersearch_rest::create_app_with_shared_engine(Arc::clone(&engine), config);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, engine)
}

/// Seeds three users and one book.
///
/// | index | id | document |
/// |-------|----|----------|
/// | users | u-alice | Alice, 30, Physics |
/// | users | u-bob | Bob, 25, Biology |
/// | users | u-alicia | alicia, 41 |
/// | books | b-dune | Dune, Frank Herbert |
pub fn seed(engine: &MemoryEngine) {
    engine.put(
        "users",
        "u-alice",
        json!({"name": "Alice", "age": 30, "education": "Physics"}),
    );
    engine.put(
        "users",
        "u-bob",
        json!({"name": "Bob", "age": 25, "education": "Biology"}),
    );
    engine.put("users", "u-alicia", json!({"name": "alicia", "age": 41}));
    engine.put(
        "books",
        "b-dune",
        json!({"title": "Dune", "authors": "Frank Herbert", "isbn": "9780441013593"}),
    );
}

/// Creates a seeded test server.
pub fn create_seeded_server() -> (TestServer, Arc<MemoryEngine>) {
    let (server, engine) = create_test_server();
    seed(&engine);
    (server, engine)
}

/// Engine whose every call fails with the same error.
pub struct FailingEngine {
    failure: fn() -> StorageError,
}

impl FailingEngine {
    pub fn new(failure: fn() -> StorageError) -> Self {
        Self { failure }
    }

    fn fail<T>(&self) -> StorageResult<T> {
        Err((self.failure)())
    }
}

#[async_trait]
impl SearchEngine for FailingEngine {
    fn engine_name(&self) -> &'static str {
        "failing"
    }

    async fn search(&self, _request: &SearchRequest) -> StorageResult<SearchResponse> {
        self.fail()
    }

    async fn index(
        &self,
        _index: &str,
        _document: Value,
        _refresh: RefreshPolicy,
    ) -> StorageResult<String> {
        self.fail()
    }

    async fn update(
        &self,
        _index: &str,
        _id: &str,
        _partial: Value,
        _refresh: RefreshPolicy,
    ) -> StorageResult<()> {
        self.fail()
    }

    async fn delete(&self, _index: &str, _id: &str, _refresh: RefreshPolicy) -> StorageResult<()> {
        self.fail()
    }

    async fn refresh(&self, _index: &str) -> StorageResult<()> {
        self.fail()
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.fail()
    }
}

/// Creates a test server whose engine always fails with `failure`.
pub fn create_failing_server(failure: fn() -> StorageError) -> TestServer {
    let state = AppState::new(Arc::new(FailingEngine::new(failure)), test_config());
    let app = routing::create_routes(state);
    TestServer::new(app).expect("Failed to create test server")
}
