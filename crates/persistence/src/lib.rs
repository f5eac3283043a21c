//! usersearch persistence layer
//!
//! This crate holds everything that talks to the search engine on behalf of the
//! HTTP API: the engine capability trait, a typed query DSL, the record types
//! that flow through the API, and the [`gateway::QueryGateway`] that turns each
//! API operation into exactly one engine call.
//!
//! # Features
//!
//! - `elasticsearch` (default) - Elasticsearch backend built on the official client
//!
//! The in-memory engine in [`backends::memory`] is always available. It evaluates
//! the query DSL over documents held in process and is used for local development
//! and tests.
//!
//! # Architecture
//!
//! - [`core`] - The [`SearchEngine`](core::SearchEngine) capability trait
//! - [`query`] - Typed query DSL that serializes to the engine's request schema
//! - [`types`] - Records, search requests and responses
//! - [`gateway`] - The query gateway
//! - [`error`] - Error types for all operations
//! - [`backends`] - Engine implementations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use usersearch_persistence::backends::memory::MemoryEngine;
//! use usersearch_persistence::gateway::{GatewaySettings, QueryGateway};
//! use usersearch_persistence::types::UserRecord;
//!
//! # tokio_test_block_on(async {
//! let gateway = QueryGateway::new(Arc::new(MemoryEngine::new()), GatewaySettings::default());
//!
//! let id = gateway
//!     .create(UserRecord::named("Alice").with_age(30))
//!     .await
//!     .unwrap();
//!
//! let found = gateway.get_by_id("Alice").await.unwrap().unwrap();
//! assert_eq!(found.id.as_deref(), Some(id.as_str()));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod gateway;
pub mod query;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use gateway::{GatewaySettings, QueryGateway};
