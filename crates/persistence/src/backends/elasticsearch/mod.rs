//! Elasticsearch backend implementation.
//!
//! [`ElasticsearchBackend`] implements [`SearchEngine`](crate::core::SearchEngine)
//! over the official client. Each engine call maps onto one REST request:
//!
//! | Call | Request |
//! |------|---------|
//! | `search` | `POST /{index or _all}/_search` |
//! | `index` | `POST /{index}/_doc` |
//! | `update` | `POST /{index}/_update/{id}` with `{"doc": ...}` |
//! | `delete` | `DELETE /{index}/_doc/{id}` |
//! | `refresh` | `POST /{index}/_refresh` |
//! | `health_check` | `GET /_cluster/health` |
//!
//! # Example
//!
//! ```ignore
//! use usersearch_persistence::backends::elasticsearch::{
//!     ElasticsearchBackend, ElasticsearchConfig, ensure_users_index,
//! };
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let backend = ElasticsearchBackend::new(config)?;
//! ensure_users_index(&backend, "users").await?;
//! ```

mod backend;
mod engine;
mod schema;

pub use backend::{ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig};
pub use schema::{ensure_users_index, users_index_mapping};
