//! The search engine capability trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::types::{RefreshPolicy, SearchRequest, SearchResponse};

/// Capabilities the gateway needs from a search engine.
///
/// Each method maps to one engine call. Implementations translate engine
/// failures into [`StorageError`](crate::error::StorageError) variants:
///
/// * `Resource(NotFound)` - the document addressed by `update`/`delete` is missing
/// * `Search(IndexNotFound)` - the target index does not exist
/// * `Search(QueryRejected)` - the engine refused the query
/// * `Backend(..)` - the engine is unreachable or answered with a failure status
///
/// # Example
///
/// ```ignore
/// use usersearch_persistence::core::SearchEngine;
/// use usersearch_persistence::query::Query;
/// use usersearch_persistence::types::SearchRequest;
///
/// async fn count_users<E: SearchEngine>(engine: &E) -> StorageResult<usize> {
///     let response = engine
///         .search(&SearchRequest::index("users", Query::MatchAll))
///         .await?;
///     Ok(response.hits.len())
/// }
/// ```
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Returns a human-readable name for this engine.
    fn engine_name(&self) -> &'static str;

    /// Executes a search request.
    async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResponse>;

    /// Indexes a new document and returns the id the engine assigned to it.
    async fn index(
        &self,
        index: &str,
        document: Value,
        refresh: RefreshPolicy,
    ) -> StorageResult<String>;

    /// Merges `partial` into the existing document `index/id`.
    async fn update(
        &self,
        index: &str,
        id: &str,
        partial: Value,
        refresh: RefreshPolicy,
    ) -> StorageResult<()>;

    /// Removes the document `index/id`.
    async fn delete(&self, index: &str, id: &str, refresh: RefreshPolicy) -> StorageResult<()>;

    /// Makes recently written documents in `index` visible to search.
    async fn refresh(&self, index: &str) -> StorageResult<()>;

    /// Checks that the engine is reachable and healthy.
    async fn health_check(&self) -> StorageResult<()>;
}
