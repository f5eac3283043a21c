//! The query gateway.
//!
//! [`QueryGateway`] translates each API operation into a single call against
//! the injected [`SearchEngine`] and maps the engine's answer back into
//! [`UserRecord`]s or loosely typed [`Document`]s.
//!
//! | Operation | Target | Query |
//! |-----------|--------|-------|
//! | [`list_all`](QueryGateway::list_all) | users | `match_all` |
//! | [`get_by_id`](QueryGateway::get_by_id) | users | `term` OR `match` on `name` |
//! | [`get_across_indices`](QueryGateway::get_across_indices) | all | `multi_match` on `name`, `title` |
//! | [`wildcard_prefix`](QueryGateway::wildcard_prefix) | all | `bool.should` wildcard `name`, first 10 |
//! | [`sorted_listing`](QueryGateway::sorted_listing) | users | `match_all`, sort by `name` |
//! | [`field_projection`](QueryGateway::field_projection) | users | `match_all`, source `name`, `age` |
//! | [`fuzzy_search`](QueryGateway::fuzzy_search) | users | fuzzy `multi_match` on `name`, `education` |
//! | [`bool_or`](QueryGateway::bool_or) | all | `match` `name` OR `match` `title` |
//! | [`multi_field_or`](QueryGateway::multi_field_or) | all | user fields OR book fields |
//! | [`wildcard_fields`](QueryGateway::wildcard_fields) | all | wildcard `name` OR wildcard `title` |
//! | [`analyzed_wildcard`](QueryGateway::analyzed_wildcard) | all | `query_string` `*query*` |
//!
//! Absence of a match is never an error: list operations return an empty
//! vector and single lookups return `None`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::SearchEngine;
use crate::error::{SearchError, StorageResult, ValidationError};
use crate::query::{BoolQuery, Fuzziness, Query};
use crate::types::{Document, Hit, RefreshPolicy, SearchRequest, SortField, UserRecord};

/// Default name of the users index.
pub const USERS_INDEX: &str = "users";

/// Number of hits returned by the wildcard prefix search.
pub const WILDCARD_PAGE_SIZE: usize = 10;

const NAME: &str = "name";
const TITLE: &str = "title";

/// Holds the unanalyzed value of a text field.
fn keyword(field: &str) -> String {
    format!("{}.keyword", field)
}

/// Settings that shape the requests the gateway issues.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Index holding user documents.
    pub users_index: String,
    /// Page size applied to listings that do not fix their own; engine default when unset.
    pub page_size: Option<usize>,
    /// Visibility policy for create, update and delete.
    pub refresh: RefreshPolicy,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            users_index: USERS_INDEX.to_string(),
            page_size: None,
            refresh: RefreshPolicy::Off,
        }
    }
}

/// Translates API operations into engine calls.
pub struct QueryGateway<E> {
    engine: Arc<E>,
    settings: GatewaySettings,
}

impl<E> Clone for QueryGateway<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            settings: self.settings.clone(),
        }
    }
}

impl<E: SearchEngine> QueryGateway<E> {
    /// Creates a gateway over the given engine.
    pub fn new(engine: Arc<E>, settings: GatewaySettings) -> Self {
        Self { engine, settings }
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the gateway settings.
    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn users(&self, query: Query) -> SearchRequest {
        SearchRequest::index(self.settings.users_index.as_str(), query)
    }

    // ------------------------------------------------------------------
    // Typed listings over the users index
    // ------------------------------------------------------------------

    /// Returns every document in the users index.
    pub async fn list_all(&self) -> StorageResult<Vec<UserRecord>> {
        let request = self.users(Query::MatchAll).size_opt(self.settings.page_size);
        self.search_users(request).await
    }

    /// Returns the first user whose `name` equals or textually matches `id`.
    pub async fn get_by_id(&self, id: &str) -> StorageResult<Option<UserRecord>> {
        let query = Query::term(NAME, id).or(Query::matches(NAME, id));
        let users = self.search_users(self.users(query)).await?;
        Ok(users.into_iter().next())
    }

    /// Returns every user sorted by ascending `name`.
    pub async fn sorted_listing(&self) -> StorageResult<Vec<UserRecord>> {
        let request = self
            .users(Query::MatchAll)
            .sort_by(SortField::asc(keyword(NAME)))
            .size_opt(self.settings.page_size);
        self.search_users(request).await
    }

    /// Returns every user with only `name` and `age` populated.
    pub async fn field_projection(&self) -> StorageResult<Vec<UserRecord>> {
        let request = self
            .users(Query::MatchAll)
            .include_fields([NAME, "age"])
            .size_opt(self.settings.page_size);
        self.search_users(request).await
    }

    /// Matches `name` and `education` with automatic fuzziness.
    pub async fn fuzzy_search(&self, query: &str) -> StorageResult<Vec<UserRecord>> {
        let text = require_query(query)?;
        let q = Query::multi_match([NAME, "education"], text).with_fuzziness(Fuzziness::Auto);
        self.search_users(self.users(q)).await
    }

    // ------------------------------------------------------------------
    // Loosely typed queries across every index
    // ------------------------------------------------------------------

    /// Returns the source of the first document in any index whose `name` or
    /// `title` matches `id`.
    ///
    /// When hits exist but none has an object source the result is a
    /// [`SearchError::UnexpectedShape`] rather than a best-effort cast.
    pub async fn get_across_indices(&self, id: &str) -> StorageResult<Option<Document>> {
        let request = SearchRequest::all_indices(Query::multi_match([NAME, TITLE], id));
        let response = self.engine.search(&request).await?;

        if response.hits.is_empty() {
            return Ok(None);
        }

        let hit_count = response.hits.len();
        match response
            .hits
            .into_iter()
            .find_map(|hit| as_document(hit.source))
        {
            Some(doc) => Ok(Some(doc)),
            None => {
                warn!(id = %id, hits = hit_count, "No hit carried an object source");
                Err(SearchError::UnexpectedShape {
                    message: format!("none of {} hits has an object source", hit_count),
                }
                .into())
            }
        }
    }

    /// Matches documents whose raw `name` starts with `query`, first 10 hits.
    pub async fn wildcard_prefix(&self, query: &str) -> StorageResult<Vec<Document>> {
        let text = require_query(query)?;
        let q = Query::Bool(BoolQuery::new().should(Query::wildcard(keyword(NAME), prefix(text))));
        let request = SearchRequest::all_indices(q)
            .from(0)
            .size(WILDCARD_PAGE_SIZE);
        self.search_documents(request).await
    }

    /// Matches `name` OR `title` against `query`.
    pub async fn bool_or(&self, query: &str) -> StorageResult<Vec<Document>> {
        let text = require_query(query)?;
        let q = Query::matches(NAME, text).or(Query::matches(TITLE, text));
        self.search_documents(SearchRequest::all_indices(q)).await
    }

    /// Matches the user fields OR the book fields against `query`.
    pub async fn multi_field_or(&self, query: &str) -> StorageResult<Vec<Document>> {
        let text = require_query(query)?;
        let q = Query::multi_match([NAME, "age", "education"], text)
            .lenient()
            .or(Query::multi_match([TITLE, "authors", "isbn"], text).lenient());
        self.search_documents(SearchRequest::all_indices(q)).await
    }

    /// Matches raw `name` OR raw `title` starting with `query`.
    pub async fn wildcard_fields(&self, query: &str) -> StorageResult<Vec<Document>> {
        let text = require_query(query)?;
        let q = Query::wildcard(keyword(NAME), prefix(text))
            .or(Query::wildcard(keyword(TITLE), prefix(text)));
        self.search_documents(SearchRequest::all_indices(q)).await
    }

    /// Free-text search for `*query*` (lower-cased) with wildcard analysis.
    pub async fn analyzed_wildcard(&self, query: &str) -> StorageResult<Vec<Document>> {
        let text = require_query(query)?;
        let q = Query::query_string(
            [NAME, TITLE, "age", "education"],
            format!("*{}*", text.to_lowercase()),
        )
        .analyze_wildcard()
        .lenient();
        self.search_documents(SearchRequest::all_indices(q)).await
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Indexes a new user and returns the id the engine assigned.
    ///
    /// `name` is required; a client-supplied `id` is ignored.
    pub async fn create(&self, record: UserRecord) -> StorageResult<String> {
        if record.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(ValidationError::MissingRequiredField {
                field: NAME.to_string(),
            }
            .into());
        }

        let id = self
            .engine
            .index(
                &self.settings.users_index,
                record.to_document(),
                self.settings.refresh,
            )
            .await?;

        debug!(id = %id, index = %self.settings.users_index, "User indexed");
        Ok(id)
    }

    /// Merges the fields present in `record` into the user `id`.
    pub async fn update(&self, id: &str, record: UserRecord) -> StorageResult<()> {
        self.engine
            .update(
                &self.settings.users_index,
                id,
                record.to_document(),
                self.settings.refresh,
            )
            .await
    }

    /// Removes the user `id`.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.engine
            .delete(&self.settings.users_index, id, self.settings.refresh)
            .await
    }

    // ------------------------------------------------------------------
    // Result mapping
    // ------------------------------------------------------------------

    async fn search_users(&self, request: SearchRequest) -> StorageResult<Vec<UserRecord>> {
        let response = self.engine.search(&request).await?;
        response.hits.into_iter().map(to_user).collect()
    }

    async fn search_documents(&self, request: SearchRequest) -> StorageResult<Vec<Document>> {
        let response = self.engine.search(&request).await?;
        Ok(response
            .hits
            .into_iter()
            .filter_map(|hit| as_document(hit.source))
            .collect())
    }
}

fn require_query(query: &str) -> StorageResult<&str> {
    if query.trim().is_empty() {
        return Err(ValidationError::InvalidQuery {
            parameter: "query".to_string(),
            message: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(query)
}

fn prefix(text: &str) -> String {
    format!("{}*", text)
}

fn as_document(source: Value) -> Option<Document> {
    match source {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn to_user(hit: Hit) -> StorageResult<UserRecord> {
    let mut user: UserRecord = serde_json::from_value(hit.source)?;
    user.id = Some(hit.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use crate::error::StorageError;
    use crate::types::{IndexTarget, SearchResponse};

    /// Records every request and answers searches with canned hits.
    #[derive(Default)]
    struct RecordingEngine {
        searches: Mutex<Vec<SearchRequest>>,
        writes: Mutex<Vec<(String, String, Value)>>,
        hits: Vec<Hit>,
    }

    impl RecordingEngine {
        fn with_hits(hits: Vec<Hit>) -> Self {
            Self {
                hits,
                ..Default::default()
            }
        }

        fn last_search(&self) -> SearchRequest {
            self.searches.lock().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl SearchEngine for RecordingEngine {
        fn engine_name(&self) -> &'static str {
            "recording"
        }

        async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResponse> {
            self.searches.lock().push(request.clone());
            Ok(SearchResponse {
                total: Some(self.hits.len() as u64),
                hits: self.hits.clone(),
            })
        }

        async fn index(
            &self,
            index: &str,
            document: Value,
            _refresh: RefreshPolicy,
        ) -> StorageResult<String> {
            self.writes
                .lock()
                .push(("index".to_string(), index.to_string(), document));
            Ok("abc123".to_string())
        }

        async fn update(
            &self,
            index: &str,
            id: &str,
            partial: Value,
            _refresh: RefreshPolicy,
        ) -> StorageResult<()> {
            self.writes
                .lock()
                .push((format!("update:{}", id), index.to_string(), partial));
            Ok(())
        }

        async fn delete(&self, index: &str, id: &str, _refresh: RefreshPolicy) -> StorageResult<()> {
            self.writes
                .lock()
                .push((format!("delete:{}", id), index.to_string(), Value::Null));
            Ok(())
        }

        async fn refresh(&self, _index: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn health_check(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    fn hit(index: &str, id: &str, source: Value) -> Hit {
        Hit {
            index: index.to_string(),
            id: id.to_string(),
            score: Some(1.0),
            source,
        }
    }

    fn gateway(engine: RecordingEngine) -> (QueryGateway<RecordingEngine>, Arc<RecordingEngine>) {
        let engine = Arc::new(engine);
        (
            QueryGateway::new(Arc::clone(&engine), GatewaySettings::default()),
            engine,
        )
    }

    #[tokio::test]
    async fn test_list_all_targets_users_with_match_all() {
        let (gw, engine) = gateway(RecordingEngine::with_hits(vec![hit(
            "users",
            "u1",
            json!({"name": "Alice", "age": 30}),
        )]));

        let users = gw.list_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id.as_deref(), Some("u1"));
        assert_eq!(users[0].age, Some(30));

        let request = engine.last_search();
        assert_eq!(request.target, IndexTarget::Index("users".to_string()));
        assert_eq!(request.query, Query::MatchAll);
        assert_eq!(request.size, None);
    }

    #[tokio::test]
    async fn test_page_size_applies_to_listings() {
        let engine = Arc::new(RecordingEngine::default());
        let gw = QueryGateway::new(
            Arc::clone(&engine),
            GatewaySettings {
                page_size: Some(50),
                ..Default::default()
            },
        );

        gw.list_all().await.unwrap();
        assert_eq!(engine.last_search().size, Some(50));

        gw.sorted_listing().await.unwrap();
        assert_eq!(engine.last_search().size, Some(50));
    }

    #[tokio::test]
    async fn test_get_by_id_builds_term_or_match() {
        let (gw, engine) = gateway(RecordingEngine::default());

        let found = gw.get_by_id("Alice").await.unwrap();
        assert!(found.is_none());

        let body = engine.last_search().to_body();
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should[0], json!({"term": {"name": {"value": "Alice"}}}));
        assert_eq!(should[1], json!({"match": {"name": {"query": "Alice"}}}));
    }

    #[tokio::test]
    async fn test_get_by_id_returns_first_hit() {
        let (gw, _engine) = gateway(RecordingEngine::with_hits(vec![
            hit("users", "u1", json!({"name": "Alice"})),
            hit("users", "u2", json!({"name": "Alice Smith"})),
        ]));

        let found = gw.get_by_id("Alice").await.unwrap().unwrap();
        assert_eq!(found.id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_get_across_indices_returns_first_object() {
        let (gw, engine) = gateway(RecordingEngine::with_hits(vec![hit(
            "books",
            "b1",
            json!({"title": "Dune", "isbn": "123"}),
        )]));

        let doc = gw.get_across_indices("Dune").await.unwrap().unwrap();
        assert_eq!(doc["title"], "Dune");

        let request = engine.last_search();
        assert_eq!(request.target, IndexTarget::All);
        assert_eq!(
            request.query.to_json()["multi_match"]["fields"],
            json!(["name", "title"])
        );
    }

    #[tokio::test]
    async fn test_get_across_indices_rejects_non_object_sources() {
        let (gw, _engine) = gateway(RecordingEngine::with_hits(vec![hit(
            "weird",
            "w1",
            json!(["not", "an", "object"]),
        )]));

        let err = gw.get_across_indices("x").await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Search(SearchError::UnexpectedShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_wildcard_prefix_request() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.wildcard_prefix("Al").await.unwrap();

        let request = engine.last_search();
        assert_eq!(request.target, IndexTarget::All);
        assert_eq!(request.from, Some(0));
        assert_eq!(request.size, Some(10));
        let body = request.to_body();
        assert_eq!(
            body["query"]["bool"]["should"][0],
            json!({"wildcard": {"name.keyword": {"value": "Al*"}}})
        );
    }

    #[tokio::test]
    async fn test_sorted_listing_sorts_by_name_keyword() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.sorted_listing().await.unwrap();
        assert_eq!(engine.last_search().sort, vec![SortField::asc("name.keyword")]);
    }

    #[tokio::test]
    async fn test_field_projection_includes_name_and_age() {
        let (gw, engine) = gateway(RecordingEngine::with_hits(vec![hit(
            "users",
            "u1",
            json!({"name": "Alice", "age": 30}),
        )]));
        let users = gw.field_projection().await.unwrap();
        assert_eq!(users[0].education, None);
        assert_eq!(
            engine.last_search().source_includes,
            Some(vec!["name".to_string(), "age".to_string()])
        );
    }

    #[tokio::test]
    async fn test_fuzzy_search_uses_auto_fuzziness() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.fuzzy_search("Alise").await.unwrap();
        let body = engine.last_search().to_body();
        assert_eq!(body["query"]["multi_match"]["fuzziness"], "AUTO");
        assert_eq!(
            body["query"]["multi_match"]["fields"],
            json!(["name", "education"])
        );
    }

    #[tokio::test]
    async fn test_multi_field_or_groups_fields() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.multi_field_or("dune").await.unwrap();
        let body = engine.last_search().to_body();
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(
            should[0]["multi_match"]["fields"],
            json!(["name", "age", "education"])
        );
        assert_eq!(
            should[1]["multi_match"]["fields"],
            json!(["title", "authors", "isbn"])
        );
        assert_eq!(should[0]["multi_match"]["lenient"], true);
    }

    #[tokio::test]
    async fn test_wildcard_fields_or() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.wildcard_fields("Du").await.unwrap();
        let body = engine.last_search().to_body();
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(should[1]["wildcard"]["title.keyword"]["value"], "Du*");
    }

    #[tokio::test]
    async fn test_analyzed_wildcard_lowercases_and_wraps() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.analyzed_wildcard("ALi").await.unwrap();
        let body = engine.last_search().to_body();
        assert_eq!(body["query"]["query_string"]["query"], "*ali*");
        assert_eq!(body["query"]["query_string"]["analyze_wildcard"], true);
        assert_eq!(
            body["query"]["query_string"]["fields"],
            json!(["name", "title", "age", "education"])
        );
    }

    #[tokio::test]
    async fn test_bool_or_skips_non_object_sources() {
        let (gw, _engine) = gateway(RecordingEngine::with_hits(vec![
            hit("users", "u1", json!({"name": "Dune"})),
            hit("odd", "o1", json!("scalar")),
        ]));
        let docs = gw.bool_or("Dune").await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_engine_call() {
        let (gw, engine) = gateway(RecordingEngine::default());
        let err = gw.fuzzy_search("   ").await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Validation(ValidationError::InvalidQuery { .. })
        ));
        assert!(engine.searches.lock().is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_name_and_drops_id() {
        let (gw, engine) = gateway(RecordingEngine::default());

        let err = gw.create(UserRecord::default().with_age(3)).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Validation(ValidationError::MissingRequiredField { .. })
        ));

        let record = UserRecord {
            id: Some("client-chosen".to_string()),
            ..UserRecord::named("Alice").with_age(30)
        };
        let id = gw.create(record).await.unwrap();
        assert_eq!(id, "abc123");

        let writes = engine.writes.lock();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, "users");
        assert_eq!(writes[0].2, json!({"name": "Alice", "age": 30}));
    }

    #[tokio::test]
    async fn test_update_sends_only_present_fields() {
        let (gw, engine) = gateway(RecordingEngine::default());
        gw.update("u1", UserRecord::default().with_age(31))
            .await
            .unwrap();
        let writes = engine.writes.lock();
        assert_eq!(writes[0].0, "update:u1");
        assert_eq!(writes[0].2, json!({"age": 31}));
    }

    #[tokio::test]
    async fn test_typed_mapping_fails_on_incompatible_source() {
        let (gw, _engine) = gateway(RecordingEngine::with_hits(vec![hit(
            "users",
            "u1",
            json!({"name": "Alice", "age": "thirty"}),
        )]));
        let err = gw.list_all().await.unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
