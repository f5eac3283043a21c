//! SearchEngine implementation for Elasticsearch.

use async_trait::async_trait;
use elasticsearch::params::Refresh;
use elasticsearch::{DeleteParts, IndexParts, SearchParts, UpdateParts};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::core::SearchEngine;
use crate::error::{BackendError, ResourceError, SearchError, StorageError, StorageResult};
use crate::types::{RefreshPolicy, SearchRequest, SearchResponse};

use super::backend::{BACKEND_NAME, ElasticsearchBackend, unavailable};

/// Maps the refresh policy onto the request parameter; `None` leaves it unset.
fn refresh_param(policy: RefreshPolicy) -> Option<Refresh> {
    match policy {
        RefreshPolicy::Off => None,
        RefreshPolicy::WaitFor => Some(Refresh::WaitFor),
        RefreshPolicy::Immediate => Some(Refresh::True),
    }
}

/// Extracts the most specific error reason from an engine error body.
fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("root_cause")
                .and_then(|rc| rc.get(0))
                .and_then(|rc| rc.get("reason"))
                .or_else(|| error.get("reason"))
                .and_then(|r| r.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Classifies a non-success engine response.
///
/// With a document `id` a 404 means the document is absent; without one it
/// means the index is.
pub(crate) fn classify_failure(
    index: &str,
    id: Option<&str>,
    status: u16,
    body: String,
) -> StorageError {
    match (status, id) {
        (404, Some(id)) => ResourceError::NotFound {
            index: index.to_string(),
            id: id.to_string(),
        }
        .into(),
        (404, None) if body.contains("index_not_found_exception") => SearchError::IndexNotFound {
            index: index.to_string(),
        }
        .into(),
        (400, _) => SearchError::QueryRejected {
            message: error_reason(&body),
        }
        .into(),
        _ => BackendError::EngineStatus {
            backend_name: BACKEND_NAME.to_string(),
            status,
            body,
        }
        .into(),
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchBackend {
    fn engine_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn search(&self, request: &SearchRequest) -> StorageResult<SearchResponse> {
        let path = request.target.as_path();
        let body = request.to_body();
        debug!(index = %path, query = %body, "Executing Elasticsearch search");

        let response = self
            .client()
            .search(SearchParts::Index(&[path]))
            .body(body)
            .send()
            .await
            .map_err(|e| unavailable(format!("Search failed: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(index = %path, status = %status, "Search failed");
            return Err(classify_failure(path, None, status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to read search response: {}", e)))?;

        Ok(SearchResponse::from_body(&body)?)
    }

    async fn index(
        &self,
        index: &str,
        document: Value,
        refresh: RefreshPolicy,
    ) -> StorageResult<String> {
        let mut request = self.client().index(IndexParts::Index(index)).body(document);
        if let Some(param) = refresh_param(refresh) {
            request = request.refresh(param);
        }

        let response = request
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to index document: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(index, None, status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to read index response: {}", e)))?;

        body.get("_id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                SearchError::UnexpectedShape {
                    message: format!("index response without _id: {}", body),
                }
                .into()
            })
    }

    async fn update(
        &self,
        index: &str,
        id: &str,
        partial: Value,
        refresh: RefreshPolicy,
    ) -> StorageResult<()> {
        let mut request = self
            .client()
            .update(UpdateParts::IndexId(index, id))
            .body(json!({ "doc": partial }));
        if let Some(param) = refresh_param(refresh) {
            request = request.refresh(param);
        }

        let response = request
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to update document: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(index, Some(id), status.as_u16(), body));
        }
        Ok(())
    }

    async fn delete(&self, index: &str, id: &str, refresh: RefreshPolicy) -> StorageResult<()> {
        let mut request = self.client().delete(DeleteParts::IndexId(index, id));
        if let Some(param) = refresh_param(refresh) {
            request = request.refresh(param);
        }

        let response = request
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to delete document: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(index, Some(id), status.as_u16(), body));
        }
        Ok(())
    }

    async fn refresh(&self, index: &str) -> StorageResult<()> {
        self.refresh_index(index).await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.cluster_health().await
    }
}
