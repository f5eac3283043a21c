//! Index schema and bootstrap for the users index.

use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{BackendError, StorageError, StorageResult};

use super::backend::{BACKEND_NAME, ElasticsearchBackend, ElasticsearchConfig};

/// Analyzed text with a raw `keyword` sub-field for wildcards and sorting.
fn text_with_keyword() -> Value {
    json!({
        "type": "text",
        "fields": {
            "keyword": { "type": "keyword", "ignore_above": 256 }
        }
    })
}

/// Creates the users index body: settings plus explicit field mappings.
///
/// Fields outside the mapping are still accepted through dynamic mapping.
pub fn users_index_mapping(config: &ElasticsearchConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas,
            "index.max_result_window": config.max_result_window,
            "refresh_interval": config.refresh_interval
        },
        "mappings": {
            "properties": {
                "name": text_with_keyword(),
                "age": { "type": "integer" },
                "education": text_with_keyword(),
                "title": text_with_keyword(),
                "authors": text_with_keyword(),
                "isbn": text_with_keyword()
            }
        }
    })
}

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: BACKEND_NAME.to_string(),
        message,
        source: None,
    })
}

/// Ensures `index` exists, creating it with the users mapping if necessary.
///
/// Idempotent: an existing index, or one created concurrently, is left as is.
pub async fn ensure_users_index(backend: &ElasticsearchBackend, index: &str) -> StorageResult<()> {
    let exists_response = backend
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[index]))
        .send()
        .await
        .map_err(|e| super::backend::unavailable(format!("Failed to check index existence: {}", e)))?;

    if exists_response.status_code().is_success() {
        debug!(index = %index, "Index already exists");
        return Ok(());
    }

    let mapping = users_index_mapping(backend.config());

    let response = backend
        .client()
        .indices()
        .create(IndicesCreateParts::Index(index))
        .body(mapping)
        .send()
        .await
        .map_err(|e| super::backend::unavailable(format!("Failed to create index {}: {}", index, e)))?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // 400 with "resource_already_exists_exception" is OK (race condition)
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        return Err(internal_error(format!(
            "Failed to create index {} (status {}): {}",
            index, status, body
        )));
    }

    info!(index = %index, "Created Elasticsearch index");
    Ok(())
}
