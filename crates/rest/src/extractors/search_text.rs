//! Search text extractor.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::RestError;

/// Axum extractor for the `query` parameter of search endpoints.
///
/// A missing parameter is rejected with 400. Blank text is passed through
/// and rejected by the gateway, which owns query validation.
#[derive(Debug, Clone)]
pub struct SearchText(pub String);

impl SearchText {
    /// Returns the search text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct SearchTextQuery {
    query: Option<String>,
}

impl<S> FromRequestParts<S> for SearchText
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<SearchTextQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::BadRequest {
                message: format!("Invalid query string: {}", e.body_text()),
            })?;

        params
            .query
            .map(SearchText)
            .ok_or_else(|| RestError::BadRequest {
                message: "Missing required query parameter 'query'".to_string(),
            })
    }
}
