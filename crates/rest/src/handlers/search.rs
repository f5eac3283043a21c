//! Handlers for the search endpoints under `[base]/api/search`.
//!
//! Every endpoint except `any/{id}` takes its text from the `query`
//! parameter.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;
use usersearch_persistence::core::SearchEngine;

use crate::error::RestResult;
use crate::extractors::SearchText;
use crate::state::AppState;

/// Looks up a document in any index by `name` or `title`.
///
/// # HTTP Request
///
/// `GET [base]/api/search/any/{id}`
///
/// # Response
///
/// - `200 OK` - The first matching document
/// - `204 No Content` - Nothing matched
pub async fn any_index_handler<E>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(id = %id, "Processing cross-index lookup");

    match state.gateway().get_across_indices(&id).await? {
        Some(document) => Ok((StatusCode::OK, Json(document)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Case-sensitive prefix match on the raw `name` across all indices.
///
/// `GET [base]/api/search/wildcard?query=`
pub async fn wildcard_handler<E>(
    State(state): State<AppState<E>>,
    text: SearchText,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(query = %text.as_str(), "Processing wildcard search");

    let documents = state.gateway().wildcard_prefix(text.as_str()).await?;
    Ok((StatusCode::OK, Json(documents)).into_response())
}

/// Typo-tolerant match on `name` and `education`.
///
/// `GET [base]/api/search/fuzzy?query=`
pub async fn fuzzy_handler<E>(
    State(state): State<AppState<E>>,
    text: SearchText,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(query = %text.as_str(), "Processing fuzzy search");

    let users = state.gateway().fuzzy_search(text.as_str()).await?;
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// `name` or `title` match across all indices.
///
/// `GET [base]/api/search/bool?query=`
pub async fn bool_handler<E>(
    State(state): State<AppState<E>>,
    text: SearchText,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(query = %text.as_str(), "Processing boolean search");

    let documents = state.gateway().bool_or(text.as_str()).await?;
    Ok((StatusCode::OK, Json(documents)).into_response())
}

/// Lenient match over user and book fields across all indices.
///
/// `GET [base]/api/search/multi-match?query=`
pub async fn multi_match_handler<E>(
    State(state): State<AppState<E>>,
    text: SearchText,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(query = %text.as_str(), "Processing multi-field search");

    let documents = state.gateway().multi_field_or(text.as_str()).await?;
    Ok((StatusCode::OK, Json(documents)).into_response())
}

/// Prefix match on the raw `name` or `title` across all indices.
///
/// `GET [base]/api/search/wildcard-fields?query=`
pub async fn wildcard_fields_handler<E>(
    State(state): State<AppState<E>>,
    text: SearchText,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(query = %text.as_str(), "Processing wildcard fields search");

    let documents = state.gateway().wildcard_fields(text.as_str()).await?;
    Ok((StatusCode::OK, Json(documents)).into_response())
}

/// Case-insensitive infix match over every field across all indices.
///
/// `GET [base]/api/search/analyzed?query=`
pub async fn analyzed_handler<E>(
    State(state): State<AppState<E>>,
    text: SearchText,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(query = %text.as_str(), "Processing analyzed wildcard search");

    let documents = state.gateway().analyzed_wildcard(text.as_str()).await?;
    Ok((StatusCode::OK, Json(documents)).into_response())
}
