//! Handlers for the users collection.
//!
//! `GET|POST [base]/api/users`, `GET|PUT|DELETE [base]/api/users/{id}` and
//! the sorted and projected listings.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};
use usersearch_persistence::core::SearchEngine;

use crate::error::RestResult;
use crate::extractors::UserBody;
use crate::state::AppState;

/// Lists every user.
///
/// # HTTP Request
///
/// `GET [base]/api/users`
pub async fn list_users_handler<E>(State(state): State<AppState<E>>) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!("Processing list users request");

    let users = state.gateway().list_all().await?;

    debug!(count = users.len(), "Listed users");
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Lists every user sorted by the raw `name` value.
///
/// # HTTP Request
///
/// `GET [base]/api/users/sorted`
pub async fn sorted_users_handler<E>(State(state): State<AppState<E>>) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!("Processing sorted listing request");

    let users = state.gateway().sorted_listing().await?;
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Lists every user with only `name` and `age` (plus the id).
///
/// # HTTP Request
///
/// `GET [base]/api/users/fields`
pub async fn user_fields_handler<E>(State(state): State<AppState<E>>) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!("Processing field projection request");

    let users = state.gateway().field_projection().await?;
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Looks up a user by name.
///
/// The path value is matched against `name` both exactly and as analyzed
/// text; the first hit wins.
///
/// # HTTP Request
///
/// `GET [base]/api/users/{id}`
///
/// # Response
///
/// - `200 OK` - The user
/// - `204 No Content` - No user matched
pub async fn get_user_handler<E>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(id = %id, "Processing get user request");

    match state.gateway().get_by_id(&id).await? {
        Some(user) => Ok((StatusCode::OK, Json(user)).into_response()),
        None => {
            debug!(id = %id, "No user matched");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Creates a user.
///
/// # HTTP Request
///
/// `POST [base]/api/users`
///
/// # Response
///
/// - `201 Created` - `{"id": ...}` with a `Location` header
/// - `400 Bad Request` - Malformed body or missing `name`
pub async fn create_user_handler<E>(
    State(state): State<AppState<E>>,
    UserBody(user): UserBody,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(name = ?user.name, "Processing create user request");

    let id = state.gateway().create(user).await?;
    let location = format!("{}/api/users/{}", state.base_url(), id);

    info!(id = %id, "Created user");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(serde_json::json!({ "id": id })),
    )
        .into_response())
}

/// Merges the fields in the body into an existing user.
///
/// # HTTP Request
///
/// `PUT [base]/api/users/{id}`
///
/// # Response
///
/// - `204 No Content` - Updated
/// - `404 Not Found` - No document with that id
pub async fn update_user_handler<E>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
    UserBody(user): UserBody,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(id = %id, "Processing update user request");

    state.gateway().update(&id, user).await?;

    info!(id = %id, "Updated user");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Deletes a user.
///
/// # HTTP Request
///
/// `DELETE [base]/api/users/{id}`
///
/// # Response
///
/// - `204 No Content` - Deleted
/// - `404 Not Found` - No document with that id
pub async fn delete_user_handler<E>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    E: SearchEngine,
{
    debug!(id = %id, "Processing delete user request");

    state.gateway().delete(&id).await?;

    info!(id = %id, "Deleted user");
    Ok(StatusCode::NO_CONTENT.into_response())
}
