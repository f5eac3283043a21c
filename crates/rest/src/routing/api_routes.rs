//! API route configuration.

use axum::{
    Router,
    routing::{delete, get, put},
};
use usersearch_persistence::core::SearchEngine;

use crate::handlers;
use crate::state::AppState;

/// Creates all API routes.
///
/// # Routes
///
/// ## Users
/// - `GET /api/users` - List all users
/// - `POST /api/users` - Create a user
/// - `GET /api/users/sorted` - Users sorted by name
/// - `GET /api/users/fields` - Users projected to name and age
/// - `GET /api/users/{id}` - Look up a user by name
/// - `PUT /api/users/{id}` - Merge fields into a user
/// - `DELETE /api/users/{id}` - Delete a user
///
/// ## Search
/// - `GET /api/search/any/{id}` - Lookup across all indices
/// - `GET /api/search/wildcard?query=` - Case-sensitive name prefix
/// - `GET /api/search/fuzzy?query=` - Typo-tolerant user search
/// - `GET /api/search/bool?query=` - Name or title
/// - `GET /api/search/multi-match?query=` - Lenient multi-field match
/// - `GET /api/search/wildcard-fields?query=` - Name or title prefix
/// - `GET /api/search/analyzed?query=` - Case-insensitive infix
///
/// ## Operations
/// - `GET /health` - Health summary
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe
///
/// Static segments win over `{id}`, so a user named `sorted` or `fields`
/// cannot be looked up by path.
pub fn create_routes<E>(state: AppState<E>) -> Router
where
    E: SearchEngine + 'static,
{
    Router::new()
        // Operations
        .route("/health", get(handlers::health_handler::<E>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<E>))
        // Users
        .route(
            "/api/users",
            get(handlers::list_users_handler::<E>).post(handlers::create_user_handler::<E>),
        )
        .route("/api/users/sorted", get(handlers::sorted_users_handler::<E>))
        .route("/api/users/fields", get(handlers::user_fields_handler::<E>))
        .route("/api/users/{id}", get(handlers::get_user_handler::<E>))
        .route("/api/users/{id}", put(handlers::update_user_handler::<E>))
        .route("/api/users/{id}", delete(handlers::delete_user_handler::<E>))
        // Search
        .route("/api/search/any/{id}", get(handlers::any_index_handler::<E>))
        .route("/api/search/wildcard", get(handlers::wildcard_handler::<E>))
        .route("/api/search/fuzzy", get(handlers::fuzzy_handler::<E>))
        .route("/api/search/bool", get(handlers::bool_handler::<E>))
        .route(
            "/api/search/multi-match",
            get(handlers::multi_match_handler::<E>),
        )
        .route(
            "/api/search/wildcard-fields",
            get(handlers::wildcard_fields_handler::<E>),
        )
        .route("/api/search/analyzed", get(handlers::analyzed_handler::<E>))
        .with_state(state)
}
