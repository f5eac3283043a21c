//! HTTP request handlers.
//!
//! - [`users`] - The users collection: listings, lookup, create, update, delete
//! - [`search`] - Cross-index and text searches
//! - [`health`] - Health, liveness and readiness endpoints

pub mod health;
pub mod search;
pub mod users;

// Re-export handlers for convenience
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use search::{
    analyzed_handler, any_index_handler, bool_handler, fuzzy_handler, multi_match_handler,
    wildcard_fields_handler, wildcard_handler,
};
pub use users::{
    create_user_handler, delete_user_handler, get_user_handler, list_users_handler,
    sorted_users_handler, update_user_handler, user_fields_handler,
};
