//! Axum extractors for request data.
//!
//! - [`UserBody`] - Extract a user record from a JSON body
//! - [`SearchText`] - Extract the `query` parameter of search endpoints

mod search_text;
mod user_body;

pub use search_text::SearchText;
pub use user_body::{UserBody, UserBodyRejection};
