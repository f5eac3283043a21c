//! User record extractor.
//!
//! Extracts a [`UserRecord`] from a JSON request body.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use usersearch_persistence::types::UserRecord;

use crate::error::RestError;

/// Axum extractor for user request bodies.
///
/// The body must be a JSON object. Unknown fields are ignored and every
/// known field is optional, so the same extractor serves creates and
/// partial updates.
///
/// # Example
///
/// ```rust,ignore
/// use usersearch_rest::extractors::UserBody;
///
/// async fn create_handler(UserBody(user): UserBody) {
///     println!("Name: {:?}", user.name);
/// }
/// ```
#[derive(Debug)]
pub struct UserBody(pub UserRecord);

/// Error type for user body extraction failures.
#[derive(Debug)]
pub enum UserBodyRejection {
    /// The body could not be read (too large, aborted).
    Body(BytesRejection),
    /// The content type is not JSON.
    UnsupportedContentType(String),
    /// JSON parsing failed.
    InvalidJson(String),
    /// The body is valid JSON but not an object.
    NotAnObject,
    /// A known field has the wrong type.
    InvalidField(String),
}

impl IntoResponse for UserBodyRejection {
    fn into_response(self) -> Response {
        let error = match self {
            // Keep axum's own status, e.g. 413 when the body limit is hit
            UserBodyRejection::Body(rejection) => return rejection.into_response(),
            UserBodyRejection::UnsupportedContentType(ct) => RestError::BadRequest {
                message: format!("Content type '{}' is not supported, expected JSON", ct),
            },
            UserBodyRejection::InvalidJson(msg) => RestError::BadRequest {
                message: format!("Invalid JSON: {}", msg),
            },
            UserBodyRejection::NotAnObject => RestError::BadRequest {
                message: "Request body must be a JSON object".to_string(),
            },
            UserBodyRejection::InvalidField(msg) => RestError::BadRequest {
                message: format!("Invalid user: {}", msg),
            },
        };
        error.into_response()
    }
}

impl<S> FromRequest<S> for UserBody
where
    S: Send + Sync,
{
    type Rejection = UserBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();

        if !content_type.contains("json") {
            return Err(UserBodyRejection::UnsupportedContentType(content_type));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(UserBodyRejection::Body)?;

        parse_user(&bytes).map(UserBody)
    }
}

fn parse_user(bytes: &[u8]) -> Result<UserRecord, UserBodyRejection> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| UserBodyRejection::InvalidJson(e.to_string()))?;

    if !value.is_object() {
        return Err(UserBodyRejection::NotAnObject);
    }

    serde_json::from_value(value).map_err(|e| UserBodyRejection::InvalidField(e.to_string()))
}
