//! Error types for the usersearch HTTP API.
//!
//! This module defines all error types used throughout the REST API layer,
//! with automatic conversion to JSON error responses.
//!
//! # Error Mapping
//!
//! Storage errors from the persistence layer are automatically mapped to
//! appropriate HTTP status codes and error codes:
//!
//! | Storage Error | HTTP Status | Code |
//! |--------------|-------------|------|
//! | NotFound | 404 | not-found |
//! | MissingRequiredField / InvalidQuery | 400 | invalid |
//! | QueryRejected | 422 | processing |
//! | IndexNotFound | 404 | index-not-found |
//! | EngineStatus / UnexpectedShape / SerializationError | 502 | bad-gateway |
//! | Unavailable / ConnectionFailed | 503 | unavailable |
//! | Internal | 500 | exception |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use usersearch_persistence::error::{
    BackendError, ResourceError, SearchError, StorageError, ValidationError,
};

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Document not found (HTTP 404).
    NotFound {
        /// The index that was addressed.
        index: String,
        /// The document ID.
        id: String,
    },

    /// Bad request - validation error (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// The engine refused the query (HTTP 422).
    UnprocessableEntity {
        /// Error message.
        message: String,
    },

    /// The addressed index does not exist (HTTP 404).
    IndexNotFound {
        /// The missing index.
        index: String,
    },

    /// The engine answered with something unusable (HTTP 502).
    BadGateway {
        /// Error message.
        message: String,
    },

    /// The engine could not be reached (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { index, id } => {
                write!(f, "Document not found: {}/{}", index, id)
            }
            RestError::BadRequest { message } => {
                write!(f, "Bad request: {}", message)
            }
            RestError::UnprocessableEntity { message } => {
                write!(f, "Unprocessable entity: {}", message)
            }
            RestError::IndexNotFound { index } => {
                write!(f, "Index not found: {}", index)
            }
            RestError::BadGateway { message } => {
                write!(f, "Bad gateway: {}", message)
            }
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } | RestError::IndexNotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RestError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RestError::NotFound { .. } => "not-found",
            RestError::BadRequest { .. } => "invalid",
            RestError::UnprocessableEntity { .. } => "processing",
            RestError::IndexNotFound { .. } => "index-not-found",
            RestError::BadGateway { .. } => "bad-gateway",
            RestError::ServiceUnavailable { .. } => "unavailable",
            RestError::InternalError { .. } => "exception",
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            RestError::BadGateway { .. }
            | RestError::ServiceUnavailable { .. }
            | RestError::InternalError { .. } => {
                tracing::error!(status = status.as_u16(), error = %self, "Request failed");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
            }
        }

        let body = create_error_body(status, self.code(), &self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Creates the JSON error body.
fn create_error_body(status: StatusCode, code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "status": status.as_u16(),
            "code": code,
            "message": message
        }
    })
}

// Implement conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Search(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { index, id } => RestError::NotFound { index, id },
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<SearchError> for RestError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::IndexNotFound { index } => RestError::IndexNotFound { index },
            SearchError::QueryRejected { message } => RestError::UnprocessableEntity { message },
            SearchError::UnexpectedShape { .. } => RestError::BadGateway {
                message: err.to_string(),
            },
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable { .. } | BackendError::ConnectionFailed { .. } => {
                RestError::ServiceUnavailable {
                    message: err.to_string(),
                }
            }
            BackendError::EngineStatus { .. } | BackendError::SerializationError { .. } => {
                RestError::BadGateway {
                    message: err.to_string(),
                }
            }
            BackendError::Internal { .. } => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_not_found_display() {
        let err = RestError::NotFound {
            index: "users".to_string(),
            id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Document not found: users/123");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                RestError::BadRequest {
                    message: String::new(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RestError::IndexNotFound {
                    index: "users".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                RestError::UnprocessableEntity {
                    message: String::new(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                RestError::BadGateway {
                    message: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                RestError::ServiceUnavailable {
                    message: String::new(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_from_storage_not_found() {
        let err: RestError = StorageError::Resource(ResourceError::NotFound {
            index: "users".to_string(),
            id: "abc".to_string(),
        })
        .into();
        assert!(matches!(err, RestError::NotFound { ref id, .. } if id == "abc"));
    }

    #[test]
    fn test_from_validation_error() {
        let err: RestError = StorageError::Validation(ValidationError::MissingRequiredField {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_from_search_errors() {
        let rejected: RestError = SearchError::QueryRejected {
            message: "failed to parse".to_string(),
        }
        .into();
        assert_eq!(rejected.code(), "processing");

        let shape: RestError = SearchError::UnexpectedShape {
            message: "array".to_string(),
        }
        .into();
        assert_eq!(shape.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_from_backend_errors() {
        let unavailable: RestError = BackendError::Unavailable {
            backend_name: "elasticsearch".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let status: RestError = BackendError::EngineStatus {
            backend_name: "elasticsearch".to_string(),
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(status.status_code(), StatusCode::BAD_GATEWAY);

        let internal: RestError = BackendError::Internal {
            backend_name: "memory".to_string(),
            message: "poisoned".to_string(),
            source: None,
        }
        .into();
        assert_eq!(internal.code(), "exception");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = RestError::IndexNotFound {
            index: "users".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["status"], 404);
        assert_eq!(body["error"]["code"], "index-not-found");
        assert_eq!(body["error"]["message"], "Index not found: users");
    }
}
