//! Error types for the persistence layer.
//!
//! Errors are grouped by where they originate: the addressed document, the
//! caller's input, the query as judged by the engine, or the engine transport.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Document state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Caller input errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query execution errors reported by the engine
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Engine transport errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to an addressed document.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The document addressed by an update or delete does not exist.
    #[error("document not found: {index}/{id}")]
    NotFound { index: String, id: String },
}

/// Errors caused by malformed caller input.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A field required by the operation is missing from the request body.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A query parameter is missing or unusable.
    #[error("invalid query parameter '{parameter}': {message}")]
    InvalidQuery { parameter: String, message: String },
}

/// Errors reported by the engine while executing a query.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The targeted index does not exist.
    #[error("index not found: {index}")]
    IndexNotFound { index: String },

    /// The engine refused the query as malformed.
    #[error("query rejected by engine: {message}")]
    QueryRejected { message: String },

    /// The engine answered with a document shape the caller cannot use.
    #[error("unexpected document shape: {message}")]
    UnexpectedShape { message: String },
}

/// Errors originating from the engine transport.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The engine could not be reached.
    #[error("engine unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// The client could not be constructed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The engine answered with a non-success status.
    #[error("{backend_name} returned status {status}: {body}")]
    EngineStatus {
        backend_name: String,
        status: u16,
        body: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for engine operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "elasticsearch")]
impl From<elasticsearch::Error> for StorageError {
    fn from(err: elasticsearch::Error) -> Self {
        StorageError::Backend(BackendError::Unavailable {
            backend_name: "elasticsearch".to_string(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_display() {
        let err = StorageError::Resource(ResourceError::NotFound {
            index: "users".to_string(),
            id: "abc123".to_string(),
        });
        assert_eq!(err.to_string(), "document not found: users/abc123");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingRequiredField {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "missing required field: name");
    }

    #[test]
    fn test_engine_status_display() {
        let err = BackendError::EngineStatus {
            backend_name: "elasticsearch".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::SerializationError { .. })
        ));
    }
}
