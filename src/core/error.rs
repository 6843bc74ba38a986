//! Typed error handling for the sieve query compiler
//!
//! # Error Categories
//!
//! - [`QueryError`]: a query description that cannot be compiled (unknown
//!   field, invalid pagination, unknown collection)
//! - [`ConfigError`]: schema registration problems
//! - [`StorageError`]: failures reported by a store collaborator
//!
//! Conversion failures and unsupported operators have no variant here:
//! both are folded into the compiled predicate instead of being raised.
//! Store failures never escape a [`crate::core::envelope::QueryResult`]
//! either; they are carried as its `error` text.
//!
//! # Example
//!
//! ```rust,ignore
//! match listing.assemble(&input) {
//!     Ok(query) => listing.execute(&query).await,
//!     Err(QueryError::FieldNotFound { path, .. }) => {
//!         println!("no such field: {}", path);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// The main error type for the sieve crate
#[derive(Debug, thiserror::Error)]
pub enum SieveError {
    /// Query compilation errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SieveError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SieveError::Query(e) => e.status_code(),
            SieveError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SieveError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SieveError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SieveError::Query(e) => e.error_code(),
            SieveError::Config(_) => "CONFIG_ERROR",
            SieveError::Storage(_) => "STORAGE_ERROR",
            SieveError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SieveError::Query(QueryError::FieldNotFound {
                path,
                segment,
                record,
            }) => Some(serde_json::json!({
                "path": path,
                "segment": segment,
                "record": record,
            })),
            SieveError::Query(QueryError::MisalignedOffset { offset, limit }) => {
                Some(serde_json::json!({ "offset": offset, "limit": limit }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for SieveError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised while compiling a query description
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// A filter or sort references a path absent from the record shape
    #[error("Field '{path}' not found: '{record}' has no field '{segment}'")]
    FieldNotFound {
        path: String,
        segment: String,
        record: String,
    },

    /// The description violates its own constraints (e.g. `limit < -1`)
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// A page-index store cannot represent this offset
    #[error("Offset {offset} is not a multiple of page size {limit}")]
    MisalignedOffset { offset: u64, limit: u64 },

    /// No listing is registered under this name
    #[error("Collection '{name}' is not registered")]
    UnknownCollection { name: String },
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::FieldNotFound { .. } => StatusCode::BAD_REQUEST,
            QueryError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            QueryError::MisalignedOffset { .. } => StatusCode::BAD_REQUEST,
            QueryError::UnknownCollection { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::FieldNotFound { .. } => "FIELD_NOT_FOUND",
            QueryError::InvalidQuery { .. } => "INVALID_QUERY",
            QueryError::MisalignedOffset { .. } => "MISALIGNED_OFFSET",
            QueryError::UnknownCollection { .. } => "COLLECTION_NOT_FOUND",
        }
    }
}

impl From<validator::ValidationErrors> for QueryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        QueryError::InvalidQuery {
            message: errors.to_string(),
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to schema configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },

    /// A field declaration cannot be turned into a record shape
    #[error("Invalid field '{field}' in collection '{collection}': {message}")]
    InvalidField {
        collection: String,
        field: String,
        message: String,
    },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Query execution error
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    /// A stored record could not be (de)serialized
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}
