// ABOUTME: Error taxonomy surfaced by the CRUD gateway to its callers.
// ABOUTME: Wraps routing, validation, lifecycle, and SQLite failures without swallowing any.

use petstore_core::{Field, Reason, RouteError, ValidationError};
use thiserror::Error;

use crate::lifecycle::LifecycleError;

/// Errors returned by gateway operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unrecognized resource: {0}")]
    UnrecognizedResource(String),

    #[error("{operation} is not supported for {uri}")]
    UnsupportedOperation {
        operation: &'static str,
        uri: String,
    },

    #[error("invalid record: {field} {reason}")]
    InvalidRecord { field: Field, reason: Reason },

    #[error("failed to insert row for {uri}")]
    InsertFailed {
        uri: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("unknown column in projection: {0}")]
    UnknownColumn(String),

    #[error("stored value {value} in column {column} is out of range")]
    InvalidStoredValue { column: &'static str, value: i64 },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<RouteError> for ProviderError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::Unrecognized(uri) => ProviderError::UnrecognizedResource(uri),
        }
    }
}

impl From<ValidationError> for ProviderError {
    fn from(err: ValidationError) -> Self {
        ProviderError::InvalidRecord {
            field: err.field,
            reason: err.reason,
        }
    }
}

impl From<LifecycleError> for ProviderError {
    fn from(err: LifecycleError) -> Self {
        ProviderError::StorageUnavailable(err.to_string())
    }
}
