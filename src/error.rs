//! Error types for Cirrus.

use thiserror::Error;

use crate::storage::StorageError;

/// Common error type for Cirrus.
#[derive(Error, Debug)]
pub enum CirrusError {
    /// Database error.
    ///
    /// Wraps errors from the SQL backend; sqlx errors convert automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found (or not owned by the caller; the two are
    /// deliberately indistinguishable).
    #[error("{0} not found")]
    NotFound(String),

    /// Resource conflicts with existing state, such as a duplicate email.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upload rejected because it would exceed the owner's storage limit.
    #[error("storage limit exceeded: requested {requested} bytes, {available} available")]
    QuotaExceeded {
        /// Bytes the operation tried to reserve.
        requested: i64,
        /// Headroom remaining at the time of the check.
        available: i64,
    },

    /// Object storage backend failure.
    #[error("storage backend error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for CirrusError {
    fn from(e: sqlx::Error) -> Self {
        CirrusError::Database(e.to_string())
    }
}

/// Result type alias for Cirrus operations.
pub type Result<T> = std::result::Result<T, CirrusError>;
