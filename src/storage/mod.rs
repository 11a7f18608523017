//! Object storage backends for Cirrus.
//!
//! File bytes live in an S3-compatible object store behind the
//! [`BlobStore`] trait; metadata stays in SQLite. An in-memory backend is
//! provided for tests and local development.

mod memory;
mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by object storage backends.
///
/// Subtyped by cause for diagnostics; API callers only ever see a generic
/// storage failure.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Credentials were rejected for this operation.
    #[error("access denied during {op}")]
    AccessDenied {
        /// Operation that failed.
        op: &'static str,
    },

    /// Bucket or object key does not exist.
    #[error("{op}: key '{key}' not found")]
    NotFound {
        /// Operation that failed.
        op: &'static str,
        /// Key that was requested.
        key: String,
    },

    /// Transport-level failure reaching the backend.
    #[error("network error during {op}: {message}")]
    Network {
        /// Operation that failed.
        op: &'static str,
        /// Underlying error text.
        message: String,
    },

    /// Credentials could not be constructed or parsed.
    #[error("invalid credentials for {op}: {message}")]
    InvalidCredentials {
        /// Operation that failed.
        op: &'static str,
        /// Underlying error text.
        message: String,
    },

    /// Any other backend failure.
    #[error("{op} failed: {message}")]
    Backend {
        /// Operation that failed.
        op: &'static str,
        /// Underlying error text.
        message: String,
    },
}

/// Locator for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    /// Object key within the bucket.
    pub key: String,
    /// Integrity tag reported by the backend, when available.
    pub etag: Option<String>,
}

/// Capability interface over an object store.
///
/// Pure I/O boundary: no quota or namespace logic lives here.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload content, returning the locator for the stored object.
    async fn put(
        &self,
        content: &[u8],
        content_type: &str,
        original_name: &str,
    ) -> Result<BlobHandle, StorageError>;

    /// Delete an object. Returns false if the key was already absent.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Create a time-limited retrieval URL for an object.
    async fn presigned_url(&self, key: &str, ttl_secs: u32) -> Result<String, StorageError>;
}

/// Build an object key for an upload: `uploads/{uuid}-{sanitized name}`.
///
/// The original filename is kept in the key for operator-side legibility
/// only; path separators and control characters are stripped.
pub(crate) fn object_key(original_name: &str) -> String {
    let sanitized: String = original_name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' => '_',
            _ => c,
        })
        .collect();

    format!("uploads/{}-{}", uuid::Uuid::new_v4(), sanitized)
}
