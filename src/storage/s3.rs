//! S3-compatible blob store backend.

use std::time::Duration;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use crate::config::StorageConfig;
use crate::{CirrusError, Result};

use super::{object_key, BlobHandle, BlobStore, StorageError};

/// Blob store backed by an S3-compatible bucket.
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    /// Open a bucket from configuration.
    ///
    /// A custom endpoint selects path-style addressing, which is what
    /// MinIO and most S3-compatible services expect.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(CirrusError::Config(
                "storage.bucket must be configured".to_string(),
            ));
        }

        let region = if let Some(ref endpoint) = config.endpoint {
            Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            }
        } else {
            config
                .region
                .parse()
                .map_err(|e| CirrusError::Config(format!("invalid storage.region: {e}")))?
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| CirrusError::Config(format!("failed to create credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| CirrusError::Config(format!("failed to create bucket: {e}")))?
            .with_request_timeout(Duration::from_secs(config.timeout_secs))
            .map_err(|e| CirrusError::Config(format!("failed to create bucket: {e}")))?;

        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }

    fn map_status(op: &'static str, key: &str, status: u16, body: &[u8]) -> StorageError {
        match status {
            403 => StorageError::AccessDenied { op },
            404 => StorageError::NotFound {
                op,
                key: key.to_string(),
            },
            _ => StorageError::Backend {
                op,
                message: format!(
                    "S3 error code {status}: {}",
                    String::from_utf8_lossy(body)
                ),
            },
        }
    }

    fn map_error(op: &'static str, err: S3Error) -> StorageError {
        match err {
            S3Error::Credentials(e) => StorageError::InvalidCredentials {
                op,
                message: e.to_string(),
            },
            other => StorageError::Backend {
                op,
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn put(
        &self,
        content: &[u8],
        content_type: &str,
        original_name: &str,
    ) -> std::result::Result<BlobHandle, StorageError> {
        let key = object_key(original_name);

        let response = self
            .bucket
            .put_object_with_content_type(&key, content, content_type)
            .await
            .map_err(|e| Self::map_error("put", e))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(Self::map_status("put", &key, status, response.as_slice()));
        }

        let etag = response
            .headers()
            .get("etag")
            .map(|v| v.trim_matches('"').to_string());

        Ok(BlobHandle { key, etag })
    }

    async fn delete(&self, key: &str) -> std::result::Result<bool, StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| Self::map_error("delete", e))?;

        let status = response.status_code();
        match status {
            s if (200..300).contains(&s) => Ok(true),
            404 => Ok(false),
            _ => Err(Self::map_status("delete", key, status, response.as_slice())),
        }
    }

    async fn presigned_url(
        &self,
        key: &str,
        ttl_secs: u32,
    ) -> std::result::Result<String, StorageError> {
        self.bucket
            .presign_get(key, ttl_secs, None)
            .await
            .map_err(|e| Self::map_error("presign", e))
    }
}
