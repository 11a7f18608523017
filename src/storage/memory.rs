//! In-memory blob store for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{object_key, BlobHandle, BlobStore, StorageError};

#[derive(Debug)]
struct StoredBlob {
    content: Vec<u8>,
    content_type: String,
}

/// Blob store holding objects in process memory.
///
/// Supports injecting a put failure after N successful puts so that batch
/// compensation paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, StoredBlob>>,
    puts: AtomicUsize,
    fail_puts_after: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
            fail_puts_after: AtomicUsize::new(usize::MAX),
        }
    }

    /// Make every put after the first `n` successful ones fail.
    pub fn fail_puts_after(&self, n: usize) {
        self.fail_puts_after.store(n, Ordering::SeqCst);
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("memory store poisoned").len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .expect("memory store poisoned")
            .contains_key(key)
    }

    /// Fetch an object's bytes (test helper).
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .expect("memory store poisoned")
            .get(key)
            .map(|b| b.content.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(
        &self,
        content: &[u8],
        content_type: &str,
        original_name: &str,
    ) -> Result<BlobHandle, StorageError> {
        let done = self.puts.fetch_add(1, Ordering::SeqCst);
        if done >= self.fail_puts_after.load(Ordering::SeqCst) {
            return Err(StorageError::Network {
                op: "put",
                message: "injected failure".to_string(),
            });
        }

        let key = object_key(original_name);
        self.blobs.lock().expect("memory store poisoned").insert(
            key.clone(),
            StoredBlob {
                content: content.to_vec(),
                content_type: content_type.to_string(),
            },
        );

        Ok(BlobHandle {
            key,
            etag: Some(format!("mem-{}", content.len())),
        })
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .blobs
            .lock()
            .expect("memory store poisoned")
            .remove(key)
            .is_some())
    }

    async fn presigned_url(&self, key: &str, ttl_secs: u32) -> Result<String, StorageError> {
        if !self.contains(key) {
            return Err(StorageError::NotFound {
                op: "presign",
                key: key.to_string(),
            });
        }

        Ok(format!(
            "memory://{}?expires={ttl_secs}",
            urlencoding::encode(key)
        ))
    }
}
