//! In-memory storage backend.
//!
//! Objects live in a process-local map and disappear with the process. Used by
//! tests and for running the service without a disk or bucket.

use crate::keys::validate_key;
use crate::traits::{join_url, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Map a URL produced by [`Storage::url_for`] back to its stored path.
    pub fn stored_path_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(join_url(&self.base_url, "").as_str())
            .filter(|rest| !rest.is_empty())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://")
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<String> {
        validate_key(key)?;
        let size = data.len();
        self.objects.write().await.insert(key.to_string(), data);
        tracing::debug!(key = %key, size_bytes = size, "Memory storage save successful");
        Ok(key.to_string())
    }

    fn url_for(&self, stored_path: &str) -> String {
        join_url(&self.base_url, stored_path)
    }

    async fn download(&self, stored_path: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(stored_path)
            .map(|data| data.to_vec())
            .ok_or_else(|| StorageError::NotFound(stored_path.to_string()))
    }

    async fn exists(&self, stored_path: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(stored_path))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
