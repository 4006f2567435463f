//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The upload pipeline only needs `save` and `url_for`; `download` and
/// `exists` serve health probes and verification. Stored images are
/// immutable, so there is no delete.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` under `key` and return the stored path.
    ///
    /// The stored path is what [`Storage::url_for`] resolves. Backends in this
    /// crate store under the key unchanged, so the stored path equals the key.
    async fn save(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<String>;

    /// Resolve a stored path to a publicly fetchable URL (absolute or relative).
    fn url_for(&self, stored_path: &str) -> String;

    /// Read back the bytes stored at `stored_path`
    async fn download(&self, stored_path: &str) -> StorageResult<Vec<u8>>;

    /// Check if a file exists
    async fn exists(&self, stored_path: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Join a base URL and a key with a single `/` between them.
///
/// A base that already ends in `/` (including scheme-only bases such as
/// `memory://`) is used as-is.
pub(crate) fn join_url(base_url: &str, key: &str) -> String {
    let key = key.trim_start_matches('/');
    if base_url.ends_with('/') {
        format!("{}{}", base_url, key)
    } else {
        format!("{}/{}", base_url, key)
    }
}
