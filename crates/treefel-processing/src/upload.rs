//! Upload orchestration: normalize, name, store, resolve URL.

use crate::error::ImageError;
use crate::image::{ImageNormalizer, NormalizeOptions};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use treefel_core::constants::{
    DEFAULT_UPLOAD_FOLDER, STORED_IMAGE_CONTENT_TYPE, STORED_IMAGE_EXTENSION,
};
use treefel_storage::{generate_image_key, Storage, StorageError};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The blocking normalization task panicked or was cancelled
    #[error("Image processing task failed: {0}")]
    Task(String),
}

impl UploadError {
    /// True only for input the caller should not retry unchanged
    pub fn is_client_error(&self) -> bool {
        matches!(self, UploadError::Decode(_))
    }
}

impl From<ImageError> for UploadError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Decode(msg) => UploadError::Decode(msg),
            ImageError::Encode(msg) => UploadError::Encode(msg),
        }
    }
}

/// A stored, normalized image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Storage key, `{folder}/{32 hex}.jpg`
    pub key: String,
    /// Public URL of the stored object
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

/// Normalizes images and writes them to an injected store.
#[derive(Clone)]
pub struct ImageUploader {
    storage: Arc<dyn Storage>,
    normalizer: Arc<ImageNormalizer>,
}

impl ImageUploader {
    /// Uploader with default normalization (1920px, quality 85, white background)
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_options(storage, NormalizeOptions::default())
    }

    pub fn with_options(storage: Arc<dyn Storage>, options: NormalizeOptions) -> Self {
        Self {
            storage,
            normalizer: Arc::new(ImageNormalizer::new(options)),
        }
    }

    pub fn options(&self) -> &NormalizeOptions {
        self.normalizer.options()
    }

    /// [`upload`](Self::upload) into the default `uploads` folder
    pub async fn upload_default(&self, data: Bytes) -> Result<UploadedImage, UploadError> {
        self.upload(data, DEFAULT_UPLOAD_FOLDER).await
    }

    /// Normalize `data`, store it under a fresh key in `folder` and return
    /// where it can be fetched.
    ///
    /// Nothing is written when normalization fails. A storage failure returns
    /// [`UploadError::Storage`] and no URL.
    pub async fn upload(&self, data: Bytes, folder: &str) -> Result<UploadedImage, UploadError> {
        let start = std::time::Instant::now();
        let input_bytes = data.len();

        let normalizer = Arc::clone(&self.normalizer);
        let normalized = tokio::task::spawn_blocking(move || normalizer.normalize(&data))
            .await
            .map_err(|e| UploadError::Task(e.to_string()))??;

        let key = generate_image_key(folder, STORED_IMAGE_EXTENSION)?;
        let size_bytes = normalized.data.len();

        let stored_path = self
            .storage
            .save(&key, normalized.data, STORED_IMAGE_CONTENT_TYPE)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to store normalized image");
            })?;

        let url = self.storage.url_for(&stored_path);

        tracing::info!(
            key = %stored_path,
            folder = %folder,
            input_bytes = input_bytes,
            size_bytes = size_bytes,
            width = normalized.width,
            height = normalized.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image uploaded"
        );

        Ok(UploadedImage {
            key: stored_path,
            url,
            width: normalized.width,
            height: normalized.height,
            size_bytes,
        })
    }
}
