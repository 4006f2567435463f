//! Treefel Storage Library
//!
//! This crate provides the storage capability the image pipeline writes to,
//! with implementations for S3-compatible object stores, the local
//! filesystem and process memory.
//!
//! # Storage key format
//!
//! Uploaded images are stored under `{folder}/{32 hex chars}.jpg`. Keys must
//! not contain `..`, backslashes or a leading `/`. Key generation lives in the
//! [`keys`] module so every caller produces the same layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_image_key, validate_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use treefel_core::StorageBackend;
