//! Treefel Media Processing Library
//!
//! Normalizes uploaded images (RGB conversion, bounded downscale, optimized
//! JPEG re-encode) and uploads the result to a [`treefel_storage::Storage`].

pub mod compression;
pub mod error;
pub mod image;
pub mod upload;

// Re-export commonly used types
pub use compression::JpegEncoder;
pub use error::ImageError;
pub use crate::image::{normalize, ImageNormalizer, NormalizeOptions, NormalizedImage};
pub use upload::{ImageUploader, UploadError, UploadedImage};
