//! Shared constants.

/// Longest edge, in pixels, of a normalized image.
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// JPEG quality used for normalized images.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Folder used when the caller does not name one.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Extension of every stored image; output is always JPEG.
pub const STORED_IMAGE_EXTENSION: &str = "jpg";

/// Content type of every stored image.
pub const STORED_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Largest edge, in pixels, a JPEG stream can carry.
pub const MAX_JPEG_DIMENSION: u32 = 65500;
