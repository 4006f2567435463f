use thiserror::Error;

/// Image normalization errors
#[derive(Debug, Error)]
pub enum ImageError {
    /// Input is not a recognizable image, or is truncated/corrupt
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Encoder rejected a decoded buffer; a server-side fault
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}
