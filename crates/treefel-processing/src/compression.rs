use crate::error::ImageError;
use bytes::Bytes;
use image::RgbImage;
use std::panic::{self, AssertUnwindSafe};
use treefel_core::constants::{DEFAULT_JPEG_QUALITY, MAX_JPEG_DIMENSION};

/// Baseline JPEG encoder backed by mozjpeg
///
/// Huffman tables are optimized per image (`optimize_coding`), which shrinks
/// output without affecting quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create an encoder; quality is clamped into 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an 8-bit RGB buffer to a complete JPEG stream
    ///
    /// Buffers with an edge longer than [`MAX_JPEG_DIMENSION`] are rejected
    /// with [`ImageError::Encode`].
    pub fn encode(&self, img: &RgbImage) -> Result<Bytes, ImageError> {
        let (width, height) = img.dimensions();
        if width > MAX_JPEG_DIMENSION || height > MAX_JPEG_DIMENSION {
            return Err(ImageError::Encode(format!(
                "{}x{} exceeds the JPEG limit of {} pixels per edge",
                width, height, MAX_JPEG_DIMENSION
            )));
        }

        // mozjpeg reports libjpeg errors by unwinding
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.compress(img)));
        let jpeg_data = result
            .map_err(|_| ImageError::Encode("JPEG encoder aborted".to_string()))??;

        Ok(Bytes::from(jpeg_data))
    }

    fn compress(&self, img: &RgbImage) -> Result<Vec<u8>, ImageError> {
        let (width, height) = img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(self.quality as f32);
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        comp.write_scanlines(img.as_raw())
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        comp.finish().map_err(|e| ImageError::Encode(e.to_string()))
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    #[test]
    fn test_encode_produces_jpeg() {
        let img = RgbImage::from_pixel(64, 32, Rgb([10, 200, 30]));
        let data = JpegEncoder::default().encode(&img).unwrap();

        assert_eq!(&data[..3], &[0xFF, 0xD8, 0xFF]);
        assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn test_quality_clamped() {
        assert_eq!(JpegEncoder::new(0).quality(), 1);
        assert_eq!(JpegEncoder::new(200).quality(), 100);
        assert_eq!(JpegEncoder::new(85).quality(), 85);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let img = RgbImage::from_fn(128, 128, |x, y| {
            Rgb([(x * 2) as u8, (y * 2) as u8, ((x ^ y) * 2) as u8])
        });
        let low = JpegEncoder::new(20).encode(&img).unwrap();
        let high = JpegEncoder::new(95).encode(&img).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_oversized_edge_is_encode_error() {
        let wide = RgbImage::new(MAX_JPEG_DIMENSION + 1, 1);
        assert!(matches!(
            JpegEncoder::default().encode(&wide),
            Err(ImageError::Encode(_))
        ));

        let tall = RgbImage::new(1, MAX_JPEG_DIMENSION + 1);
        assert!(matches!(
            JpegEncoder::default().encode(&tall),
            Err(ImageError::Encode(_))
        ));
    }

    #[test]
    fn test_edge_at_limit_encodes() {
        let img = RgbImage::new(MAX_JPEG_DIMENSION, 1);
        let data = JpegEncoder::default().encode(&img).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.width(), MAX_JPEG_DIMENSION);
    }
}
