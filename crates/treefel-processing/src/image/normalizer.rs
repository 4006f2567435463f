use crate::compression::JpegEncoder;
use crate::error::ImageError;
use crate::image::resize::downscale;
use bytes::Bytes;
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use std::io::Cursor;
use treefel_core::constants::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION};

/// Opaque white, the background transparent pixels are composited onto.
pub const DEFAULT_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Parameters for [`ImageNormalizer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Longest allowed edge in pixels (at least 1)
    pub max_dimension: u32,
    /// JPEG quality, 1..=100
    pub quality: u8,
    /// Color alpha is flattened onto
    pub background: Rgb<u8>,
}

impl NormalizeOptions {
    /// Build options, raising a zero `max_dimension` to 1 and clamping
    /// `quality` into 1..=100.
    pub fn new(max_dimension: u32, quality: u8) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            quality: quality.clamp(1, 100),
            background: DEFAULT_BACKGROUND,
        }
    }

    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY)
    }
}

/// Result of a normalization
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Complete JPEG stream
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Converts arbitrary raster input into a bounded, RGB, optimized JPEG.
///
/// Stateless apart from its options; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    options: NormalizeOptions,
}

impl ImageNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Decode `input`, flatten it to 8-bit RGB, downscale it to fit within
    /// `max_dimension` and encode it as JPEG.
    ///
    /// Only the first frame of animated input is kept.
    pub fn normalize(&self, input: &[u8]) -> Result<NormalizedImage, ImageError> {
        let img = decode(input)?;
        let rgb = flatten(img, self.options.background);
        let rgb = downscale(rgb, self.options.max_dimension);
        let (width, height) = rgb.dimensions();

        let data = JpegEncoder::new(self.options.quality).encode(&rgb)?;

        tracing::debug!(
            input_bytes = input.len(),
            output_bytes = data.len(),
            width = width,
            height = height,
            "Image normalized"
        );

        Ok(NormalizedImage {
            data,
            width,
            height,
        })
    }
}

/// Normalize `input` with the given bounds and quality and a white background.
pub fn normalize(
    input: &[u8],
    max_dimension: u32,
    quality: u8,
) -> Result<NormalizedImage, ImageError> {
    ImageNormalizer::new(NormalizeOptions::new(max_dimension, quality)).normalize(input)
}

/// Decode with the format sniffed from content, ignoring any claimed type.
fn decode(input: &[u8]) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    if reader.format().is_none() {
        return Err(ImageError::Decode("Unrecognized image format".to_string()));
    }

    Ok(reader.decode()?)
}

/// Convert any color mode to 8-bit RGB, compositing alpha over `background`.
fn flatten(img: DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let Rgb([bg_r, bg_g, bg_b]) = background;
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([blend(r, bg_r, a), blend(g, bg_g, a), blend(b, bg_b, a)])
    })
}

fn blend(src: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    ((src as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, GrayImage, ImageBuffer, ImageFormat, Luma, LumaA, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, format).unwrap();
        buffer
    }

    fn rgb_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        encode(DynamicImage::ImageRgb8(img), format)
    }

    fn decode_output(out: &NormalizedImage) -> DynamicImage {
        assert_eq!(image::guess_format(&out.data).unwrap(), ImageFormat::Jpeg);
        image::load_from_memory_with_format(&out.data, ImageFormat::Jpeg).unwrap()
    }

    fn assert_close(actual: Rgb<u8>, expected: [u8; 3]) {
        for (a, e) in actual.0.iter().zip(expected) {
            assert!(
                (*a as i16 - e as i16).abs() <= 4,
                "pixel {:?} not close to {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let input = rgb_image(800, 600, ImageFormat::Png);
        let out = ImageNormalizer::default().normalize(&input).unwrap();

        assert_eq!((out.width, out.height), (800, 600));
        let decoded = decode_output(&out);
        assert_eq!((decoded.width(), decoded.height()), (800, 600));
    }

    #[test]
    fn test_large_square_downscaled() {
        let input = rgb_image(4000, 4000, ImageFormat::Png);
        let out = ImageNormalizer::default().normalize(&input).unwrap();

        let decoded = decode_output(&out);
        assert_eq!((decoded.width(), decoded.height()), (1920, 1920));
    }

    #[test]
    fn test_bounding_box_exact_longer_edge() {
        let input = rgb_image(300, 120, ImageFormat::Png);
        let out = normalize(&input, 100, 85).unwrap();

        let decoded = decode_output(&out);
        assert_eq!(decoded.width(), 100);
        // 120 * 100 / 300 = 40
        assert!((decoded.height() as i32 - 40).abs() <= 1);

        let input = rgb_image(90, 270, ImageFormat::Png);
        let decoded = decode_output(&normalize(&input, 100, 85).unwrap());
        assert_eq!(decoded.height(), 100);
        assert!((decoded.width() as i32 - 33).abs() <= 1);
    }

    #[test]
    fn test_every_input_format_becomes_jpeg() {
        for format in [
            ImageFormat::Png,
            ImageFormat::Jpeg,
            ImageFormat::Gif,
            ImageFormat::Bmp,
            ImageFormat::WebP,
        ] {
            let input = rgb_image(64, 48, format);
            let out = ImageNormalizer::default()
                .normalize(&input)
                .unwrap_or_else(|e| panic!("{:?} failed: {}", format, e));

            let decoded = decode_output(&out);
            assert_eq!((decoded.width(), decoded.height()), (64, 48), "{:?}", format);
            assert_eq!(decoded.color(), ColorType::Rgb8, "{:?}", format);
        }
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 0]));
        let input = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let decoded = decode_output(&ImageNormalizer::default().normalize(&input).unwrap());
        assert_close(*decoded.to_rgb8().get_pixel(16, 16), [255, 255, 255]);
    }

    #[test]
    fn test_opaque_pixels_unchanged() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([200, 30, 60, 255]));
        let input = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let decoded = decode_output(&ImageNormalizer::default().normalize(&input).unwrap());
        assert_close(*decoded.to_rgb8().get_pixel(16, 16), [200, 30, 60]);
    }

    #[test]
    fn test_half_transparent_blends_with_background() {
        let img = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 128]));
        let input = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let decoded = decode_output(&ImageNormalizer::default().normalize(&input).unwrap());
        assert_close(*decoded.to_rgb8().get_pixel(16, 16), [127, 127, 127]);
    }

    #[test]
    fn test_custom_background() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let input = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let normalizer =
            ImageNormalizer::new(NormalizeOptions::default().with_background(Rgb([0, 0, 255])));
        let decoded = decode_output(&normalizer.normalize(&input).unwrap());
        assert_close(*decoded.to_rgb8().get_pixel(8, 8), [0, 0, 255]);
    }

    #[test]
    fn test_grayscale_becomes_rgb() {
        let gray = GrayImage::from_pixel(20, 20, Luma([90]));
        let input = encode(DynamicImage::ImageLuma8(gray), ImageFormat::Png);
        let decoded = decode_output(&ImageNormalizer::default().normalize(&input).unwrap());
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_close(*decoded.to_rgb8().get_pixel(10, 10), [90, 90, 90]);

        let gray_alpha = ImageBuffer::from_pixel(20, 20, LumaA([0u8, 0]));
        let input = encode(DynamicImage::ImageLumaA8(gray_alpha), ImageFormat::Png);
        let decoded = decode_output(&ImageNormalizer::default().normalize(&input).unwrap());
        assert_close(*decoded.to_rgb8().get_pixel(10, 10), [255, 255, 255]);
    }

    #[test]
    fn test_sixteen_bit_input() {
        let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(24, 24, Rgba([65535, 0, 0, 65535]));
        let input = encode(DynamicImage::ImageRgba16(img), ImageFormat::Png);

        let decoded = decode_output(&ImageNormalizer::default().normalize(&input).unwrap());
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_close(*decoded.to_rgb8().get_pixel(12, 12), [254, 0, 0]);
    }

    #[test]
    fn test_text_is_decode_error() {
        let result = ImageNormalizer::default().normalize(b"definitely not an image");
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_edge_beyond_jpeg_limit_is_encode_error() {
        let input = rgb_image(70_000, 2, ImageFormat::Png);
        let result = normalize(&input, 100_000, 85);
        assert!(matches!(result, Err(ImageError::Encode(_))));

        // Downscaling first brings the same input within the limit
        let out = normalize(&input, 1920, 85).unwrap();
        assert_eq!((out.width, out.height), (1920, 1));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let input = rgb_image(64, 64, ImageFormat::Png);
        let result = ImageNormalizer::default().normalize(&input[..input.len() / 2]);
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let result = ImageNormalizer::default().normalize(&[]);
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_options_clamped() {
        let options = NormalizeOptions::new(0, 0);
        assert_eq!(options.max_dimension, 1);
        assert_eq!(options.quality, 1);
        assert_eq!(NormalizeOptions::new(10, 250).quality, 100);

        let input = rgb_image(8, 4, ImageFormat::Png);
        let out = normalize(&input, 0, 85).unwrap();
        assert_eq!((out.width, out.height), (1, 1));
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend(0, 255, 0), 255);
        assert_eq!(blend(0, 255, 255), 0);
        assert_eq!(blend(200, 255, 255), 200);
        assert_eq!(blend(0, 255, 128), 127);
    }
}
