use image::imageops::{self, FilterType};
use image::RgbImage;

/// Target size for an image that must fit inside a `max_dimension` square.
///
/// Returns `None` when the image is already within bounds (no upscaling).
/// Otherwise the longer edge becomes exactly `max_dimension` and the shorter
/// edge is scaled proportionally, rounded, and never below 1.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let max_dimension = max_dimension.max(1);
    let long = width.max(height);
    if long <= max_dimension {
        return None;
    }

    let short = width.min(height);
    let scaled = (short as f64 * max_dimension as f64 / long as f64).round() as u32;
    let scaled = scaled.clamp(1, max_dimension);

    if width >= height {
        Some((max_dimension, scaled))
    } else {
        Some((scaled, max_dimension))
    }
}

/// Downscale so the image fits within `max_dimension`, using Lanczos3.
pub fn downscale(img: RgbImage, max_dimension: u32) -> RgbImage {
    match fit_within(img.width(), img.height(), max_dimension) {
        Some((width, height)) => imageops::resize(&img, width, height, FilterType::Lanczos3),
        None => img,
    }
}
