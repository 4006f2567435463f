//! Image normalization: decode, flatten to RGB, bound, re-encode as JPEG.

pub mod normalizer;
pub mod resize;

pub use normalizer::{normalize, ImageNormalizer, NormalizeOptions, NormalizedImage};
pub use resize::{downscale, fit_within};
