// src/preprocessing.rs - Decoding, working-resolution bound and fixed enhancement chain

use image::{Rgb, RgbImage};
use imageproc::filter::median_filter;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{PipelineStage, Result, ScreeningError};
use crate::image_utils::{
    bounded_dimensions, clamp_truncate, in_bounds, luma, resize_image, MAX_WORKING_DIMENSION,
};

/// Enhancement factors, applied in this order
pub const CONTRAST_FACTOR: f32 = 1.2;
pub const SHARPNESS_FACTOR: f32 = 1.3;
pub const BRIGHTNESS_FACTOR: f32 = 1.1;

/// Median filter radius (3x3 window)
const DENOISE_RADIUS: u32 = 1;

/// 3x3 smoothing kernel used as the sharpness baseline
const SMOOTH_KERNEL: [[u32; 3]; 3] = [[1, 1, 1], [1, 5, 1], [1, 1, 1]];
const SMOOTH_KERNEL_SUM: u32 = 13;

/// Decoded image at working resolution, plus its enhanced variant.
/// Both buffers always share the same dimensions.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Kept for resolution and quality reporting only
    pub original: RgbImage,
    /// All feature extraction reads this buffer
    pub enhanced: RgbImage,
}

impl PreparedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.original.dimensions()
    }

    pub fn quality(&self) -> ImageQuality {
        let (width, height) = self.dimensions();
        ImageQuality::from_pixel_count(width as u64 * height as u64)
    }
}

/// Coarse resolution label for the working image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl ImageQuality {
    const THRESHOLDS: [(u64, ImageQuality); 3] = [
        (1_000_000, ImageQuality::Excellent),
        (500_000, ImageQuality::Good),
        (200_000, ImageQuality::Moderate),
    ];

    pub fn from_pixel_count(pixels: u64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| pixels >= *min)
            .map(|(_, quality)| *quality)
            .unwrap_or(ImageQuality::Low)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Excellent => "excellent",
            ImageQuality::Good => "good",
            ImageQuality::Moderate => "moderate",
            ImageQuality::Low => "low",
        }
    }
}

/// Decode raw bytes, bound the working resolution and enhance
pub fn preprocess_image(data: &[u8]) -> Result<PreparedImage> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| ScreeningError::decode(PipelineStage::Preprocessing, e.to_string()))?;

    prepare(decoded.to_rgb8())
}

/// Bound the working resolution of an RGB image and enhance it
pub fn prepare(image: RgbImage) -> Result<PreparedImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ScreeningError::processing(
            PipelineStage::Preprocessing,
            "decoded image has no pixels",
        ));
    }

    let original = match bounded_dimensions(width, height, MAX_WORKING_DIMENSION) {
        Some(dimensions) => {
            debug!(
                "Downsampling {}x{} to {}x{}",
                width, height, dimensions.0, dimensions.1
            );
            resize_image(&image, dimensions)
        }
        None => image,
    };

    let enhanced = enhance_image(&original);

    Ok(PreparedImage { original, enhanced })
}

/// Fixed enhancement chain: contrast, sharpness, brightness, then median denoise
pub fn enhance_image(image: &RgbImage) -> RgbImage {
    let contrasted = adjust_contrast(image, CONTRAST_FACTOR);
    let sharpened = adjust_sharpness(&contrasted, SHARPNESS_FACTOR);
    let brightened = adjust_brightness(&sharpened, BRIGHTNESS_FACTOR);
    median_filter(&brightened, DENOISE_RADIUS, DENOISE_RADIUS)
}

/// Scale each sample's distance from the mean luma by `factor`
pub fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = (image.width() as u64 * image.height() as u64).max(1);
    let luma_sum: u64 = image.pixels().map(|p| luma(p) as u64).sum();
    let mean = (luma_sum as f64 / pixel_count as f64 + 0.5) as u8;

    let degenerate = RgbImage::from_pixel(image.width(), image.height(), Rgb([mean; 3]));
    blend(&degenerate, image, factor)
}

/// Push each pixel away from (or toward) a smoothed copy of the image
pub fn adjust_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = smooth(image);
    blend(&smoothed, image, factor)
}

/// Scale all samples toward or away from black
pub fn adjust_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let black = RgbImage::new(image.width(), image.height());
    blend(&black, image, factor)
}

/// `base + factor * (image - base)`, clamped per sample
fn blend(base: &RgbImage, image: &RgbImage, factor: f32) -> RgbImage {
    let mut result = RgbImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let b = base.get_pixel(x, y);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let from = b[c] as f32;
            out[c] = clamp_truncate(from + factor * (pixel[c] as f32 - from));
        }
        result.put_pixel(x, y, Rgb(out));
    }

    result
}

/// 3x3 weighted smoothing; the one-pixel border is copied unchanged
fn smooth(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut result = image.clone();

    if width < 3 || height < 3 {
        return result;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sums = [0u32; 3];

            for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let img_x = x as i32 + kx as i32 - 1;
                    let img_y = y as i32 + ky as i32 - 1;
                    if !in_bounds(img_x, img_y, width, height) {
                        continue;
                    }
                    let neighbour = image.get_pixel(img_x as u32, img_y as u32);
                    for c in 0..3 {
                        sums[c] += neighbour[c] as u32 * weight;
                    }
                }
            }

            let mut out = [0u8; 3];
            for c in 0..3 {
                out[c] = ((sums[c] + SMOOTH_KERNEL_SUM / 2) / SMOOTH_KERNEL_SUM).min(255) as u8;
            }
            result.put_pixel(x, y, Rgb(out));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_red_stays_red_after_enhancement() {
        let image = RgbImage::from_pixel(200, 200, Rgb([255, 100, 100]));
        let enhanced = enhance_image(&image);

        let pixel = enhanced.get_pixel(57, 113);
        assert_eq!(pixel[0], 255);
        // Contrast pulls green/blue down, brightness lifts them back
        assert!(pixel[1] >= 98 && pixel[1] <= 101, "green was {}", pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
        assert!(enhanced.pixels().all(|p| p == pixel));
    }

    #[test]
    fn uniform_gray_only_brightens() {
        let image = RgbImage::from_pixel(150, 150, Rgb([128, 128, 128]));
        let enhanced = enhance_image(&image);

        assert!(enhanced.pixels().all(|p| p.0 == [140, 140, 140]));
    }

    #[test]
    fn oversized_image_is_bounded_for_both_variants() {
        let image = RgbImage::from_pixel(2048, 1536, Rgb([10, 20, 30]));
        let prepared = prepare(image).unwrap();

        assert_eq!(prepared.original.dimensions(), (1024, 768));
        assert_eq!(prepared.enhanced.dimensions(), (1024, 768));
    }

    #[test]
    fn small_image_keeps_resolution() {
        let image = RgbImage::from_pixel(300, 120, Rgb([10, 20, 30]));
        let prepared = prepare(image).unwrap();
        assert_eq!(prepared.dimensions(), (300, 120));
        assert_eq!(prepared.quality(), ImageQuality::Low);
    }

    #[test]
    fn quality_thresholds() {
        assert_eq!(ImageQuality::from_pixel_count(1_048_576), ImageQuality::Excellent);
        assert_eq!(ImageQuality::from_pixel_count(500_000), ImageQuality::Good);
        assert_eq!(ImageQuality::from_pixel_count(200_000), ImageQuality::Moderate);
        assert_eq!(ImageQuality::from_pixel_count(199_999), ImageQuality::Low);
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend(std::iter::repeat(7u8).take(2048));
        assert!(matches!(
            preprocess_image(&data),
            Err(ScreeningError::DecodeFailure { stage: PipelineStage::Preprocessing, .. })
        ));
    }

    #[test]
    fn sharpness_leaves_flat_regions_alone() {
        let image = RgbImage::from_pixel(10, 10, Rgb([90, 60, 30]));
        assert_eq!(adjust_sharpness(&image, SHARPNESS_FACTOR), image);
    }
}
