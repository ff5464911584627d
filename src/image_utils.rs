use image::{GrayImage, Luma, Rgb, RgbImage};

/// Longest edge (in pixels) of the working image
pub const MAX_WORKING_DIMENSION: u32 = 1024;

/// ITU-R 601 luma of an RGB pixel, fixed-point with rounding
#[inline]
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Single-channel luma reduction of an RGB image
pub fn to_luma(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        gray.put_pixel(x, y, Luma([luma(pixel)]));
    }

    gray
}

/// Clamp a float sample to the u8 range, truncating toward zero
#[inline]
pub fn clamp_truncate(value: f32) -> u8 {
    if value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        value as u8
    }
}

/// Dimensions bounded so that the longer edge does not exceed `max_dimension`.
/// Returns `None` when the image already fits.
pub fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dimension {
        return None;
    }

    let ratio = max_dimension as f64 / longest as f64;
    let new_width = ((width as f64 * ratio) as u32).max(1);
    let new_height = ((height as f64 * ratio) as u32).max(1);

    Some((new_width, new_height))
}

/// Resize an image to the specified dimensions with Lanczos resampling
pub fn resize_image(image: &RgbImage, dimensions: (u32, u32)) -> RgbImage {
    let (width, height) = dimensions;
    image::imageops::resize(
        image,
        width,
        height,
        image::imageops::FilterType::Lanczos3,
    )
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

/// Population mean and standard deviation of a sample stream
pub fn mean_and_std<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for value in values {
        count += 1;
        sum += value;
        sum_sq += value * value;
    }

    if count == 0 {
        return (0.0, 0.0);
    }

    let mean = sum / count as f64;
    // Guard against tiny negative results from cancellation
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);

    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn luma_of_gray_is_identity() {
        for v in [0u8, 1, 77, 128, 200, 255] {
            assert_eq!(luma(&Rgb([v, v, v])), v);
        }
    }

    #[test]
    fn luma_weights_green_most() {
        assert!(luma(&Rgb([0, 255, 0])) > luma(&Rgb([255, 0, 0])));
        assert!(luma(&Rgb([255, 0, 0])) > luma(&Rgb([0, 0, 255])));
    }

    #[test]
    fn bounded_dimensions_preserves_aspect() {
        assert_eq!(bounded_dimensions(800, 600, 1024), None);
        assert_eq!(bounded_dimensions(2048, 1024, 1024), Some((1024, 512)));
        assert_eq!(bounded_dimensions(1000, 3000, 1024), Some((341, 1024)));
    }

    #[test]
    fn clamp_truncate_saturates() {
        assert_eq!(clamp_truncate(-3.0), 0);
        assert_eq!(clamp_truncate(100.9), 100);
        assert_eq!(clamp_truncate(300.0), 255);
    }

    #[test]
    fn mean_and_std_of_constant_is_zero_spread() {
        let (mean, std) = mean_and_std(vec![4.0; 10]);
        assert_approx_eq!(mean, 4.0);
        assert_approx_eq!(std, 0.0);

        let (mean, std) = mean_and_std(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_approx_eq!(mean, 5.0);
        assert_approx_eq!(std, 2.0);
    }
}
