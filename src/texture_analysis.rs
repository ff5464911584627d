// src/texture_analysis.rs - Histogram and gradient texture measures on the luma channel

use image::{GrayImage, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::image_utils::{mean_and_std, to_luma};

/// Smoothness below this marks the surface as rough
pub const ROUGH_SMOOTHNESS_CUTOFF: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureType {
    Rough,
    Smooth,
}

impl TextureType {
    pub fn from_smoothness(smoothness: f64) -> Self {
        if smoothness < ROUGH_SMOOTHNESS_CUTOFF {
            TextureType::Rough
        } else {
            TextureType::Smooth
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextureType::Rough => "rough",
            TextureType::Smooth => "smooth",
        }
    }
}

/// Texture features of the enhanced image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureProfile {
    /// `1 - 1/(1 + variance)`, in [0, 1)
    pub smoothness: f64,
    /// Histogram energy, in (0, 1]
    pub uniformity: f64,
    /// Shannon entropy of the histogram, in bits
    pub entropy: f64,
    /// Fraction of pixels above the adaptive gradient threshold
    pub edge_density: f64,
    pub texture_type: TextureType,
}

/// Compute the texture profile from a luma reduction of the image
pub fn analyze_texture(image: &RgbImage) -> TextureProfile {
    let gray = to_luma(image);
    let histogram = normalized_histogram(&gray);

    let smoothness = smoothness(&gray);
    let profile = TextureProfile {
        smoothness,
        uniformity: uniformity(&histogram),
        entropy: entropy(&histogram),
        edge_density: edge_density(&gray),
        texture_type: TextureType::from_smoothness(smoothness),
    };

    debug!(
        "Texture: smoothness {:.3}, uniformity {:.4}, entropy {:.3}, edge density {:.4} ({})",
        profile.smoothness,
        profile.uniformity,
        profile.entropy,
        profile.edge_density,
        profile.texture_type.as_str()
    );

    profile
}

pub fn smoothness(gray: &GrayImage) -> f64 {
    let (_, std) = mean_and_std(gray.as_raw().iter().map(|&v| v as f64));
    let variance = std * std;
    1.0 - 1.0 / (1.0 + variance)
}

/// 256-bin intensity histogram as probabilities
pub fn normalized_histogram(gray: &GrayImage) -> [f64; 256] {
    let mut counts = [0u64; 256];
    for &value in gray.as_raw() {
        counts[value as usize] += 1;
    }

    let total = gray.as_raw().len().max(1) as f64;
    let mut histogram = [0.0; 256];
    for (bin, count) in counts.iter().enumerate() {
        histogram[bin] = *count as f64 / total;
    }
    histogram
}

pub fn uniformity(histogram: &[f64; 256]) -> f64 {
    histogram.iter().map(|p| p * p).sum()
}

/// Base-2 entropy; empty bins contribute nothing
pub fn entropy(histogram: &[f64; 256]) -> f64 {
    let sum: f64 = histogram
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum();
    // Avoid reporting -0.0 for single-valued images
    if sum == 0.0 {
        0.0
    } else {
        -sum
    }
}

/// Share of pixels whose gradient magnitude exceeds mean + one standard deviation
pub fn edge_density(gray: &GrayImage) -> f64 {
    let magnitudes = gradient_magnitudes(gray);
    if magnitudes.is_empty() {
        return 0.0;
    }

    let (mean, std) = mean_and_std(magnitudes.iter().copied());
    let threshold = mean + std;
    let edge_pixels = magnitudes.iter().filter(|&&m| m > threshold).count();

    edge_pixels as f64 / magnitudes.len() as f64
}

/// Euclidean norm of finite-difference gradients along both axes.
///
/// Interior pixels use central differences, border pixels one-sided
/// differences; a single row or column has zero gradient along that axis.
pub fn gradient_magnitudes(gray: &GrayImage) -> Vec<f64> {
    let (width, height) = gray.dimensions();
    let at = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f64;

    let derivative = |len: u32, i: u32, sample: &dyn Fn(u32) -> f64| -> f64 {
        if len < 2 {
            0.0
        } else if i == 0 {
            sample(1) - sample(0)
        } else if i == len - 1 {
            sample(len - 1) - sample(len - 2)
        } else {
            (sample(i + 1) - sample(i - 1)) / 2.0
        }
    };

    let mut magnitudes = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let gx = derivative(width, x, &|i| at(i, y));
            let gy = derivative(height, y, &|j| at(x, j));
            magnitudes.push((gx * gx + gy * gy).sqrt());
        }
    }

    magnitudes
}
