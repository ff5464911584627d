// src/color_analysis.rs - Channel statistics, redness index and inflammation indicators

use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::image_utils::mean_and_std;

/// Per-pixel margin by which red must exceed both green and blue
pub const RED_DOMINANCE_MARGIN: i16 = 20;

/// Red-dominant share (percent) above which the area is "likely inflamed"
pub const LIKELY_INFLAMED_PERCENT: f64 = 30.0;

/// Qualitative inflammation estimate from the red-dominant share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflammationEstimate {
    Low,
    Medium,
    High,
}

impl InflammationEstimate {
    /// Lower bounds (exclusive, percent), highest first
    const THRESHOLDS: [(f64, InflammationEstimate); 2] = [
        (50.0, InflammationEstimate::High),
        (30.0, InflammationEstimate::Medium),
    ];

    pub fn from_percentage(percentage: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| percentage > *min)
            .map(|(_, estimate)| *estimate)
            .unwrap_or(InflammationEstimate::Low)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflammationIndicators {
    /// Share of pixels (0-100) where red beats green and blue by the margin
    pub red_dominant_percentage: f64,
    pub likely_inflamed: bool,
    pub severity_estimate: InflammationEstimate,
}

/// Colour features of the enhanced image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorProfile {
    pub mean_rgb: [f64; 3],
    pub std_rgb: [f64; 3],
    /// Per-channel mean, truncated
    pub dominant_color: [u8; 3],
    /// 0-100
    pub redness_score: f64,
    /// Standard deviation over every channel sample
    pub color_variance: f64,
    pub inflammation: InflammationIndicators,
}

/// Compute the colour profile of an RGB image
pub fn analyze_color(image: &RgbImage) -> ColorProfile {
    let mut mean_rgb = [0.0; 3];
    let mut std_rgb = [0.0; 3];

    for channel in 0..3 {
        let (mean, std) = mean_and_std(image.pixels().map(|p| p[channel] as f64));
        mean_rgb[channel] = mean;
        std_rgb[channel] = std;
    }

    let (_, color_variance) = mean_and_std(image.as_raw().iter().map(|&v| v as f64));

    let profile = ColorProfile {
        mean_rgb,
        std_rgb,
        dominant_color: dominant_color(&mean_rgb),
        redness_score: redness_score(&mean_rgb),
        color_variance,
        inflammation: detect_inflammation(image),
    };

    debug!(
        "Colour: mean {:.1?}, redness {:.2}, red-dominant {:.2}%",
        profile.mean_rgb, profile.redness_score, profile.inflammation.red_dominant_percentage
    );

    profile
}

/// Mean colour stands in for the dominant colour; no clustering
pub fn dominant_color(mean_rgb: &[f64; 3]) -> [u8; 3] {
    [
        mean_rgb[0] as u8,
        mean_rgb[1] as u8,
        mean_rgb[2] as u8,
    ]
}

/// Red dominance over both green and blue means, scaled to 0-100.
/// Degenerate images with a non-positive green or blue mean score 0.
pub fn redness_score(mean_rgb: &[f64; 3]) -> f64 {
    let [r, g, b] = *mean_rgb;
    if g <= 0.0 || b <= 0.0 {
        return 0.0;
    }

    let redness = ((r - g) + (r - b)) / 2.0;
    (redness / 2.55).clamp(0.0, 100.0)
}

/// Share of pixels where red exceeds both other channels by the margin
pub fn detect_inflammation(image: &RgbImage) -> InflammationIndicators {
    let total = image.width() as u64 * image.height() as u64;

    let red_dominant = image
        .pixels()
        .filter(|p| {
            let [r, g, b] = p.0.map(|v| v as i16);
            r > g + RED_DOMINANCE_MARGIN && r > b + RED_DOMINANCE_MARGIN
        })
        .count() as u64;

    let red_dominant_percentage = if total == 0 {
        0.0
    } else {
        red_dominant as f64 / total as f64 * 100.0
    };

    InflammationIndicators {
        red_dominant_percentage,
        likely_inflamed: red_dominant_percentage > LIKELY_INFLAMED_PERCENT,
        severity_estimate: InflammationEstimate::from_percentage(red_dominant_percentage),
    }
}
