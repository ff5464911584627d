// src/severity.rs - Additive 0-7 severity score with table-driven cut-points

use serde::{Deserialize, Serialize};

use crate::color_analysis::ColorProfile;
use crate::texture_analysis::TextureProfile;

/// Highest reachable score (3 + 3 + 1)
pub const MAX_SEVERITY_SCORE: u8 = 7;

/// (exclusive lower bound, points), highest first; one bucket per factor
const REDNESS_POINTS: [(f64, u8); 3] = [(60.0, 3), (40.0, 2), (20.0, 1)];
const INFLAMED_PERCENT_POINTS: [(f64, u8); 3] = [(50.0, 3), (30.0, 2), (15.0, 1)];
const EDGE_DENSITY_POINTS: [(f64, u8); 1] = [(0.2, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Minimal => "minimal",
            SeverityLevel::Mild => "mild",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Routine => "routine",
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

/// (inclusive minimum score, level, urgency), highest first
const LEVELS: [(u8, SeverityLevel, Urgency); 3] = [
    (6, SeverityLevel::Severe, Urgency::High),
    (4, SeverityLevel::Moderate, Urgency::Medium),
    (2, SeverityLevel::Mild, Urgency::Low),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    pub score: u8,
    pub max_score: u8,
    pub level: SeverityLevel,
    pub urgency: Urgency,
    /// English description; localized text is produced at render time
    pub description: String,
}

/// Points from the first bucket whose bound the value exceeds
fn bucket_points(value: f64, table: &[(f64, u8)]) -> u8 {
    table
        .iter()
        .find(|(bound, _)| value > *bound)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

pub fn severity_score(color: &ColorProfile, texture: &TextureProfile) -> u8 {
    let score = bucket_points(color.redness_score, &REDNESS_POINTS)
        + bucket_points(color.inflammation.red_dominant_percentage, &INFLAMED_PERCENT_POINTS)
        + bucket_points(texture.edge_density, &EDGE_DENSITY_POINTS);
    score.min(MAX_SEVERITY_SCORE)
}

pub fn level_for_score(score: u8) -> (SeverityLevel, Urgency) {
    LEVELS
        .iter()
        .find(|(min, _, _)| score >= *min)
        .map(|(_, level, urgency)| (*level, *urgency))
        .unwrap_or((SeverityLevel::Minimal, Urgency::Routine))
}

pub fn describe(level: SeverityLevel) -> &'static str {
    match level {
        SeverityLevel::Severe => {
            "Significant visible changes detected. Immediate medical attention recommended."
        }
        SeverityLevel::Moderate => {
            "Noticeable skin changes detected. Medical consultation recommended within 1-2 days."
        }
        SeverityLevel::Mild => "Minor skin changes detected. Monitor and consult doctor if worsens.",
        SeverityLevel::Minimal => "Minimal changes detected. Continue monitoring.",
    }
}

/// Score the two feature profiles and map the total to a level and urgency
pub fn assess_severity(color: &ColorProfile, texture: &TextureProfile) -> SeverityAssessment {
    let score = severity_score(color, texture);
    let (level, urgency) = level_for_score(score);

    SeverityAssessment {
        score,
        max_score: MAX_SEVERITY_SCORE,
        level,
        urgency,
        description: describe(level).to_string(),
    }
}
