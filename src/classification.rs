// src/classification.rs - Rule chain mapping colour and texture features to candidate findings

use serde::{Deserialize, Serialize};

use crate::color_analysis::ColorProfile;
use crate::texture_analysis::{TextureProfile, TextureType};

/// Condition tags the classifier can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    InflammatorySkinCondition,
    PossibleRashOrEczema,
    IrregularSurfaceTexture,
    DarkPigmentation,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::InflammatorySkinCondition => "inflammatory_skin_condition",
            ConditionKind::PossibleRashOrEczema => "possible_rash_or_eczema",
            ConditionKind::IrregularSurfaceTexture => "irregular_surface_texture",
            ConditionKind::DarkPigmentation => "dark_pigmentation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConditionKind::InflammatorySkinCondition => "Inflammatory Skin Condition",
            ConditionKind::PossibleRashOrEczema => "Possible Rash Or Eczema",
            ConditionKind::IrregularSurfaceTexture => "Irregular Surface Texture",
            ConditionKind::DarkPigmentation => "Dark Pigmentation",
        }
    }
}

/// Qualitative confidence attached to a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "low-moderate")]
    LowModerate,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "moderate-high")]
    ModerateHigh,
    #[serde(rename = "high")]
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::LowModerate => "low-moderate",
            Confidence::Moderate => "moderate",
            Confidence::ModerateHigh => "moderate-high",
            Confidence::High => "high",
        }
    }
}

/// Feature observations that triggered a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    HighRedness,
    InflammationDetected,
    Redness,
    RoughTexture,
    HighEdgeDensity,
    TextureVariation,
    DarkColoration,
}

/// Warnings attached to a finding regardless of its confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgentWarning {
    DermatologistReferral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionFinding {
    pub condition: ConditionKind,
    pub confidence: Confidence,
    pub indicators: Vec<Indicator>,
    pub warning: Option<UrgentWarning>,
    /// Numeric weight (0-100) feeding the overall confidence label
    pub confidence_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDetection {
    /// In rule order
    pub findings: Vec<ConditionFinding>,
    pub requires_professional_evaluation: bool,
}

impl ConditionDetection {
    pub fn has(&self, kind: ConditionKind) -> bool {
        self.findings.iter().any(|f| f.condition == kind)
    }
}

pub const REDNESS_RULE_THRESHOLD: f64 = 30.0;
pub const INFLAMED_PERCENT_THRESHOLD: f64 = 40.0;
pub const IRREGULAR_EDGE_DENSITY: f64 = 0.15;
pub const DARK_CHANNEL_LIMIT: u8 = 80;
pub const DARK_SUM_LIMIT: u32 = 180;

/// One predicate-to-finding mapping
struct Rule {
    condition: ConditionKind,
    confidence: Confidence,
    indicators: &'static [Indicator],
    warning: Option<UrgentWarning>,
    applies: fn(&ColorProfile, &TextureProfile) -> bool,
    points: fn(&ColorProfile) -> f64,
}

/// Evaluated in order; every rule runs and several may fire
const RULES: [Rule; 4] = [
    Rule {
        condition: ConditionKind::InflammatorySkinCondition,
        confidence: Confidence::Moderate,
        indicators: &[Indicator::HighRedness, Indicator::InflammationDetected],
        warning: None,
        applies: |color, _| {
            color.redness_score > REDNESS_RULE_THRESHOLD
                && color.inflammation.red_dominant_percentage > INFLAMED_PERCENT_THRESHOLD
        },
        points: |color| (color.redness_score + 20.0).min(95.0),
    },
    Rule {
        condition: ConditionKind::PossibleRashOrEczema,
        confidence: Confidence::Moderate,
        indicators: &[Indicator::Redness, Indicator::RoughTexture],
        warning: None,
        applies: |color, texture| {
            color.redness_score > REDNESS_RULE_THRESHOLD
                && texture.texture_type == TextureType::Rough
        },
        points: |_| 65.0,
    },
    Rule {
        condition: ConditionKind::IrregularSurfaceTexture,
        confidence: Confidence::LowModerate,
        indicators: &[Indicator::HighEdgeDensity, Indicator::TextureVariation],
        warning: None,
        applies: |_, texture| texture.edge_density > IRREGULAR_EDGE_DENSITY,
        points: |_| 55.0,
    },
    // Low confidence but always referred: rare pattern, high stakes
    Rule {
        condition: ConditionKind::DarkPigmentation,
        confidence: Confidence::Low,
        indicators: &[Indicator::DarkColoration],
        warning: Some(UrgentWarning::DermatologistReferral),
        applies: |color, _| {
            let [r, g, b] = color.dominant_color;
            color.dominant_color.iter().all(|&c| c < DARK_CHANNEL_LIMIT)
                && (r as u32 + g as u32 + b as u32) < DARK_SUM_LIMIT
        },
        points: |_| 40.0,
    },
];

/// Run the rule chain over the two feature profiles
pub fn detect_conditions(color: &ColorProfile, texture: &TextureProfile) -> ConditionDetection {
    let findings: Vec<ConditionFinding> = RULES
        .iter()
        .filter(|rule| (rule.applies)(color, texture))
        .map(|rule| ConditionFinding {
            condition: rule.condition,
            confidence: rule.confidence,
            indicators: rule.indicators.to_vec(),
            warning: rule.warning,
            confidence_points: (rule.points)(color),
        })
        .collect();

    ConditionDetection {
        requires_professional_evaluation: !findings.is_empty(),
        findings,
    }
}

/// Overall confidence in the analysis, from the findings' points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallConfidence {
    NoSpecificFindings,
    LowModerate,
    Moderate,
    ModerateHigh,
}

impl OverallConfidence {
    pub fn from_detection(detection: &ConditionDetection) -> Self {
        if detection.findings.is_empty() {
            return OverallConfidence::NoSpecificFindings;
        }

        let total: f64 = detection.findings.iter().map(|f| f.confidence_points).sum();
        let average = total / detection.findings.len() as f64;

        if average > 70.0 {
            OverallConfidence::ModerateHigh
        } else if average > 50.0 {
            OverallConfidence::Moderate
        } else {
            OverallConfidence::LowModerate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_analysis::{InflammationEstimate, InflammationIndicators};

    fn color(redness: f64, inflamed: f64, dominant: [u8; 3]) -> ColorProfile {
        ColorProfile {
            mean_rgb: dominant.map(|c| c as f64),
            std_rgb: [0.0; 3],
            dominant_color: dominant,
            redness_score: redness,
            color_variance: 0.0,
            inflammation: InflammationIndicators {
                red_dominant_percentage: inflamed,
                likely_inflamed: inflamed > 30.0,
                severity_estimate: InflammationEstimate::from_percentage(inflamed),
            },
        }
    }

    fn texture(smoothness: f64, edge_density: f64) -> TextureProfile {
        TextureProfile {
            smoothness,
            uniformity: 0.1,
            entropy: 5.0,
            edge_density,
            texture_type: TextureType::from_smoothness(smoothness),
        }
    }

    fn kinds(detection: &ConditionDetection) -> Vec<ConditionKind> {
        detection.findings.iter().map(|f| f.condition).collect()
    }

    #[test]
    fn red_rough_image_fires_inflammatory_and_rash() {
        let detection = detect_conditions(&color(60.8, 100.0, [255, 99, 99]), &texture(0.0, 0.0));
        assert_eq!(
            kinds(&detection),
            vec![ConditionKind::InflammatorySkinCondition, ConditionKind::PossibleRashOrEczema]
        );
        assert!(detection.requires_professional_evaluation);
        assert!((detection.findings[0].confidence_points - 80.8).abs() < 1e-9);
        assert_eq!(detection.findings[1].confidence_points, 65.0);
    }

    #[test]
    fn rash_rule_is_independent_of_inflammation_extent() {
        let detection = detect_conditions(&color(35.0, 10.0, [200, 150, 150]), &texture(0.2, 0.0));
        assert_eq!(kinds(&detection), vec![ConditionKind::PossibleRashOrEczema]);
    }

    #[test]
    fn smooth_red_only_fires_inflammatory() {
        let detection = detect_conditions(&color(45.0, 55.0, [220, 120, 120]), &texture(0.9, 0.05));
        assert_eq!(kinds(&detection), vec![ConditionKind::InflammatorySkinCondition]);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let detection = detect_conditions(&color(30.0, 40.0, [150, 120, 120]), &texture(0.1, 0.15));
        assert!(detection.findings.is_empty());
        assert!(!detection.requires_professional_evaluation);
    }

    #[test]
    fn edge_density_rule_is_orthogonal_to_color() {
        let detection = detect_conditions(&color(0.0, 0.0, [128, 128, 128]), &texture(0.9, 0.151));
        assert_eq!(kinds(&detection), vec![ConditionKind::IrregularSurfaceTexture]);
        assert_eq!(detection.findings[0].confidence, Confidence::LowModerate);
    }

    #[test]
    fn dark_pigmentation_is_low_confidence_with_referral() {
        let detection = detect_conditions(&color(0.0, 0.0, [70, 60, 40]), &texture(0.9, 0.0));
        assert_eq!(kinds(&detection), vec![ConditionKind::DarkPigmentation]);

        let finding = &detection.findings[0];
        assert_eq!(finding.confidence, Confidence::Low);
        assert_eq!(finding.warning, Some(UrgentWarning::DermatologistReferral));
    }

    #[test]
    fn dark_pigmentation_needs_both_channel_and_sum_limits() {
        // Every channel under 80 but the sum reaches 180
        let detection = detect_conditions(&color(0.0, 0.0, [70, 60, 50]), &texture(0.9, 0.0));
        assert!(!detection.has(ConditionKind::DarkPigmentation));

        // Sum under 180 but one channel at 80
        let detection = detect_conditions(&color(0.0, 0.0, [80, 20, 20]), &texture(0.9, 0.0));
        assert!(!detection.has(ConditionKind::DarkPigmentation));
    }

    #[test]
    fn overall_confidence_from_points() {
        let none = detect_conditions(&color(0.0, 0.0, [128, 128, 128]), &texture(0.9, 0.0));
        assert_eq!(OverallConfidence::from_detection(&none), OverallConfidence::NoSpecificFindings);

        // (80.8 + 65) / 2 = 72.4
        let red = detect_conditions(&color(60.8, 100.0, [255, 99, 99]), &texture(0.0, 0.0));
        assert_eq!(OverallConfidence::from_detection(&red), OverallConfidence::ModerateHigh);

        // (55 + 40) / 2 = 47.5
        let dark = detect_conditions(&color(0.0, 0.0, [40, 40, 40]), &texture(0.9, 0.3));
        assert_eq!(OverallConfidence::from_detection(&dark), OverallConfidence::LowModerate);

        let edges = detect_conditions(&color(0.0, 0.0, [128, 128, 128]), &texture(0.9, 0.3));
        assert_eq!(OverallConfidence::from_detection(&edges), OverallConfidence::Moderate);
    }
}
