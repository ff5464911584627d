// src/report.rs - Localized recommendations, next steps and the multi-section text report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::{ConditionDetection, OverallConfidence, UrgentWarning};
use crate::color_analysis::ColorProfile;
use crate::history::{Trend, TrendComparison};
use crate::localization::{lines, text, Language, LineSet, Template};
use crate::preprocessing::ImageQuality;
use crate::severity::{SeverityAssessment, SeverityLevel, Urgency};
use crate::texture_analysis::TextureProfile;
use crate::validation::ImageMetadata;

const BANNER_WIDTH: usize = 50;

/// Everything known about one successful analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ImageMetadata,
    /// Working resolution as "WxH"
    pub resolution: String,
    pub pixel_count: u64,
    pub image_quality: ImageQuality,
    pub color: ColorProfile,
    pub texture: TextureProfile,
    pub detection: ConditionDetection,
    pub severity: SeverityAssessment,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub overall_confidence: OverallConfidence,
    pub confidence_label: String,
    pub disclaimer: String,
    pub language: Language,
}

impl AnalysisReport {
    pub fn analysis_timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }

    /// Recommendation lines joined for direct display
    pub fn recommendation_text(&self) -> String {
        self.recommendations.join("\n")
    }
}

/// Trend against an earlier submission, with localized advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    #[serde(flatten)]
    pub comparison: TrendComparison,
    pub recommendation: String,
}

impl TrendReport {
    pub fn new(comparison: TrendComparison, language: Language) -> Self {
        let recommendation = trend_recommendation(comparison.trend, language).to_string();
        Self {
            comparison,
            recommendation,
        }
    }
}

/// Assemble the report from the analysis stages' outputs
pub fn compose_report(
    metadata: ImageMetadata,
    working_dimensions: (u32, u32),
    color: ColorProfile,
    texture: TextureProfile,
    detection: ConditionDetection,
    severity: SeverityAssessment,
    language: Language,
) -> AnalysisReport {
    let (width, height) = working_dimensions;
    let pixel_count = width as u64 * height as u64;
    let overall_confidence = OverallConfidence::from_detection(&detection);

    AnalysisReport {
        metadata,
        resolution: format!("{}x{}", width, height),
        pixel_count,
        image_quality: ImageQuality::from_pixel_count(pixel_count),
        recommendations: recommendations(&detection, &severity, language),
        next_steps: next_steps(&severity, language),
        confidence_label: confidence_label(overall_confidence, language).to_string(),
        disclaimer: disclaimer(language).to_string(),
        overall_confidence,
        color,
        texture,
        detection,
        severity,
        language,
    }
}

/// Ordered recommendation lines: findings summary, then the care tier for the severity level
pub fn recommendations(
    detection: &ConditionDetection,
    severity: &SeverityAssessment,
    language: Language,
) -> Vec<String> {
    let mut out = vec![
        text(Template::AnalysisResultsHeading, language).to_string(),
        String::new(),
    ];

    if detection.findings.is_empty() {
        out.push(text(Template::NoConcernsDetected, language).to_string());
        out.push(text(Template::ContinueGeneralCare, language).to_string());
    } else {
        out.push(format!(
            "⚠️ {}: {}",
            text(Template::SeverityLevelLabel, language),
            severity.level.as_str().to_uppercase()
        ));
        out.push(format!(
            "📊 {} {}",
            detection.findings.len(),
            text(Template::ConcernsDetected, language)
        ));
        out.push(String::new());

        for (i, finding) in detection.findings.iter().enumerate() {
            out.push(format!(
                "{}. {} ({}: {})",
                i + 1,
                finding.condition.display_name(),
                text(Template::ConfidenceLabel, language),
                finding.confidence.as_str()
            ));
            if let Some(warning) = finding.warning {
                out.push(format!("   ⚠️ {}", warning_text(warning, language)));
            }
        }
        out.push(String::new());
    }

    let tier = match severity.level {
        SeverityLevel::Severe => LineSet::UrgentCare,
        SeverityLevel::Moderate => LineSet::RecommendedCare,
        SeverityLevel::Mild | SeverityLevel::Minimal => LineSet::GeneralCare,
    };
    out.extend(lines(tier, language).iter().map(|line| line.to_string()));

    out
}

/// Next-step lines for the urgency tier
pub fn next_steps(severity: &SeverityAssessment, language: Language) -> Vec<String> {
    let tier = match severity.urgency {
        Urgency::High => LineSet::NextStepsHigh,
        Urgency::Medium => LineSet::NextStepsMedium,
        Urgency::Low | Urgency::Routine => LineSet::NextStepsRoutine,
    };
    lines(tier, language).iter().map(|line| line.to_string()).collect()
}

pub fn disclaimer(language: Language) -> &'static str {
    text(Template::Disclaimer, language)
}

pub fn warning_text(warning: UrgentWarning, language: Language) -> &'static str {
    match warning {
        UrgentWarning::DermatologistReferral => text(Template::DermatologistReferral, language),
    }
}

pub fn confidence_label(confidence: OverallConfidence, language: Language) -> &'static str {
    let template = match confidence {
        OverallConfidence::NoSpecificFindings => Template::ConfidenceNoFindings,
        OverallConfidence::LowModerate => Template::ConfidenceLowModerate,
        OverallConfidence::Moderate => Template::ConfidenceModerate,
        OverallConfidence::ModerateHigh => Template::ConfidenceModerateHigh,
    };
    text(template, language)
}

pub fn trend_recommendation(trend: Trend, language: Language) -> &'static str {
    let template = match trend {
        Trend::Worsening => Template::TrendWorsening,
        Trend::Improving => Template::TrendImproving,
        Trend::Stable => Template::TrendStable,
    };
    text(template, language)
}

/// Multi-section plain-text report suitable for direct display
pub fn render_text_report(report: &AnalysisReport, trend: Option<&TrendReport>) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let mut out: Vec<String> = Vec::new();

    out.push(rule.clone());
    out.push("📊 MEDICAL IMAGE ANALYSIS REPORT".to_string());
    out.push(rule.clone());
    out.push(String::new());
    out.push(format!(
        "⏰ Analysis Time: {}",
        report.analysis_timestamp().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push(format!("📏 Resolution: {}", report.resolution));
    out.push(format!("✅ Quality: {}", report.image_quality.as_str()));
    out.push(String::new());

    let [r, g, b] = report.color.dominant_color;
    out.push("🔬 VISUAL ANALYSIS:".to_string());
    out.push(String::new());
    out.push("Color Metrics:".to_string());
    out.push(format!("  • Redness Score: {:.1}/100", report.color.redness_score));
    out.push(format!("  • Dominant Color: RGB({}, {}, {})", r, g, b));
    out.push(String::new());
    out.push("Texture Metrics:".to_string());
    out.push(format!("  • Texture Type: {}", report.texture.texture_type.as_str()));
    out.push(format!("  • Smoothness: {:.2}", report.texture.smoothness));
    out.push(format!("  • Edge Density: {:.3}", report.texture.edge_density));
    out.push(String::new());

    out.push("🩺 FINDINGS:".to_string());
    out.push(String::new());
    if report.detection.findings.is_empty() {
        out.push("  No specific conditions detected".to_string());
        out.push(String::new());
    } else {
        for (i, finding) in report.detection.findings.iter().enumerate() {
            out.push(format!("  {}. {}", i + 1, finding.condition.display_name()));
            out.push(format!("     Confidence: {}", finding.confidence.as_str()));
            if let Some(warning) = finding.warning {
                out.push(format!("     ⚠️  {}", warning_text(warning, report.language)));
            }
            out.push(String::new());
        }
    }

    let severity = &report.severity;
    out.push("📊 SEVERITY ASSESSMENT:".to_string());
    out.push(format!("  • Level: {}", severity.level.as_str().to_uppercase()));
    out.push(format!("  • Urgency: {}", severity.urgency.as_str().to_uppercase()));
    out.push(format!("  • Score: {}/{}", severity.score, severity.max_score));
    out.push(format!("  • {}", severity.description));
    out.push(format!("  • Overall confidence: {}", report.confidence_label));
    out.push(String::new());

    out.extend(report.recommendations.iter().cloned());

    out.push(String::new());
    out.push("📝 NEXT STEPS:".to_string());
    out.extend(report.next_steps.iter().map(|step| format!("  {}", step)));
    out.push(String::new());

    if let Some(trend) = trend {
        let change = trend.comparison.severity_change;
        out.push("📈 PROGRESS TREND:".to_string());
        out.push(format!("  • Trend: {}", trend.comparison.trend.as_str().to_uppercase()));
        out.push(format!("  • Severity change: {:+}", change));
        out.push(format!(
            "  • Previous analysis: {}",
            trend.comparison.previous_timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push(format!("  • {}", trend.recommendation));
        out.push(String::new());
    }

    out.push(String::new());
    out.push(report.disclaimer.clone());

    out.push(String::new());
    out.push(rule.clone());
    out.push("End of Report".to_string());
    out.push(rule);

    out.join("\n")
}
