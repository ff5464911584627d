// src/pipeline.rs - Screening pipeline: validate, preprocess, extract, classify, score, report, track

use std::sync::{Mutex, PoisonError};

use log::{debug, info};
use serde::Serialize;

use crate::classification::{detect_conditions, ConditionDetection};
use crate::color_analysis::{analyze_color, ColorProfile};
use crate::errors::Result;
use crate::history::{HistoryRecord, HistoryTracker, TrendComparison};
use crate::localization::Language;
use crate::preprocessing::{preprocess_image, PreparedImage};
use crate::report::{compose_report, render_text_report, AnalysisReport, TrendReport};
use crate::severity::{assess_severity, SeverityAssessment};
use crate::texture_analysis::{analyze_texture, TextureProfile};
use crate::validation::validate_image;

/// Numeric outputs of one image, independent of language and history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    pub color: ColorProfile,
    pub texture: TextureProfile,
    pub detection: ConditionDetection,
    pub severity: SeverityAssessment,
}

/// Colour and texture run side by side on the shared enhanced buffer;
/// classification and scoring then read both profiles.
pub fn analyze_features(prepared: &PreparedImage) -> FeatureSet {
    let (color, texture) = rayon::join(
        || analyze_color(&prepared.enhanced),
        || analyze_texture(&prepared.enhanced),
    );

    let detection = detect_conditions(&color, &texture);
    let severity = assess_severity(&color, &texture);

    debug!(
        "{} finding(s), severity {}/{}",
        detection.findings.len(),
        severity.score,
        severity.max_score
    );

    FeatureSet {
        color,
        texture,
        detection,
        severity,
    }
}

/// Successful outcome handed back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    pub report: AnalysisReport,
    /// Recommendation lines joined with newlines
    pub recommendation_text: String,
    /// Multi-section report for direct display
    pub text_report: String,
    pub trend: Option<TrendReport>,
}

/// Screening pipeline for one logical session.
///
/// Analyses may run concurrently through a shared reference; only the
/// history append and trend lookup are serialised.
#[derive(Debug)]
pub struct SkinScreener {
    history: Option<Mutex<HistoryTracker>>,
}

impl SkinScreener {
    /// Screener that tracks a trend across submissions
    pub fn new() -> Self {
        Self {
            history: Some(Mutex::new(HistoryTracker::new())),
        }
    }

    /// Screener that never records history
    pub fn without_history() -> Self {
        Self { history: None }
    }

    /// Run the full pipeline on raw upload bytes.
    ///
    /// Any failure before the report stage is returned as an error and
    /// nothing is recorded in history.
    pub fn analyze(
        &self,
        data: &[u8],
        content_type: Option<&str>,
        language: Language,
    ) -> Result<ScreeningResult> {
        let metadata = validate_image(data, content_type)?;
        let prepared = preprocess_image(data)?;
        let features = analyze_features(&prepared);

        let report = compose_report(
            metadata,
            prepared.dimensions(),
            features.color,
            features.texture,
            features.detection,
            features.severity,
            language,
        );

        info!(
            "Analysed {} image {}: {} finding(s), severity {} ({})",
            report.metadata.format.as_str(),
            report.resolution,
            report.detection.findings.len(),
            report.severity.level.as_str(),
            report.severity.urgency.as_str()
        );

        Ok(self.finish(report))
    }

    /// Record the report in history, look up the trend and render text
    pub fn finish(&self, report: AnalysisReport) -> ScreeningResult {
        let trend = self
            .record(&report)
            .map(|comparison| TrendReport::new(comparison, report.language));

        if let Some(trend) = &trend {
            info!(
                "Trend {} (severity change {:+})",
                trend.comparison.trend.as_str(),
                trend.comparison.severity_change
            );
        }

        ScreeningResult {
            recommendation_text: report.recommendation_text(),
            text_report: render_text_report(&report, trend.as_ref()),
            report,
            trend,
        }
    }

    fn record(&self, report: &AnalysisReport) -> Option<TrendComparison> {
        let history = self.history.as_ref()?;
        let mut tracker = history.lock().unwrap_or_else(PoisonError::into_inner);

        tracker.record(HistoryRecord {
            timestamp: report.analysis_timestamp(),
            fingerprint: report.metadata.fingerprint.clone(),
            findings: report.detection.findings.iter().map(|f| f.condition).collect(),
            severity_score: report.severity.score,
            severity_level: report.severity.level,
        });
        tracker.trend()
    }

    /// Snapshot of the recorded history, oldest first
    pub fn history(&self) -> Vec<HistoryRecord> {
        match &self.history {
            Some(history) => history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .records()
                .to_vec(),
            None => Vec::new(),
        }
    }
}

impl Default for SkinScreener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::prepare;
    use crate::severity::{SeverityLevel, Urgency};
    use image::{Rgb, RgbImage};

    #[test]
    fn uniform_red_features_are_severe() {
        let prepared = prepare(RgbImage::from_pixel(200, 200, Rgb([255, 100, 100]))).unwrap();
        let features = analyze_features(&prepared);

        assert!(features.color.redness_score > 60.0);
        assert_eq!(features.color.inflammation.red_dominant_percentage, 100.0);
        assert_eq!(features.texture.edge_density, 0.0);
        assert_eq!(features.detection.findings.len(), 2);
        assert_eq!(features.severity.score, 6);
        assert_eq!(features.severity.level, SeverityLevel::Severe);
        assert_eq!(features.severity.urgency, Urgency::High);
    }

    #[test]
    fn uniform_gray_features_are_minimal() {
        let prepared = prepare(RgbImage::from_pixel(200, 200, Rgb([128, 128, 128]))).unwrap();
        let features = analyze_features(&prepared);

        assert_eq!(features.color.redness_score, 0.0);
        assert!(features.detection.findings.is_empty());
        assert!(!features.detection.requires_professional_evaluation);
        assert_eq!(features.severity.score, 0);
        assert_eq!(features.severity.level, SeverityLevel::Minimal);
    }

    #[test]
    fn rejected_input_leaves_history_untouched() {
        let screener = SkinScreener::new();
        assert!(screener.analyze(&[0u8; 900], None, Language::English).is_err());
        assert!(screener.history().is_empty());
    }

    #[test]
    fn history_can_be_disabled() {
        let screener = SkinScreener::without_history();
        assert!(screener.history().is_empty());
    }
}
