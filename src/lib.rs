// src/lib.rs - Library interface for DermaScreen

pub mod classification;
pub mod color_analysis;
pub mod config;
pub mod errors;
pub mod history;
pub mod image_io;
pub mod image_utils;
pub mod localization;
pub mod output;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod severity;
pub mod texture_analysis;
pub mod validation;

// Re-export commonly used types and functions
pub use config::Config;
pub use errors::{PipelineStage, Result, ScreeningError};
pub use localization::{capture_instructions, Language};
pub use pipeline::{analyze_features, FeatureSet, ScreeningResult, SkinScreener};
pub use report::{render_text_report, AnalysisReport, TrendReport};

pub use validation::{validate_image, ImageMetadata, SupportedFormat};
pub use preprocessing::{preprocess_image, prepare, ImageQuality, PreparedImage};
pub use color_analysis::{analyze_color, ColorProfile, InflammationEstimate, InflammationIndicators};
pub use texture_analysis::{analyze_texture, TextureProfile, TextureType};
pub use classification::{
    detect_conditions,
    ConditionDetection,
    ConditionFinding,
    ConditionKind,
    Confidence,
    OverallConfidence,
    UrgentWarning,
};
pub use severity::{assess_severity, SeverityAssessment, SeverityLevel, Urgency};
pub use history::{HistoryRecord, HistoryTracker, Trend, TrendComparison};
