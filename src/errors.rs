use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validation,
    Preprocessing,
    Output,
}

/// Custom error types for the screening pipeline and its CLI
#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("Image too large: {size} bytes (maximum {max} bytes)")]
    InputTooLarge { size: usize, max: usize },

    #[error("Image too small: {size} bytes (minimum {min} bytes)")]
    InputTooSmall { size: usize, min: usize },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image resolution too low: {width}x{height} (minimum {min}x{min})")]
    ResolutionTooLow { width: u32, height: u32, min: u32 },

    #[error("Failed to decode image during {stage:?}: {message}")]
    DecodeFailure {
        stage: PipelineStage,
        message: String,
    },

    #[error("Processing failed during {stage:?}: {message}")]
    ProcessingFailure {
        stage: PipelineStage,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

impl ScreeningError {
    pub fn decode(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            stage,
            message: message.into(),
        }
    }

    pub fn processing(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::ProcessingFailure {
            stage,
            message: message.into(),
        }
    }

    /// Stage the failure belongs to
    pub fn stage(&self) -> PipelineStage {
        match self {
            ScreeningError::InputTooLarge { .. }
            | ScreeningError::InputTooSmall { .. }
            | ScreeningError::UnsupportedFormat(_)
            | ScreeningError::ResolutionTooLow { .. } => PipelineStage::Validation,
            ScreeningError::DecodeFailure { stage, .. }
            | ScreeningError::ProcessingFailure { stage, .. } => *stage,
            _ => PipelineStage::Output,
        }
    }

    /// Whether this failure was caused by the submitted image rather than the host
    pub fn is_input_rejection(&self) -> bool {
        matches!(self.stage(), PipelineStage::Validation)
            || matches!(self, ScreeningError::DecodeFailure { .. })
    }

    /// Short message suitable for showing to the person who sent the image
    pub fn user_message(&self) -> String {
        match self {
            ScreeningError::InputTooLarge { max, .. } => format!(
                "Image too large. Please send an image smaller than {}MB.",
                max / (1024 * 1024)
            ),
            ScreeningError::InputTooSmall { .. } => {
                "Image too small. Please send a clear image.".to_string()
            }
            ScreeningError::UnsupportedFormat(_) => {
                "Unsupported format. Please send: jpg, jpeg, png, webp".to_string()
            }
            ScreeningError::ResolutionTooLow { .. } => {
                "Image resolution too low. Please send a clearer image.".to_string()
            }
            ScreeningError::DecodeFailure { .. } => {
                "Invalid image file. Please send the photo again.".to_string()
            }
            ScreeningError::ProcessingFailure { .. } => {
                "Error processing image. Please try again with a different photo.".to_string()
            }
            _ => "Image analysis is unavailable right now.".to_string(),
        }
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, ScreeningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_report_validation_stage() {
        let err = ScreeningError::InputTooSmall { size: 900, min: 1024 };
        assert_eq!(err.stage(), PipelineStage::Validation);
        assert!(err.is_input_rejection());

        let err = ScreeningError::ResolutionTooLow { width: 90, height: 90, min: 100 };
        assert_eq!(err.stage(), PipelineStage::Validation);
    }

    #[test]
    fn processing_failure_keeps_its_stage() {
        let err = ScreeningError::processing(PipelineStage::Preprocessing, "empty buffer");
        assert_eq!(err.stage(), PipelineStage::Preprocessing);
        assert!(!err.is_input_rejection());
        assert!(err.to_string().contains("empty buffer"));
    }

    #[test]
    fn decode_failure_reports_the_stage_that_raised_it() {
        let err = ScreeningError::decode(PipelineStage::Validation, "truncated header");
        assert_eq!(err.stage(), PipelineStage::Validation);
        assert!(err.is_input_rejection());
        assert!(err.to_string().contains("Validation"));

        let err = ScreeningError::decode(PipelineStage::Preprocessing, "bad huffman table");
        assert_eq!(err.stage(), PipelineStage::Preprocessing);
        assert!(err.is_input_rejection());
    }

    #[test]
    fn user_message_mentions_size_limit() {
        let err = ScreeningError::InputTooLarge { size: 11 * 1024 * 1024, max: 10 * 1024 * 1024 };
        assert!(err.user_message().contains("10MB"));
    }
}
