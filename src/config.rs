// src/config.rs - Batch screening configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, ScreeningError};
use crate::localization::Language;

/// Configuration for the screening CLI.
///
/// Pipeline thresholds and the enhancement chain are fixed and are not
/// configurable here.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// Report language tag ("en", "english", "hi", "hindi"); anything else means English
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Treat the whole batch as one session and report trends between images
    #[serde(default = "default_track_history")]
    pub track_history: bool,

    #[serde(default = "default_true")]
    pub write_text_reports: bool,

    #[serde(default = "default_true")]
    pub write_json_reports: bool,

    #[serde(default = "default_true")]
    pub write_summary_csv: bool,
}

fn default_language() -> String {
    "english".to_string()
}

fn default_parallel() -> bool {
    true
}

fn default_track_history() -> bool {
    true
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            language: default_language(),
            use_parallel: default_parallel(),
            track_history: default_track_history(),
            write_text_reports: true,
            write_json_reports: true,
            write_summary_csv: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScreeningError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|source| ScreeningError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    pub fn language(&self) -> Language {
        Language::from_tag(&self.language)
    }

    /// Validate configuration and create the output directory
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(ScreeningError::InvalidPath(input_path));
        }

        if self.output_base_dir.trim().is_empty() {
            return Err(ScreeningError::Config(
                "output_base_dir must not be empty".to_string(),
            ));
        }

        if !self.write_text_reports && !self.write_json_reports && !self.write_summary_csv {
            return Err(ScreeningError::Config(
                "at least one of write_text_reports, write_json_reports or write_summary_csv must be enabled"
                    .to_string(),
            ));
        }

        fs::create_dir_all(&self.output_base_dir).map_err(|e| {
            ScreeningError::Config(format!(
                "Failed to create output directory '{}': {}",
                self.output_base_dir, e
            ))
        })?;

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            ScreeningError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("derma_screen_config_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "./photos"
            output_base_dir = "./reports"
            "#,
        )
        .unwrap();

        assert_eq!(config.language(), Language::English);
        assert!(config.use_parallel);
        assert!(config.track_history);
        assert!(config.write_summary_csv);
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let config = Config {
            language: "tamil".to_string(),
            ..Config::default()
        };
        assert_eq!(config.language(), Language::English);

        let config = Config {
            language: "hi".to_string(),
            ..Config::default()
        };
        assert_eq!(config.language(), Language::Hindi);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = scratch_dir("round_trip");
        let path = dir.join("config.toml");

        let config = Config {
            input_path: dir.display().to_string(),
            language: "hindi".to_string(),
            use_parallel: false,
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = scratch_dir("malformed");
        let path = dir.join("config.toml");
        fs::write(&path, "input_path = [").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ScreeningError::ConfigLoad { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn validate_rejects_missing_input_and_disabled_outputs() {
        let config = Config {
            input_path: "/definitely/not/here".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ScreeningError::InvalidPath(_))));

        let dir = scratch_dir("outputs");
        let config = Config {
            input_path: dir.display().to_string(),
            output_base_dir: dir.join("out").display().to_string(),
            write_text_reports: false,
            write_json_reports: false,
            write_summary_csv: false,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ScreeningError::Config(_))));
        fs::remove_dir_all(&dir).ok();
    }
}
