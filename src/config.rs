// src/config.rs
#![allow(dead_code)]
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Parameters controlling section extraction.
///
/// Built once at startup and shared read-only by every component. Each field
/// has a serde default so a JSON config file only needs to name the values it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Regex identifying section headers. Compiled case-insensitively.
    /// `\s*` between the words tolerates line breaks inside wrapped headers.
    pub pattern_regex: String,

    /// Additional margin around header bounding boxes, in points.
    pub header_margin: f32,

    /// Page margin for section extraction, in points.
    pub page_margin: f32,

    /// Garbage collection level applied when saving the output document.
    pub garbage_collect: u32,

    /// Whether to deflate-compress output streams.
    pub deflate_output: bool,

    /// Draw a labeled highlight rectangle over each extracted region.
    pub preview_mode: bool,

    /// Show a per-page progress bar while scanning.
    pub show_progress: bool,

    /// Minimum font size (points) for a match to qualify as a header.
    pub min_font_size: f32,

    /// Upper bound on pages scanned when looking for a section's end.
    pub max_pages_to_search: usize,

    /// Fraction of page height (0.0-1.0) counted as "top of page" by the
    /// header position fallback.
    pub header_detection_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pattern_regex: r"Sample\s*Exercise\s+\d+\.\d+".to_string(),
            header_margin: 10.0,
            page_margin: 30.0,
            garbage_collect: 3,
            deflate_output: true,
            preview_mode: false,
            show_progress: true,
            min_font_size: 10.0,
            max_pages_to_search: 10,
            header_detection_threshold: 0.3,
        }
    }
}

impl ExtractionConfig {
    /// Loads a configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!(
                "invalid config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = ExtractionConfig::default();
        assert_eq!(config.pattern_regex, r"Sample\s*Exercise\s+\d+\.\d+");
        assert_eq!(config.min_font_size, 10.0);
        assert_eq!(config.max_pages_to_search, 10);
        assert_eq!(config.header_detection_threshold, 0.3);
        assert!(config.deflate_output);
        assert!(!config.preview_mode);
    }

    #[test]
    fn json_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).expect("create config");
        write!(file, r#"{{"min_font_size": 8.5, "max_pages_to_search": 3}}"#).expect("write");

        let config = ExtractionConfig::from_json_file(&path).expect("load config");
        assert_eq!(config.min_font_size, 8.5);
        assert_eq!(config.max_pages_to_search, 3);
        // Untouched fields keep their defaults
        assert_eq!(config.pattern_regex, ExtractionConfig::default().pattern_regex);
        assert_eq!(config.garbage_collect, 3);
    }

    #[test]
    fn malformed_config_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = ExtractionConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
