// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::section::{ExtractionSummary, SectionRecord};
use crate::utils::error::StorageError;

/// Metadata describing one extraction run, written as JSON when the user
/// passes `--report`. The output PDF itself is the only artifact the tool
/// produces by default.
#[derive(Debug, Serialize)]
pub struct ExtractionReport<'a> {
    pub input_path: String,
    pub output_path: String,
    pub pattern: String,
    pub extracted_count: usize,
    pub sections: &'a [SectionRecord],
    pub extraction_timestamp: String,
}

impl<'a> ExtractionReport<'a> {
    pub fn new(
        input_path: &Path,
        output_path: &Path,
        pattern: &str,
        summary: &'a ExtractionSummary,
    ) -> Self {
        Self {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            pattern: pattern.to_string(),
            extracted_count: summary.extracted_count,
            sections: &summary.sections,
            extraction_timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Writes the report to `path`, creating parent directories as needed.
pub fn save_report(path: &Path, report: &ExtractionReport) -> Result<PathBuf, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;

    fs::write(path, json).map_err(StorageError::IoError)?;
    tracing::info!("Saved extraction report to {}", path.display());

    Ok(path.to_path_buf())
}
