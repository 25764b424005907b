// src/extractors/section.rs

// --- Imports ---
use std::path::Path;

use indicatif::ProgressBar;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::config::ExtractionConfig;
use crate::extractors::bounds::{resolve_section_bounds, SectionBounds};
use crate::extractors::header::find_headers;
use crate::pdf::pdfium::PdfiumEngine;
use crate::pdf::{OutputDocument, Rect, SaveOptions, SourceDocument};
use crate::utils::error::{AppError, ExtractError};

// --- Data Structures ---

/// The output pages one extracted section produced, as
/// (source page index, clip rectangle) pairs in append order.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRecord {
    pub pages: Vec<(usize, Rect)>,
}

/// Result of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    /// Number of logical sections found. A multi-page section counts once
    /// regardless of how many output pages it produced.
    pub extracted_count: usize,
    pub sections: Vec<SectionRecord>,
}

// --- Main Extractor Structure ---

/// Walks a document page by page, classifies pattern matches as headers,
/// resolves each header's section bounds, and assembles the output document.
pub struct SectionExtractor {
    config: ExtractionConfig,
    pattern: Regex,
}

impl SectionExtractor {
    /// Compiles the configured pattern (case-insensitively) and captures the
    /// configuration. Pattern errors surface here, before any document is
    /// touched.
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractError> {
        let pattern = RegexBuilder::new(&config.pattern_regex)
            .case_insensitive(true)
            .build()?;

        Ok(Self { config, pattern })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts all sections from `input_path` into a new document at
    /// `output_path`, returning the summary.
    ///
    /// Opens both documents through the PDFium backend; both handles are
    /// released on every exit path. The output file is written only after
    /// the whole document has been processed, so a failure mid-run leaves
    /// no partial artifact.
    pub fn extract(&self, input_path: &Path, output_path: &Path) -> Result<ExtractionSummary, AppError> {
        let engine = PdfiumEngine::new()?;
        let source = engine.open(input_path)?;
        let mut output = engine.create_output(&source)?;

        let summary = self.extract_sections(&source, &mut output)?;

        output
            .save(output_path, &SaveOptions::from_config(&self.config))
            .map_err(ExtractError::Pdf)?;
        tracing::info!(
            "Saved {} output page(s) to '{}'",
            output.page_count(),
            output_path.display()
        );

        Ok(summary)
    }

    /// Core extraction loop over an opened source and output document.
    pub fn extract_sections<S, O>(&self, source: &S, output: &mut O) -> Result<ExtractionSummary, ExtractError>
    where
        S: SourceDocument,
        O: OutputDocument,
    {
        let mut extracted_count = 0usize;
        let mut sections = Vec::new();

        let progress = if self.config.show_progress {
            ProgressBar::new(source.page_count() as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_message("Processing PDF pages");

        for page_index in 0..source.page_count() {
            let layout = source.layout(page_index)?;
            let headers = find_headers(layout, &self.pattern, &self.config);
            if !headers.is_empty() {
                tracing::debug!("Page {}: {} header(s) found", page_index + 1, headers.len());
            }

            for header in headers {
                let resolved = resolve_section_bounds(
                    source,
                    page_index,
                    &header,
                    &self.pattern,
                    &self.config,
                )?;

                match resolved {
                    Some(SectionBounds::Multi { pages, .. }) => {
                        for (source_page, rect) in &pages {
                            let new_page = output.append_clip(*source_page, *rect)?;
                            if self.config.preview_mode {
                                let label =
                                    format!("Ex {}-P{}", extracted_count + 1, source_page + 1);
                                output.draw_overlay(new_page, *rect, &label)?;
                            }
                        }
                        // One logical section however many pages it spanned
                        extracted_count += 1;
                        sections.push(SectionRecord { pages });
                    }
                    Some(SectionBounds::Single(rect)) => {
                        let new_page = output.append_clip(page_index, rect)?;
                        if self.config.preview_mode {
                            let label = format!("Ex {}", extracted_count + 1);
                            output.draw_overlay(new_page, rect, &label)?;
                        }
                        extracted_count += 1;
                        sections.push(SectionRecord {
                            pages: vec![(page_index, rect)],
                        });
                    }
                    None => {
                        tracing::warn!(
                            "Header on page {} produced no usable bounds, skipping",
                            page_index + 1
                        );
                    }
                }
            }

            progress.inc(1);
        }

        progress.finish_with_message(format!("Completed - Extracted {extracted_count} sections"));

        Ok(ExtractionSummary {
            extracted_count,
            sections,
        })
    }
}
