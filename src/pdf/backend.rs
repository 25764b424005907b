// src/pdf/backend.rs
//
// The seam between the extraction logic and the PDF engine. The orchestrator
// and the bounds calculator only see these traits; `pdf::pdfium` provides the
// concrete adapter, and tests substitute an in-memory fake.

use std::path::Path;

use crate::config::ExtractionConfig;
use crate::utils::error::PdfError;

use super::geometry::Rect;
use super::layout::PageLayout;

/// Read side: an opened source document.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// The text layout snapshot of one page.
    fn layout(&self, page_index: usize) -> Result<&PageLayout, PdfError>;
}

/// Write side: the output document being assembled.
///
/// Pages are only ever appended; the document is saved exactly once.
pub trait OutputDocument {
    /// Copy the clipped region of a source page onto a new output page,
    /// returning the new page's index.
    fn append_clip(&mut self, source_page: usize, clip: Rect) -> Result<usize, PdfError>;

    /// Draw a highlight rectangle plus a text label on an output page
    /// (preview mode).
    fn draw_overlay(&mut self, page_index: usize, rect: Rect, label: &str)
        -> Result<(), PdfError>;

    fn page_count(&self) -> usize;

    /// Persist the document. Called once, after all pages are appended.
    fn save(&mut self, path: &Path, options: &SaveOptions) -> Result<(), PdfError>;
}

/// Compression settings applied when the output document is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Garbage collection pass count for unreferenced objects.
    pub garbage_collect: u32,
    /// Deflate-compress content streams.
    pub deflate: bool,
}

impl SaveOptions {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            garbage_collect: config.garbage_collect,
            deflate: config.deflate_output,
        }
    }
}
