// src/pdf/fixtures.rs
//
// In-memory fake backend and page construction helpers shared by the unit
// tests. Spans get evenly spaced char boxes, which is enough to exercise
// search, word probing, and classification.

use std::path::{Path, PathBuf};

use crate::utils::error::PdfError;

use super::backend::{OutputDocument, SaveOptions, SourceDocument};
use super::geometry::Rect;
use super::layout::{PageLayout, TextBlock, TextLine, TextSpan};

/// A body-text span: 9pt regular Helvetica, below the default header
/// font-size threshold.
pub fn span(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> TextSpan {
    styled_span(text, x0, y0, x1, y1, "Helvetica", 9.0, false)
}

/// A span with explicit font name, size, and boldness.
pub fn styled_span(
    text: &str,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    font_name: &str,
    font_size: f32,
    bold: bool,
) -> TextSpan {
    let bbox = Rect::new(x0, y0, x1, y1);
    let count = text.chars().count().max(1);
    let step = bbox.width() / count as f32;
    let char_boxes = (0..text.chars().count())
        .map(|i| Rect::new(x0 + i as f32 * step, y0, x0 + (i + 1) as f32 * step, y1))
        .collect();

    TextSpan {
        text: text.to_string(),
        bbox,
        font_name: font_name.to_string(),
        font_size,
        bold,
        italic: false,
        char_boxes,
    }
}

/// Builds a [`PageLayout`] line by line. `block()` starts a new block; lines
/// before the first `block()` call land in an implicit first block.
pub struct PageBuilder {
    width: f32,
    height: f32,
    blocks: Vec<Vec<TextLine>>,
}

impl PageBuilder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            blocks: vec![Vec::new()],
        }
    }

    pub fn line(mut self, spans: Vec<TextSpan>) -> Self {
        let bbox = spans
            .iter()
            .map(|s| s.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        self.blocks
            .last_mut()
            .expect("builder always has a block")
            .push(TextLine { bbox, spans });
        self
    }

    pub fn block(mut self) -> Self {
        self.blocks.push(Vec::new());
        self
    }

    pub fn build(self, index: usize) -> PageLayout {
        let blocks = self
            .blocks
            .into_iter()
            .filter(|lines| !lines.is_empty())
            .map(|lines| {
                let bbox = lines
                    .iter()
                    .map(|l| l.bbox)
                    .reduce(|a, b| a.union(&b))
                    .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
                TextBlock { bbox, lines }
            })
            .collect();

        PageLayout {
            index,
            width: self.width,
            height: self.height,
            blocks,
        }
    }
}

/// Fake source: a list of prebuilt page layouts.
pub struct FakeDocument {
    pub layouts: Vec<PageLayout>,
}

impl FakeDocument {
    pub fn new(layouts: Vec<PageLayout>) -> Self {
        Self { layouts }
    }
}

impl SourceDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.layouts.len()
    }

    fn layout(&self, page_index: usize) -> Result<&PageLayout, PdfError> {
        self.layouts
            .get(page_index)
            .ok_or(PdfError::PageOutOfRange(page_index))
    }
}

/// One recorded `append_clip` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRecord {
    pub source_page: usize,
    pub clip: Rect,
}

/// One recorded `draw_overlay` call.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRecord {
    pub page_index: usize,
    pub rect: Rect,
    pub label: String,
}

/// Fake output: records every mutation for assertions.
#[derive(Default)]
pub struct FakeOutput {
    pub clips: Vec<ClipRecord>,
    pub overlays: Vec<OverlayRecord>,
    pub saved_to: Option<PathBuf>,
    pub save_options: Option<SaveOptions>,
}

impl OutputDocument for FakeOutput {
    fn append_clip(&mut self, source_page: usize, clip: Rect) -> Result<usize, PdfError> {
        self.clips.push(ClipRecord { source_page, clip });
        Ok(self.clips.len() - 1)
    }

    fn draw_overlay(
        &mut self,
        page_index: usize,
        rect: Rect,
        label: &str,
    ) -> Result<(), PdfError> {
        self.overlays.push(OverlayRecord {
            page_index,
            rect,
            label: label.to_string(),
        });
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.clips.len()
    }

    fn save(&mut self, path: &Path, options: &SaveOptions) -> Result<(), PdfError> {
        self.saved_to = Some(path.to_path_buf());
        self.save_options = Some(*options);
        Ok(())
    }
}
