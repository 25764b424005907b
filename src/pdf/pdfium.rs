// src/pdf/pdfium.rs
//
// Concrete backend over `pdfium-render`. PDFium is bound at runtime (a local
// ./libpdfium is preferred, then the system library). The adapter does three
// jobs: build owned `PageLayout` snapshots from the per-character text
// stream, import clipped page regions into the output document, and draw the
// preview overlay.
//
// PDFium reports bottom-up y coordinates; everything is converted to the
// top-down model at this boundary and converted back when writing.

use std::path::Path;

use pdfium_render::prelude::*;

use crate::utils::error::PdfError;

use super::backend::{OutputDocument, SaveOptions, SourceDocument};
use super::geometry::Rect;
use super::layout::{PageLayout, TextBlock, TextLine, TextSpan};

// Horizontal gap wider than this fraction of the average char width becomes a
// synthesized space.
const SPACE_GAP_FRACTION: f32 = 0.3;

// Vertical gap wider than this fraction of the previous line's height starts
// a new block.
const BLOCK_GAP_FRACTION: f32 = 1.25;

// Chars whose vertical centers differ by less than this fraction of the char
// height share a line.
const LINE_MERGE_FRACTION: f32 = 0.5;

const OVERLAY_STROKE_WIDTH: f32 = 2.0;
const OVERLAY_LABEL_SIZE: f32 = 12.0;
const OVERLAY_LABEL_OFFSET: f32 = 5.0;

/// Entry point for the PDFium backend. Owns the library binding; documents
/// borrow from it.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Binds the PDFium library, preferring a copy next to the executable.
    pub fn new() -> Result<Self, PdfError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::Bind(e.to_string()))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Opens a source document and snapshots every page's text layout.
    pub fn open(&self, path: &Path) -> Result<PdfiumSource<'_>, PdfError> {
        let doc = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PdfError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let layouts = build_layouts(&doc)?;
        tracing::debug!(
            "Opened '{}': {} pages",
            path.display(),
            layouts.len()
        );

        Ok(PdfiumSource { doc, layouts })
    }

    /// Creates an empty output document that copies pages from `source`.
    pub fn create_output<'p, 's>(
        &'p self,
        source: &'s PdfiumSource<'p>,
    ) -> Result<PdfiumOutput<'p, 's>, PdfError> {
        let doc = self
            .pdfium
            .create_new_pdf()
            .map_err(|e| PdfError::Open {
                path: "<new document>".to_string(),
                reason: e.to_string(),
            })?;

        Ok(PdfiumOutput {
            doc,
            source,
            source_heights: Vec::new(),
        })
    }
}

/// An opened source document plus its page layout snapshots.
pub struct PdfiumSource<'p> {
    doc: PdfDocument<'p>,
    layouts: Vec<PageLayout>,
}

impl SourceDocument for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.layouts.len()
    }

    fn layout(&self, page_index: usize) -> Result<&PageLayout, PdfError> {
        self.layouts
            .get(page_index)
            .ok_or(PdfError::PageOutOfRange(page_index))
    }
}

/// The output document being assembled. Holds the source so page imports can
/// copy from it.
pub struct PdfiumOutput<'p, 's> {
    doc: PdfDocument<'p>,
    source: &'s PdfiumSource<'p>,
    // Original height of each appended page's source page, needed to flip
    // overlay coordinates after the crop box has shrunk.
    source_heights: Vec<f32>,
}

impl OutputDocument for PdfiumOutput<'_, '_> {
    fn append_clip(&mut self, source_page: usize, clip: Rect) -> Result<usize, PdfError> {
        let height = self.source.layout(source_page)?.height;
        let src_index = page_index_u16(source_page)?;
        let dest_index = self.doc.pages().len();

        self.doc
            .pages_mut()
            .copy_page_from_document(&self.source.doc, src_index, dest_index)
            .map_err(|e| PdfError::PageCopy(e.to_string()))?;

        // Shrink the copied page to the clip region. Page object coordinates
        // are untouched; only the visible box changes.
        let bounds = to_pdf_rect(&clip, height);
        let mut page = self
            .doc
            .pages()
            .get(dest_index)
            .map_err(|e| PdfError::PageCopy(e.to_string()))?;
        page.boundaries_mut()
            .set_media(bounds)
            .map_err(|e| PdfError::PageCopy(e.to_string()))?;
        page.boundaries_mut()
            .set_crop(bounds)
            .map_err(|e| PdfError::PageCopy(e.to_string()))?;

        self.source_heights.push(height);
        Ok(dest_index as usize)
    }

    fn draw_overlay(
        &mut self,
        page_index: usize,
        rect: Rect,
        label: &str,
    ) -> Result<(), PdfError> {
        let height = *self
            .source_heights
            .get(page_index)
            .ok_or(PdfError::PageOutOfRange(page_index))?;
        let red = PdfColor::new(255, 0, 0, 255);

        // Reserve the label font before borrowing the page.
        let font = self.doc.fonts_mut().helvetica();

        let mut page = self
            .doc
            .pages()
            .get(page_index_u16(page_index)?)
            .map_err(|e| PdfError::Overlay(e.to_string()))?;

        page.objects_mut()
            .create_path_object_rect(
                to_pdf_rect(&rect, height),
                Some(red),
                Some(PdfPoints::new(OVERLAY_STROKE_WIDTH)),
                None,
            )
            .map_err(|e| PdfError::Overlay(e.to_string()))?;

        if !label.is_empty() {
            let mut text = page
                .objects_mut()
                .create_text_object(
                    PdfPoints::new(rect.x0),
                    PdfPoints::new(height - rect.y0 + OVERLAY_LABEL_OFFSET),
                    label,
                    font,
                    PdfPoints::new(OVERLAY_LABEL_SIZE),
                )
                .map_err(|e| PdfError::Overlay(e.to_string()))?;
            text.set_fill_color(red)
                .map_err(|e| PdfError::Overlay(e.to_string()))?;
        }

        Ok(())
    }

    fn page_count(&self) -> usize {
        self.doc.pages().len() as usize
    }

    fn save(&mut self, path: &Path, options: &SaveOptions) -> Result<(), PdfError> {
        // PDFium always writes a compacted object table, so the garbage
        // collection level has no further effect here; deflate is its
        // default stream encoding.
        tracing::debug!(
            "Saving output (garbage_collect={}, deflate={})",
            options.garbage_collect,
            options.deflate
        );
        self.doc
            .save_to_file(path)
            .map_err(|e| PdfError::Save(e.to_string()))
    }
}

fn page_index_u16(index: usize) -> Result<u16, PdfError> {
    u16::try_from(index).map_err(|_| PdfError::PageOutOfRange(index))
}

/// Convert a top-down rect to PDFium's bottom-up `PdfRect` on a page of the
/// given height.
fn to_pdf_rect(rect: &Rect, page_height: f32) -> PdfRect {
    PdfRect::new_from_values(
        page_height - rect.y1, // bottom
        rect.x0,               // left
        page_height - rect.y0, // top
        rect.x1,               // right
    )
}

/// One character pulled out of the PDFium text stream, already in top-down
/// coordinates.
#[derive(Debug, Clone)]
struct RawChar {
    ch: char,
    rect: Rect,
    font_name: String,
    font_size: f32,
    bold: bool,
}

impl RawChar {
    fn center_y(&self) -> f32 {
        (self.rect.y0 + self.rect.y1) / 2.0
    }
}

#[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
fn build_layouts(doc: &PdfDocument) -> Result<Vec<PageLayout>, PdfError> {
    let mut layouts = Vec::new();

    for (index, page) in doc.pages().iter().enumerate() {
        let width = page.width().value;
        let height = page.height().value;
        let text = page.text().map_err(|e| PdfError::TextExtraction {
            page: index,
            reason: e.to_string(),
        })?;

        let mut chars = Vec::new();
        for ch in text.chars().iter() {
            let (Some(unicode), Ok(bounds)) = (ch.unicode_char(), ch.loose_bounds()) else {
                continue;
            };
            let rect = Rect::new(
                bounds.left.value,
                height - bounds.top.value,
                bounds.right.value,
                height - bounds.bottom.value,
            );
            if rect.is_empty() {
                continue;
            }
            chars.push(RawChar {
                ch: unicode,
                rect,
                font_name: ch.font_name(),
                font_size: ch.scaled_font_size().value,
                bold: ch.font_weight().map(is_bold_weight).unwrap_or(false),
            });
        }

        layouts.push(assemble_page(index, width, height, chars));
    }

    Ok(layouts)
}

fn is_bold_weight(weight: PdfFontWeight) -> bool {
    match weight {
        PdfFontWeight::Weight700Bold | PdfFontWeight::Weight800 | PdfFontWeight::Weight900 => true,
        PdfFontWeight::Custom(value) => value >= 700,
        _ => false,
    }
}

/// Group raw characters into blocks -> lines -> spans.
///
/// Characters are sorted top-to-bottom then left-to-right, merged into lines
/// by vertical-center proximity, and split into spans wherever the font
/// changes. Horizontal gaps become synthesized spaces so the assembled text
/// reads like the page does.
fn assemble_page(index: usize, width: f32, height: f32, mut chars: Vec<RawChar>) -> PageLayout {
    if chars.is_empty() {
        return PageLayout {
            index,
            width,
            height,
            blocks: Vec::new(),
        };
    }

    chars.sort_by(|a, b| {
        a.center_y()
            .partial_cmp(&b.center_y())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.rect
                    .x0
                    .partial_cmp(&b.rect.x0)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    // Lines: vertical-center proximity against the running line.
    let mut line_groups: Vec<Vec<RawChar>> = Vec::new();
    for ch in chars {
        match line_groups.last_mut() {
            Some(line) => {
                let last = line.last().expect("line groups are never empty");
                let tolerance = last.rect.height().max(ch.rect.height()) * LINE_MERGE_FRACTION;
                if (ch.center_y() - last.center_y()).abs() <= tolerance {
                    line.push(ch);
                } else {
                    line_groups.push(vec![ch]);
                }
            }
            None => line_groups.push(vec![ch]),
        }
    }

    let mut lines: Vec<TextLine> = line_groups
        .into_iter()
        .map(|mut group| {
            group.sort_by(|a, b| {
                a.rect
                    .x0
                    .partial_cmp(&b.rect.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            assemble_line(group)
        })
        .collect();

    // Blocks: consecutive lines separated by at most a paragraph gap.
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = vec![lines.remove(0)];
    for line in lines {
        let prev = current.last().expect("current block is never empty");
        let gap = line.bbox.y0 - prev.bbox.y1;
        if gap > prev.bbox.height() * BLOCK_GAP_FRACTION {
            blocks.push(finish_block(std::mem::take(&mut current)));
        }
        current.push(line);
    }
    blocks.push(finish_block(current));

    PageLayout {
        index,
        width,
        height,
        blocks,
    }
}

fn finish_block(lines: Vec<TextLine>) -> TextBlock {
    let bbox = lines
        .iter()
        .map(|l| l.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
    TextBlock { bbox, lines }
}

/// Build one line from x-sorted characters: split spans on font changes,
/// synthesize spaces at wide gaps.
fn assemble_line(chars: Vec<RawChar>) -> TextLine {
    let avg_width =
        chars.iter().map(|c| c.rect.width()).sum::<f32>() / chars.len() as f32;
    let space_threshold = avg_width * SPACE_GAP_FRACTION;

    let mut spans: Vec<TextSpan> = Vec::new();
    let mut current: Option<TextSpan> = None;
    let mut prev_rect: Option<Rect> = None;

    for ch in chars {
        let needs_space = prev_rect
            .map(|prev| ch.rect.x0 - prev.x1 > space_threshold)
            .unwrap_or(false);

        let same_style = current.as_ref().map(|span| {
            span.font_name == ch.font_name
                && (span.font_size - ch.font_size).abs() < 0.1
                && span.bold == ch.bold
        });

        match (current.as_mut(), same_style) {
            (Some(span), Some(true)) => {
                if needs_space {
                    // The space's box is the gap itself.
                    let gap = Rect::new(
                        span.bbox.x1,
                        span.bbox.y0,
                        ch.rect.x0,
                        span.bbox.y1,
                    );
                    span.text.push(' ');
                    span.char_boxes.push(gap);
                }
                span.text.push(ch.ch);
                span.bbox = span.bbox.union(&ch.rect);
                span.char_boxes.push(ch.rect);
            }
            _ => {
                if let Some(span) = current.take() {
                    spans.push(span);
                }
                current = Some(TextSpan {
                    text: ch.ch.to_string(),
                    bbox: ch.rect,
                    font_name: ch.font_name.clone(),
                    font_size: ch.font_size,
                    bold: ch.bold,
                    italic: false,
                    char_boxes: vec![ch.rect],
                });
            }
        }

        prev_rect = Some(ch.rect);
    }
    if let Some(span) = current.take() {
        spans.push(span);
    }

    let bbox = spans
        .iter()
        .map(|s| s.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));

    TextLine { bbox, spans }
}
