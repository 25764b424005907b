// src/pdf/layout.rs
//
// Owned, backend-independent snapshot of one page's text layout. The backend
// adapter builds this once per page; everything above it (classification,
// bounds calculation) works on this model only.

use once_cell::sync::Lazy;
use regex::Regex;

use super::geometry::Rect;

// Non-whitespace runs, used to derive word boxes from span text.
static WORD_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("word split regex"));

/// A run of text sharing one font within one line.
///
/// `char_boxes` holds one rectangle per `char` of `text`, in order. The
/// span's own bbox is the union of its char boxes.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Rect,
    pub font_name: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub char_boxes: Vec<Rect>,
}

/// A horizontal line of spans sharing (approximately) one baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub bbox: Rect,
    pub spans: Vec<TextSpan>,
}

/// A vertical group of consecutive lines.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub bbox: Rect,
    pub lines: Vec<TextLine>,
}

/// A whitespace-delimited word with its bounding box.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub bbox: Rect,
}

/// Text layout of a single page: geometry plus blocks -> lines -> spans.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    /// Iterate spans in block/line/span enumeration order. This order is the
    /// page's layout order, which is not guaranteed to match reading order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
    }

    /// The page text with lines and blocks separated by newlines, as fed to
    /// pattern search.
    pub fn text(&self) -> String {
        self.indexed_text().0
    }

    /// Find every match of `pattern` on the page and return its bounding box.
    ///
    /// Match offsets in the assembled page text are mapped back to the
    /// underlying character rectangles, so a header wrapped across two lines
    /// still yields a single box covering both fragments. Separator newlines
    /// carry no geometry and are skipped.
    pub fn search(&self, pattern: &Regex) -> Vec<Rect> {
        let (text, char_positions) = self.indexed_text();
        let mut results = Vec::new();

        for m in pattern.find_iter(&text) {
            let mut bbox: Option<Rect> = None;
            for pos in &char_positions {
                if pos.byte_offset >= m.start() && pos.byte_offset < m.end() {
                    bbox = Some(match bbox {
                        Some(acc) => acc.union(&pos.rect),
                        None => pos.rect,
                    });
                }
            }
            if let Some(rect) = bbox {
                results.push(rect);
            }
        }

        results
    }

    /// Word-level bounding boxes, derived by splitting span text on
    /// whitespace and unioning the corresponding char boxes.
    pub fn words(&self) -> Vec<Word> {
        let mut words = Vec::new();

        for span in self.spans() {
            // Map byte offsets (regex) to char indices (char_boxes).
            let char_index_by_byte: Vec<(usize, usize)> = span
                .text
                .char_indices()
                .enumerate()
                .map(|(char_idx, (byte_idx, _))| (byte_idx, char_idx))
                .collect();

            for m in WORD_SPLIT_RE.find_iter(&span.text) {
                let mut bbox: Option<Rect> = None;
                for &(byte_idx, char_idx) in &char_index_by_byte {
                    if byte_idx >= m.start() && byte_idx < m.end() {
                        if let Some(rect) = span.char_boxes.get(char_idx) {
                            bbox = Some(match bbox {
                                Some(acc) => acc.union(rect),
                                None => *rect,
                            });
                        }
                    }
                }
                if let Some(bbox) = bbox {
                    words.push(Word {
                        text: m.as_str().to_string(),
                        bbox,
                    });
                }
            }
        }

        words
    }

    /// Assemble the page text together with the source rectangle of every
    /// character. Lines and blocks are joined with '\n', which has no
    /// geometry of its own.
    fn indexed_text(&self) -> (String, Vec<CharPosition>) {
        let mut text = String::new();
        let mut positions = Vec::new();

        for (block_idx, block) in self.blocks.iter().enumerate() {
            if block_idx > 0 {
                text.push('\n');
            }
            for (line_idx, line) in block.lines.iter().enumerate() {
                if line_idx > 0 {
                    text.push('\n');
                }
                for span in &line.spans {
                    for (ch, rect) in span.text.chars().zip(span.char_boxes.iter()) {
                        positions.push(CharPosition {
                            byte_offset: text.len(),
                            rect: *rect,
                        });
                        text.push(ch);
                    }
                }
            }
        }

        (text, positions)
    }
}

/// Byte offset of one character in the assembled page text, with its
/// rectangle on the page.
struct CharPosition {
    byte_offset: usize,
    rect: Rect,
}
