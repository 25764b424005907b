// src/extractors/bounds.rs
//
// Section bounds resolution: given a confirmed header, work out the
// rectangle(s) holding that section's content. The multi-page calculator is
// authoritative; the single-page calculator survives as the fallback for the
// degenerate case where the multi-page scan collects nothing (a zero page
// window).

use regex::Regex;

use crate::config::ExtractionConfig;
use crate::pdf::{Rect, SourceDocument};
use crate::utils::error::PdfError;

// Padding below the lowest word when a section runs to the end of the
// document content rather than to another header.
const SECTION_TAIL_MARGIN: f32 = 20.0;

/// Where one section's content lives.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBounds {
    /// The whole section sits on the header's page.
    Single(Rect),
    /// The section continues across consecutive pages. `pages` is ordered
    /// and contiguous; `overall` spans the header's top on the first page to
    /// the bottom of the last collected rectangle.
    Multi {
        overall: Rect,
        pages: Vec<(usize, Rect)>,
    },
}

/// Resolve the authoritative bounds for the section starting at `header`.
///
/// Multi-page detection runs first and wins whenever it collects at least
/// one page; a one-page result from it is equivalent to a single-page
/// section. Only an empty multi-page result falls through to the simplified
/// single-page calculator.
pub fn resolve_section_bounds<S: SourceDocument>(
    source: &S,
    page_index: usize,
    header: &Rect,
    pattern: &Regex,
    config: &ExtractionConfig,
) -> Result<Option<SectionBounds>, PdfError> {
    if let Some((overall, pages)) =
        multi_page_bounds(source, page_index, header, pattern, config.max_pages_to_search)?
    {
        return Ok(Some(SectionBounds::Multi { overall, pages }));
    }

    Ok(single_page_bounds(source, page_index, header, pattern)?.map(SectionBounds::Single))
}

/// Page-by-page scan from the header's page, bounded by `max_pages`.
///
/// The first page starts at the header's top edge, every later page at the
/// top of the page. A page containing a qualifying pattern match (on the
/// start page, only matches strictly below the header qualify) closes the
/// section at that match's top edge; otherwise the whole rest of the page is
/// collected and the scan continues. Exhausting the window leaves the
/// section open-ended, which is an accepted outcome.
pub fn multi_page_bounds<S: SourceDocument>(
    source: &S,
    start_index: usize,
    header: &Rect,
    pattern: &Regex,
    max_pages: usize,
) -> Result<Option<(Rect, Vec<(usize, Rect)>)>, PdfError> {
    let end = source.page_count().min(start_index.saturating_add(max_pages));
    let mut pages: Vec<(usize, Rect)> = Vec::new();

    for current in start_index..end {
        let layout = source.layout(current)?;
        let top = if current == start_index { header.y0 } else { 0.0 };

        let next_header = layout
            .search(pattern)
            .into_iter()
            .filter(|m| current != start_index || m.y0 > header.y1)
            .min_by(|a, b| a.y0.total_cmp(&b.y0));

        match next_header {
            Some(next) => {
                // Section ends where the next header starts.
                pages.push((current, Rect::new(0.0, top, layout.width, next.y0)));
                break;
            }
            None => {
                pages.push((current, Rect::new(0.0, top, layout.width, layout.height)));
            }
        }
    }

    let (last_index, last_rect) = match pages.last() {
        Some(last) => *last,
        None => return Ok(None),
    };

    let start_layout = source.layout(start_index)?;
    let overall = Rect::new(0.0, header.y0, start_layout.width, last_rect.y1);
    tracing::trace!(
        "Section at page {} spans {} page(s), ending on page {}",
        start_index,
        pages.len(),
        last_index
    );

    Ok(Some((overall, pages)))
}

/// Simplified single-page calculation, kept as the fallback path.
///
/// When the section's terminating header sits on a later page, the returned
/// rectangle's bottom is taken from that header's position without
/// re-checking the current page, so it effectively runs past the page; the
/// multi-page calculator handles that case properly and is preferred.
pub fn single_page_bounds<S: SourceDocument>(
    source: &S,
    page_index: usize,
    header: &Rect,
    pattern: &Regex,
) -> Result<Option<Rect>, PdfError> {
    let layout = source.layout(page_index)?;
    let top = header.y0;
    let mut right = layout.width;
    let mut bottom;

    let same_page_next = layout
        .search(pattern)
        .into_iter()
        .filter(|m| m.y0 > header.y1)
        .min_by(|a, b| a.y0.total_cmp(&b.y0));

    if let Some(next) = same_page_next {
        bottom = next.y0;
        right = next.x1;
    } else {
        let mut continuation = None;
        for next_index in page_index + 1..source.page_count() {
            let next_match = source
                .layout(next_index)?
                .search(pattern)
                .into_iter()
                .min_by(|a, b| a.y0.total_cmp(&b.y0));
            if let Some(m) = next_match {
                continuation = Some(m);
                break;
            }
        }

        match continuation {
            Some(next) => {
                bottom = next.y0;
            }
            None => {
                // No further headers anywhere: close at the lowest word below
                // the header, padded, clamped to the page.
                bottom = layout.height;
                let mut max_bottom = header.y1;
                for word in layout.words() {
                    if word.bbox.y0 > header.y1 {
                        max_bottom = max_bottom.max(word.bbox.y1);
                    }
                }
                if max_bottom > header.y1 {
                    bottom = (max_bottom + SECTION_TAIL_MARGIN).min(layout.height);
                }
            }
        }
    }

    let section = Rect::new(0.0, top, right, bottom);
    if section.is_empty() {
        return Ok(None);
    }
    Ok(Some(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{span, styled_span, FakeDocument, PageBuilder};
    use crate::pdf::layout::TextSpan;

    const W: f32 = 612.0;
    const H: f32 = 792.0;

    fn pattern() -> Regex {
        regex::RegexBuilder::new(r"Sample\s*Exercise\s+\d+\.\d+")
            .case_insensitive(true)
            .build()
            .expect("pattern")
    }

    fn header_span(n: &str, y0: f32) -> TextSpan {
        styled_span(
            &format!("Sample Exercise {n}"),
            72.0,
            y0,
            280.0,
            y0 + 12.0,
            "Helvetica-Bold",
            12.0,
            true,
        )
    }

    #[test]
    fn single_page_ends_at_next_header_on_same_page() {
        let page = PageBuilder::new(W, H)
            .line(vec![header_span("1.1", 100.0)])
            .block()
            .line(vec![span("some body text", 72.0, 130.0, 250.0, 141.0)])
            .block()
            .line(vec![header_span("1.2", 400.0)])
            .build(0);
        let doc = FakeDocument::new(vec![page]);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);

        let rect = single_page_bounds(&doc, 0, &header, &pattern())
            .expect("no pdf error")
            .expect("bounds found");

        // Bottom at the next header's top, right clipped to its right edge.
        assert_eq!(rect.y0, 100.0);
        assert_eq!(rect.y1, 400.0);
        assert_eq!(rect.x0, 0.0);
        assert_eq!(rect.x1, 280.0);
    }

    #[test]
    fn single_page_without_any_later_header_uses_word_probe() {
        let page = PageBuilder::new(W, H)
            .line(vec![header_span("1.1", 100.0)])
            .block()
            .line(vec![span("body line one", 72.0, 130.0, 250.0, 141.0)])
            .line(vec![span("body line two", 72.0, 290.0, 260.0, 301.0)])
            .build(0);
        let doc = FakeDocument::new(vec![page]);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);

        let rect = single_page_bounds(&doc, 0, &header, &pattern())
            .expect("no pdf error")
            .expect("bounds found");

        // Lowest word bottom (301) + tail margin
        assert_eq!(rect.y1, 321.0);
        assert_eq!(rect.x1, W);
    }

    #[test]
    fn single_page_word_probe_clamps_to_page_height() {
        let page = PageBuilder::new(W, H)
            .line(vec![header_span("1.1", 100.0)])
            .block()
            .line(vec![span("very last line", 72.0, H - 15.0, 260.0, H - 4.0)])
            .build(0);
        let doc = FakeDocument::new(vec![page]);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);

        let rect = single_page_bounds(&doc, 0, &header, &pattern())
            .expect("no pdf error")
            .expect("bounds found");

        assert_eq!(rect.y1, H);
    }

    #[test]
    fn single_page_continuation_header_on_later_page_sets_bottom() {
        // The acknowledged limitation of the fallback path: the bottom comes
        // from the later page's header position.
        let page0 = PageBuilder::new(W, H)
            .line(vec![header_span("1.1", 50.0)])
            .build(0);
        let page1 = PageBuilder::new(W, H)
            .line(vec![header_span("1.2", 300.0)])
            .build(1);
        let doc = FakeDocument::new(vec![page0, page1]);
        let header = Rect::new(72.0, 50.0, 280.0, 62.0);

        let rect = single_page_bounds(&doc, 0, &header, &pattern())
            .expect("no pdf error")
            .expect("bounds found");

        assert_eq!(rect.y0, 50.0);
        assert_eq!(rect.y1, 300.0);
        assert_eq!(rect.x1, W);
    }

    #[test]
    fn single_page_degenerate_input_yields_none() {
        // Next header above the current one on a later page: negative height.
        let page0 = PageBuilder::new(W, H)
            .line(vec![header_span("1.1", 500.0)])
            .build(0);
        let page1 = PageBuilder::new(W, H)
            .line(vec![header_span("1.2", 100.0)])
            .build(1);
        let doc = FakeDocument::new(vec![page0, page1]);
        let header = Rect::new(72.0, 500.0, 280.0, 512.0);

        let result = single_page_bounds(&doc, 0, &header, &pattern()).expect("no pdf error");
        assert!(result.is_none());
    }

    #[test]
    fn multi_page_stops_at_terminating_header() {
        let page0 = PageBuilder::new(W, H)
            .line(vec![header_span("2.2", 400.0)])
            .build(0);
        let page1 = PageBuilder::new(W, H)
            .line(vec![span("continuation text", 72.0, 60.0, 260.0, 71.0)])
            .build(1);
        let page2 = PageBuilder::new(W, H)
            .line(vec![header_span("2.3", 250.0)])
            .build(2);
        let doc = FakeDocument::new(vec![page0, page1, page2]);
        let header = Rect::new(72.0, 400.0, 280.0, 412.0);

        let (overall, pages) = multi_page_bounds(&doc, 0, &header, &pattern(), 10)
            .expect("no pdf error")
            .expect("bounds found");

        assert_eq!(
            pages,
            vec![
                (0, Rect::new(0.0, 400.0, W, H)),
                (1, Rect::new(0.0, 0.0, W, H)),
                (2, Rect::new(0.0, 0.0, W, 250.0)),
            ]
        );
        assert_eq!(overall, Rect::new(0.0, 400.0, W, 250.0));
    }

    #[test]
    fn multi_page_window_exhaustion_is_open_ended() {
        // No terminating header anywhere: exactly max_pages rectangles, the
        // first starting at the header, the rest at the page top.
        let pages: Vec<_> = (0..5)
            .map(|i| {
                let builder = PageBuilder::new(W, H);
                if i == 0 {
                    builder.line(vec![header_span("3.1", 100.0)]).build(0)
                } else {
                    builder
                        .line(vec![span("filler", 72.0, 60.0, 130.0, 71.0)])
                        .build(i)
                }
            })
            .collect();
        let doc = FakeDocument::new(pages);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);

        let (overall, collected) = multi_page_bounds(&doc, 0, &header, &pattern(), 3)
            .expect("no pdf error")
            .expect("bounds found");

        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0], (0, Rect::new(0.0, 100.0, W, H)));
        for (i, (page_index, rect)) in collected.iter().enumerate().skip(1) {
            assert_eq!(*page_index, i);
            assert_eq!(*rect, Rect::new(0.0, 0.0, W, H));
        }
        assert_eq!(overall.y1, H);
    }

    #[test]
    fn multi_page_is_clipped_by_document_length() {
        let page0 = PageBuilder::new(W, H)
            .line(vec![header_span("4.1", 100.0)])
            .build(0);
        let doc = FakeDocument::new(vec![page0]);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);

        let (_, pages) = multi_page_bounds(&doc, 0, &header, &pattern(), 10)
            .expect("no pdf error")
            .expect("bounds found");

        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn resolve_prefers_the_multi_page_calculator() {
        let page = PageBuilder::new(W, H)
            .line(vec![header_span("5.1", 100.0)])
            .block()
            .line(vec![header_span("5.2", 400.0)])
            .build(0);
        let doc = FakeDocument::new(vec![page]);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);

        let bounds = resolve_section_bounds(&doc, 0, &header, &pattern(), &ExtractionConfig::default())
            .expect("no pdf error")
            .expect("bounds found");

        match bounds {
            SectionBounds::Multi { pages, .. } => {
                assert_eq!(pages, vec![(0, Rect::new(0.0, 100.0, W, 400.0))]);
            }
            SectionBounds::Single(_) => panic!("expected multi-page bounds"),
        }
    }

    #[test]
    fn resolve_falls_back_to_single_page_when_window_is_zero() {
        let page = PageBuilder::new(W, H)
            .line(vec![header_span("6.1", 100.0)])
            .block()
            .line(vec![header_span("6.2", 400.0)])
            .build(0);
        let doc = FakeDocument::new(vec![page]);
        let header = Rect::new(72.0, 100.0, 280.0, 112.0);
        let config = ExtractionConfig {
            max_pages_to_search: 0,
            ..ExtractionConfig::default()
        };

        let bounds = resolve_section_bounds(&doc, 0, &header, &pattern(), &config)
            .expect("no pdf error")
            .expect("bounds found");

        match bounds {
            SectionBounds::Single(rect) => {
                assert_eq!(rect.y1, 400.0);
                assert_eq!(rect.x1, 280.0);
            }
            SectionBounds::Multi { .. } => panic!("expected single-page fallback"),
        }
    }
}
