// src/extractors/header.rs
//
// Header classification: decide whether a pattern match is a genuine section
// header or an incidental body-text mention.

use regex::Regex;

use crate::config::ExtractionConfig;
use crate::pdf::{PageLayout, Rect};

// Substrings of a font name that mark a heavy face even when the style flag
// is missing.
const BOLD_FONT_MARKERS: [&str; 2] = ["bold", "black"];

/// Heuristic header test for a candidate rectangle on a page.
///
/// A span intersecting the candidate marks it as a header when its font size
/// reaches the configured minimum and the span is bold, carries a bold/black
/// font name, or is strictly larger than the minimum. Spans are visited in
/// the page's block/line/span enumeration order and the first qualifying one
/// wins. Without any qualifying span, a candidate whose top edge sits within
/// the configured top fraction of the page still counts as a header; source
/// layouts with missing font metadata end up here.
pub fn is_header(page: &PageLayout, candidate: &Rect, config: &ExtractionConfig) -> bool {
    for span in page.spans() {
        if !span.bbox.intersects(candidate) {
            continue;
        }
        if span.font_size < config.min_font_size {
            continue;
        }
        if span.bold {
            return true;
        }
        let font = span.font_name.to_lowercase();
        if BOLD_FONT_MARKERS.iter().any(|marker| font.contains(marker)) {
            return true;
        }
        if span.font_size > config.min_font_size {
            return true;
        }
    }

    candidate.y0 < page.height * config.header_detection_threshold
}

/// All pattern matches on the page that classify as headers, in match order.
pub fn find_headers(page: &PageLayout, pattern: &Regex, config: &ExtractionConfig) -> Vec<Rect> {
    page.search(pattern)
        .into_iter()
        .filter(|candidate| {
            let keep = is_header(page, candidate, config);
            if !keep {
                tracing::debug!(
                    "Rejected match at ({:.1}, {:.1}) on page {}: body text",
                    candidate.x0,
                    candidate.y0,
                    page.index
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{span, styled_span, PageBuilder};

    fn pattern() -> Regex {
        regex::RegexBuilder::new(r"Sample\s*Exercise\s+\d+\.\d+")
            .case_insensitive(true)
            .build()
            .expect("pattern")
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn bold_span_is_a_header() {
        // Low on the page, so the position fallback cannot help.
        let page = PageBuilder::new(612.0, 792.0)
            .line(vec![styled_span(
                "Sample Exercise 1.1",
                72.0,
                500.0,
                300.0,
                514.0,
                "Helvetica-Bold",
                12.0,
                true,
            )])
            .build(0);
        let candidate = Rect::new(72.0, 500.0, 300.0, 514.0);

        assert!(is_header(&page, &candidate, &config()));
    }

    #[test]
    fn heavy_font_name_is_a_header() {
        let page = PageBuilder::new(612.0, 792.0)
            .line(vec![styled_span(
                "Sample Exercise 1.1",
                72.0,
                500.0,
                300.0,
                514.0,
                "Arial-Black",
                10.0,
                false,
            )])
            .build(0);
        let candidate = Rect::new(72.0, 500.0, 300.0, 514.0);

        assert!(is_header(&page, &candidate, &config()));
    }

    #[test]
    fn oversized_span_is_a_header() {
        let page = PageBuilder::new(612.0, 792.0)
            .line(vec![styled_span(
                "Sample Exercise 1.1",
                72.0,
                500.0,
                300.0,
                514.0,
                "Helvetica",
                14.0,
                false,
            )])
            .build(0);
        let candidate = Rect::new(72.0, 500.0, 300.0, 514.0);

        assert!(is_header(&page, &candidate, &config()));
    }

    #[test]
    fn exact_minimum_size_without_bold_needs_the_position_fallback() {
        // size == min passes the gate but fails every branch inside it, so
        // classification hinges on page position alone.
        let low = PageBuilder::new(612.0, 792.0)
            .line(vec![styled_span(
                "Sample Exercise 1.1",
                72.0,
                500.0,
                300.0,
                514.0,
                "Helvetica",
                10.0,
                false,
            )])
            .build(0);
        let low_candidate = Rect::new(72.0, 500.0, 300.0, 514.0);
        assert!(!is_header(&low, &low_candidate, &config()));

        let high = PageBuilder::new(612.0, 792.0)
            .line(vec![styled_span(
                "Sample Exercise 1.1",
                72.0,
                100.0,
                300.0,
                114.0,
                "Helvetica",
                10.0,
                false,
            )])
            .build(0);
        let high_candidate = Rect::new(72.0, 100.0, 300.0, 114.0);
        // 100 < 792 * 0.3, so the fallback fires
        assert!(is_header(&high, &high_candidate, &config()));
    }

    #[test]
    fn candidate_with_no_spans_relies_on_position_only() {
        let page = PageBuilder::new(612.0, 792.0).build(0);

        assert!(is_header(&page, &Rect::new(72.0, 100.0, 300.0, 114.0), &config()));
        assert!(!is_header(&page, &Rect::new(72.0, 500.0, 300.0, 514.0), &config()));
    }

    #[test]
    fn find_headers_filters_body_mentions() {
        // A real bold header at the top and a 9pt inline mention far down.
        let page = PageBuilder::new(612.0, 792.0)
            .line(vec![styled_span(
                "Sample Exercise 2.1",
                72.0,
                90.0,
                300.0,
                104.0,
                "Helvetica-Bold",
                12.0,
                true,
            )])
            .block()
            .line(vec![span(
                "as shown in Sample Exercise 2.1 above",
                72.0,
                600.0,
                400.0,
                611.0,
            )])
            .build(0);

        let headers = find_headers(&page, &pattern(), &config());
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].y0, 90.0);
    }
}
