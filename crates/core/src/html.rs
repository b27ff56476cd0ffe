//! HTML slide synthesis.
//!
//! Each slide becomes a self-contained `<div class="slide">` fragment. The
//! viewer is responsible for pagination; fragments carry their index in a
//! `data-slide-index` attribute.

use crate::fallback::FallbackEstimate;
use crate::types::{SlideDocument, SlideUnit};
use std::fmt::Write;

/// Fragment returned by a preview that could not be produced.
pub const PREVIEW_ERROR_HTML: &str =
    "<div class=\"slide-preview-error\"><p>Preview not available</p></div>";

/// Renders slide units and placeholders as markup fragments.
#[derive(Debug, Clone)]
pub struct HtmlSlideRenderer {
    /// Whether line breaks inside a cell become `<br>`.
    cell_line_breaks: bool,
}

impl Default for HtmlSlideRenderer {
    fn default() -> Self {
        Self {
            cell_line_breaks: true,
        }
    }
}

impl HtmlSlideRenderer {
    /// Create a new renderer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether line breaks inside a cell become `<br>` (otherwise spaces).
    pub fn with_cell_line_breaks(mut self, enabled: bool) -> Self {
        self.cell_line_breaks = enabled;
        self
    }

    /// Render one unit at 0-based `index`.
    ///
    /// One `slide-row` per non-empty row, one `slide-cell` per value. A unit
    /// with nothing to show renders a placeholder labeled with its 1-based
    /// position.
    pub fn render_unit(&self, unit: &SlideUnit, index: usize) -> String {
        let mut content = String::new();

        if unit.is_blank() {
            let _ = write!(content, "<div class=\"slide-placeholder\">Slide {}</div>", index + 1);
            return wrap_slide(index, &content);
        }

        for row in unit.non_empty_rows() {
            content.push_str("<div class=\"slide-row\">");
            for cell in row {
                let _ = write!(content, "<div class=\"slide-cell\">{}</div>", self.escape_cell(cell));
            }
            content.push_str("</div>");
        }

        wrap_slide(index, &content)
    }

    /// Render all units in order.
    pub fn render_units(&self, units: &[SlideUnit]) -> Vec<String> {
        units
            .iter()
            .enumerate()
            .map(|(index, unit)| self.render_unit(unit, index))
            .collect()
    }

    /// Render the "preview not available" placeholder at 0-based `index`.
    pub fn render_placeholder(&self, index: usize) -> String {
        let content = format!(
            "<div class=\"slide-placeholder\"><div class=\"slide-placeholder-body\">\
             <h2>Slide {}</h2><p>Preview not available</p></div></div>",
            index + 1
        );
        wrap_slide(index, &content)
    }

    /// Render as many placeholders as the estimate calls for.
    pub fn render_fallback(&self, estimate: FallbackEstimate) -> Vec<String> {
        (0..estimate.slide_count)
            .map(|index| self.render_placeholder(index))
            .collect()
    }

    /// Wrap a rendered document in a standalone HTML page.
    pub fn render_document(&self, document: &SlideDocument) -> String {
        let metadata = document.metadata();
        let mut page = String::new();

        let _ = writeln!(page, "<!DOCTYPE html>");
        let _ = writeln!(page, "<html>");
        let _ = writeln!(page, "<head>");
        let _ = writeln!(page, "<meta charset=\"utf-8\">");
        let _ = writeln!(page, "<title>{}</title>", escape_html(&metadata.title));
        let _ = writeln!(page, "<meta name=\"author\" content=\"{}\">", escape_html(&metadata.author));
        let _ = writeln!(
            page,
            "<meta name=\"generated-at\" content=\"{}\">",
            metadata.generated_at.to_rfc3339()
        );
        let _ = writeln!(page, "<style>{}</style>", DOCUMENT_STYLE);
        let _ = writeln!(page, "</head>");
        let _ = writeln!(
            page,
            "<body data-total-slides=\"{}\" data-degraded=\"{}\">",
            metadata.total_slides, metadata.degraded
        );
        for slide in document.slides() {
            let _ = writeln!(page, "{}", slide.html);
        }
        let _ = writeln!(page, "</body>");
        let _ = writeln!(page, "</html>");

        page
    }

    fn escape_cell(&self, cell: &str) -> String {
        let escaped = escape_html(cell);
        if self.cell_line_breaks {
            escaped.replace('\n', "<br>")
        } else {
            escaped.replace('\n', " ")
        }
    }
}

const DOCUMENT_STYLE: &str = ".slide{aspect-ratio:16/9;margin:1rem auto;max-width:960px;\
border:1px solid #ddd;padding:2rem;box-sizing:border-box}\
.slide-row{display:flex;gap:1rem}.slide-cell{flex:1}\
.slide-placeholder{text-align:center;color:#666}";

fn wrap_slide(index: usize, content: &str) -> String {
    format!(
        "<div class=\"slide\" data-slide-index=\"{}\"><div class=\"slide-content\">{}</div></div>",
        index, content
    )
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_unit(rows: &[&[&str]]) -> SlideUnit {
        let mut unit = SlideUnit::new("slide");
        for row in rows {
            unit.add_row(row.iter().map(|s| s.to_string()).collect());
        }
        unit
    }

    #[test]
    fn test_render_grid() {
        let renderer = HtmlSlideRenderer::new();
        let html = renderer.render_unit(&grid_unit(&[&["a", "b"], &["c", "d"]]), 0);

        assert!(html.starts_with("<div class=\"slide\" data-slide-index=\"0\">"));
        assert_eq!(html.matches("class=\"slide-row\"").count(), 2);
        assert_eq!(html.matches("class=\"slide-cell\"").count(), 4);
        assert!(!html.contains("slide-placeholder"));
    }

    #[test]
    fn test_render_skips_zero_width_rows() {
        let renderer = HtmlSlideRenderer::new();
        let html = renderer.render_unit(&grid_unit(&[&[], &["only"]]), 2);
        assert_eq!(html.matches("class=\"slide-row\"").count(), 1);
    }

    #[test]
    fn test_empty_cell_renders_empty() {
        let renderer = HtmlSlideRenderer::new();
        let html = renderer.render_unit(&grid_unit(&[&["", "x"]]), 0);
        assert!(html.contains("<div class=\"slide-cell\"></div>"));
        assert!(!html.contains("undefined"));
        assert!(!html.contains("null"));
    }

    #[test]
    fn test_empty_unit_placeholder_uses_position() {
        let renderer = HtmlSlideRenderer::new();
        let html = renderer.render_unit(&SlideUnit::new("blank"), 4);
        assert!(html.contains("data-slide-index=\"4\""));
        assert!(html.contains("<div class=\"slide-placeholder\">Slide 5</div>"));
    }

    #[test]
    fn test_zero_width_rows_only_is_placeholder() {
        let renderer = HtmlSlideRenderer::new();
        let html = renderer.render_unit(&grid_unit(&[&[], &[]]), 0);
        assert!(html.contains("<div class=\"slide-placeholder\">Slide 1</div>"));
        assert!(!html.contains("slide-row"));
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let renderer = HtmlSlideRenderer::new();
        let html = renderer.render_unit(&grid_unit(&[&["<script>&\"x\""]]), 0);
        assert!(html.contains("&lt;script&gt;&amp;&quot;x&quot;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_cell_line_breaks() {
        let unit = grid_unit(&[&["one\ntwo"]]);
        let with_breaks = HtmlSlideRenderer::new().render_unit(&unit, 0);
        assert!(with_breaks.contains("one<br>two"));

        let flat = HtmlSlideRenderer::new()
            .with_cell_line_breaks(false)
            .render_unit(&unit, 0);
        assert!(flat.contains("one two"));
    }

    #[test]
    fn test_render_fallback() {
        let renderer = HtmlSlideRenderer::new();
        let slides = renderer.render_fallback(FallbackEstimate { slide_count: 3 });
        assert_eq!(slides.len(), 3);
        assert!(slides[2].contains("data-slide-index=\"2\""));
        assert!(slides[2].contains("<h2>Slide 3</h2>"));
        assert!(slides.iter().all(|s| s.contains("Preview not available")));
    }

    #[test]
    fn test_render_document_page() {
        let renderer = HtmlSlideRenderer::new();
        let doc = SlideDocument::new(
            renderer.render_units(&[grid_unit(&[&["hi"]])]),
            "Siku <16>",
            "",
            false,
        );
        let page = renderer.render_document(&doc);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Siku &lt;16&gt;</title>"));
        assert!(page.contains("content=\"Unknown\""));
        assert!(page.contains("data-total-slides=\"1\""));
        assert!(page.contains("<div class=\"slide-cell\">hi</div>"));
    }
}
