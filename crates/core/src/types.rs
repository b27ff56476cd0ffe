//! Domain types for extracted and rendered presentation content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title reported when the source carries none.
pub const DEFAULT_TITLE: &str = "Untitled Presentation";

/// Author reported when the source carries none.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Detected, never parsed.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from a file name such as `deck.PPTX`.
    pub fn from_filename(name: &str) -> Option<Self> {
        name.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// Structured result of a successful extraction.
///
/// Always holds at least one unit: a container without slides gets a
/// single empty default unit.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedPresentation {
    /// Document title from the package properties. May be empty.
    pub title: String,

    /// Document author from the package properties. May be empty.
    pub author: String,

    units: Vec<SlideUnit>,
}

impl ParsedPresentation {
    /// Create a presentation, synthesizing a default unit if `units` is empty.
    pub fn new(title: impl Into<String>, author: impl Into<String>, mut units: Vec<SlideUnit>) -> Self {
        if units.is_empty() {
            log::debug!("Container holds no slides; using one empty default unit");
            units.push(SlideUnit::new("Slide 1"));
        }
        Self {
            title: title.into(),
            author: author.into(),
            units,
        }
    }

    /// Slide-equivalent units in presentation order.
    pub fn units(&self) -> &[SlideUnit] {
        &self.units
    }
}

/// One named top-level block of content, the analogue of a slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideUnit {
    /// Unit name, e.g. the slide part name.
    pub name: String,

    /// Grid of cell values. Rows may have different widths.
    pub rows: Vec<Vec<String>>,
}

impl SlideUnit {
    /// Create an empty unit with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row of cell values.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Rows that hold at least one column.
    pub fn non_empty_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter().filter(|row| !row.is_empty())
    }

    /// Whether the unit has nothing to render.
    pub fn is_blank(&self) -> bool {
        self.non_empty_rows().next().is_none()
    }
}

/// A single rendered slide fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSlide {
    /// 0-based position in the document.
    pub index: usize,

    /// Self-contained markup fragment.
    pub html: String,
}

/// Metadata attached to every rendered document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub total_slides: usize,
    pub generated_at: DateTime<Utc>,

    /// True when slides are placeholders that do not reflect source content.
    pub degraded: bool,
}

/// The rendered output of one render call.
///
/// Indices are assigned on construction and match the sequence position;
/// the document cannot be modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SlideDocument {
    slides: Vec<RenderedSlide>,
    metadata: DocumentMetadata,
}

impl SlideDocument {
    /// Build a document from fragments in display order.
    ///
    /// Empty `title`/`author` fall back to [`DEFAULT_TITLE`]/[`DEFAULT_AUTHOR`].
    pub fn new(fragments: Vec<String>, title: &str, author: &str, degraded: bool) -> Self {
        let slides: Vec<RenderedSlide> = fragments
            .into_iter()
            .enumerate()
            .map(|(index, html)| RenderedSlide { index, html })
            .collect();

        let metadata = DocumentMetadata {
            title: non_empty_or(title, DEFAULT_TITLE),
            author: non_empty_or(author, DEFAULT_AUTHOR),
            total_slides: slides.len(),
            generated_at: Utc::now(),
            degraded,
        };

        Self { slides, metadata }
    }

    pub fn slides(&self) -> &[RenderedSlide] {
        &self.slides
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// First slide, if any.
    pub fn first(&self) -> Option<&RenderedSlide> {
        self.slides.first()
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
