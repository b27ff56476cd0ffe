//! Core domain types, cell normalization, and HTML slide synthesis
//! for rendering presentations in the browser.

pub mod embed;
pub mod error;
pub mod fallback;
pub mod html;
pub mod normalize;
pub mod types;

pub use error::{Error, Result};
pub use fallback::FallbackEstimate;
pub use html::HtmlSlideRenderer;
pub use normalize::CellNormalizer;
pub use types::{
    DocumentMetadata, ParsedPresentation, PresentationFormat, RenderedSlide, SlideDocument,
    SlideUnit, DEFAULT_AUTHOR, DEFAULT_TITLE,
};
