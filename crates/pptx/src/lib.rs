//! PPTX (Office Open XML) structural extraction.
//!
//! Reads .pptx files, which are ZIP archives containing XML parts, into a
//! [`slides_core::ParsedPresentation`]: package title and author plus one
//! grid of text cells per slide.

mod core_props;
pub mod parser;

#[cfg(any(test, feature = "test-util"))]
pub mod fixture;

pub use parser::PptxParser;
