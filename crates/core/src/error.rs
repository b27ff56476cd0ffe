//! Error types for presentation extraction.
//!
//! Everything here is an extraction failure. The render pipeline never
//! surfaces these to its callers: they select the placeholder path instead.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting structure from a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the input buffer.
    #[error("Failed to read presentation: {0}")]
    IoError(#[from] std::io::Error),

    /// The container format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// The PPTX package is missing a required part or relationship.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),
}
