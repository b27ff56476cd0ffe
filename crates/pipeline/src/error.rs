//! Errors that escape the render pipeline and the conversion endpoint.
//!
//! [`FetchError`] is the only failure `render` reports. Extraction problems
//! are `slides_core::Error` and never leave the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve the full content of a presentation source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source string is neither a URL nor a usable path.
    #[error("Invalid presentation source '{0}'")]
    InvalidSource(String),

    /// The server answered with a non-success status.
    #[error("Failed to fetch '{url}': HTTP {status}")]
    Status { url: String, status: u16 },

    /// Network or protocol failure before a full body was received.
    #[error("Failed to fetch '{url}': {reason}")]
    Transport { url: String, reason: String },

    /// A local source could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of the conversion endpoint.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No source URL was supplied.
    #[error("Missing URL parameter")]
    MissingUrl,

    /// The source could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The transient file store failed.
    #[error("Temporary storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

impl ConvertError {
    /// Status code the endpoint answers with.
    pub fn http_status(&self) -> u16 {
        match self {
            ConvertError::MissingUrl => 400,
            ConvertError::Fetch(_) | ConvertError::Storage(_) => 500,
        }
    }
}
