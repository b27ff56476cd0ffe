//! Presentation source resolution.

use crate::error::FetchError;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a presentation is read from. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationSource {
    /// HTTP or HTTPS resource.
    Remote(Url),
    /// File on the local file system (plain path or `file://` URL).
    Local(PathBuf),
}

impl PresentationSource {
    /// Parse a user-supplied URL or path.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(FetchError::InvalidSource(input.to_string()));
        }

        if is_url(input) {
            let url = Url::parse(input).map_err(|_| FetchError::InvalidSource(input.to_string()))?;
            return Ok(Self::Remote(url));
        }

        if input.starts_with("file://") {
            let path = Url::parse(input)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| FetchError::InvalidSource(input.to_string()))?;
            return Ok(Self::Local(path));
        }

        Ok(Self::Local(PathBuf::from(input)))
    }

    /// Last path segment, e.g. `ukatili.pptx`.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|last| !last.is_empty())
                .map(|last| last.to_string()),
            Self::Local(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.to_string()),
        }
    }

    /// Local path, if the source is on disk.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Local(path) => Some(path),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Display for PresentationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
