//! Retrieval of presentation bytes.
//!
//! The whole body is buffered in memory: no streaming and no range requests.
//! The pipeline sets no timeout of its own; [`SourceFetcher::with_timeout`]
//! configures the transport.

use crate::error::FetchError;
use crate::source::PresentationSource;
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can turn a source into its full binary content.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the complete content of `source`. No retries.
    async fn fetch(&self, source: &PresentationSource) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher for HTTP(S) URLs and local files.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl SourceFetcher {
    /// Create a fetcher with no transport timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher whose HTTP requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    async fn fetch_remote(&self, url: &reqwest::Url) -> Result<Vec<u8>, FetchError> {
        log::info!("Fetching presentation from: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, source: &PresentationSource) -> Result<Vec<u8>, FetchError> {
        match source {
            PresentationSource::Remote(url) => self.fetch_remote(url).await,
            PresentationSource::Local(path) => {
                log::debug!("Reading presentation from: {}", path.display());
                tokio::fs::read(path).await.map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}
