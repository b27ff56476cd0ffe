//! Server-side conversion endpoint contract.
//!
//! The endpoint accepts a source URL, fetches it into a transient store and
//! answers with per-slide image URLs plus slide-count metadata. Slide images
//! are not rendered: the URLs are reserved names under [`DEFAULT_SLIDE_URL_PREFIX`]
//! and nothing is written behind them yet.

use crate::error::{ConvertError, FetchError};
use crate::fetch::{Fetcher, SourceFetcher};
use crate::source::PresentationSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use slides_core::{FallbackEstimate, PresentationFormat};
use slides_pptx::PptxParser;

/// URL prefix of generated slide images.
pub const DEFAULT_SLIDE_URL_PREFIX: &str = "/api/pptx-slides";

/// Title reported when the package carries none.
pub const DEFAULT_CONVERSION_TITLE: &str = "Presentation";

const STORED_FILE_NAME: &str = "presentation.pptx";

/// Successful conversion body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub success: bool,
    pub slide_urls: Vec<String>,
    pub metadata: ConversionMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub title: String,
    pub total_slides: usize,
    pub converted_at: DateTime<Utc>,
}

/// Failed conversion body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ConvertError> for ErrorBody {
    fn from(err: &ConvertError) -> Self {
        match err {
            ConvertError::MissingUrl => ErrorBody {
                error: err.to_string(),
                details: None,
            },
            ConvertError::Fetch(FetchError::Status { status, .. }) => ErrorBody {
                error: format!("Failed to fetch PPTX file: HTTP {}", status),
                details: None,
            },
            other => ErrorBody {
                error: "Failed to convert PPTX file".to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

/// Fetches a presentation into a transient store and reports its slides.
#[derive(Debug, Clone)]
pub struct ConversionService<F = SourceFetcher> {
    fetcher: F,
    parser: PptxParser,
    slide_url_prefix: String,
}

impl<F: Fetcher> ConversionService<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            parser: PptxParser::new(),
            slide_url_prefix: DEFAULT_SLIDE_URL_PREFIX.to_string(),
        }
    }

    /// Serve slide images under a different prefix.
    pub fn with_slide_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.slide_url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert the presentation at `url`.
    pub async fn convert(&self, url: Option<&str>) -> Result<ConversionResponse, ConvertError> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConvertError::MissingUrl)?;
        let source = PresentationSource::parse(url)?;
        let bytes = self.fetcher.fetch(&source).await?;

        let stored_name = stored_file_name(&source);
        log::info!("Converting {} ({} bytes)", stored_name, bytes.len());

        // Dropping the directory removes it, on success and on every error path.
        let store = tempfile::tempdir()?;
        let stored_path = store.path().join(&stored_name);
        tokio::fs::write(&stored_path, &bytes).await?;
        log::debug!("Stored {} bytes at {}", bytes.len(), stored_path.display());

        let stored = tokio::fs::read(&stored_path).await?;
        let (title, total_slides) = match self.parser.parse_bytes(&stored) {
            Ok(parsed) => (parsed.title.clone(), parsed.units().len()),
            Err(e) => {
                log::warn!("Could not read slide structure of {}: {}", source, e);
                (
                    String::new(),
                    FallbackEstimate::from_byte_len(stored.len()).slide_count,
                )
            }
        };

        let batch = uuid::Uuid::new_v4();
        let slide_urls = (1..=total_slides)
            .map(|n| format!("{}/{}-slide-{}.png", self.slide_url_prefix, batch, n))
            .collect();

        Ok(ConversionResponse {
            success: true,
            slide_urls,
            metadata: ConversionMetadata {
                title: if title.is_empty() {
                    DEFAULT_CONVERSION_TITLE.to_string()
                } else {
                    title
                },
                total_slides,
                converted_at: Utc::now(),
            },
        })
    }

    /// Convert and shape the outcome as `(status, JSON body)`.
    pub async fn respond(&self, url: Option<&str>) -> (u16, serde_json::Value) {
        match self.convert(url).await {
            Ok(response) => match serde_json::to_value(&response) {
                Ok(body) => (200, body),
                Err(e) => (
                    500,
                    serde_json::json!({ "error": "Failed to convert PPTX file", "details": e.to_string() }),
                ),
            },
            Err(e) => {
                log::error!("Error converting PPTX: {}", e);
                let body = serde_json::to_value(ErrorBody::from(&e))
                    .unwrap_or_else(|_| serde_json::json!({ "error": e.to_string() }));
                (e.http_status(), body)
            }
        }
    }
}

/// Name under which the fetched file is stored: the source's own name when
/// it is a PowerPoint file, otherwise a fixed one.
fn stored_file_name(source: &PresentationSource) -> String {
    source
        .file_name()
        .filter(|name| PresentationFormat::from_filename(name).is_some())
        .unwrap_or_else(|| STORED_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::FakeFetcher;
    use slides_pptx::fixture::PptxFixture;

    const DECK: &str = "https://example.org/man.pptx";

    #[tokio::test]
    async fn test_convert_counts_slides() {
        let bytes = PptxFixture::new()
            .with_title("Role of a Man")
            .with_text_slide(&["one"])
            .with_text_slide(&["two"])
            .build();
        let service = ConversionService::new(FakeFetcher::default().with_body(DECK, bytes));

        let response = service.convert(Some(DECK)).await.unwrap();
        assert!(response.success);
        assert_eq!(response.metadata.total_slides, 2);
        assert_eq!(response.metadata.title, "Role of a Man");
        assert_eq!(response.slide_urls.len(), 2);
        assert!(response.slide_urls[0].starts_with("/api/pptx-slides/"));
        assert!(response.slide_urls[1].ends_with("-slide-2.png"));
    }

    #[tokio::test]
    async fn test_convert_unparseable_uses_estimate() {
        let service = ConversionService::new(
            FakeFetcher::default().with_body(DECK, vec![7u8; 51_200]),
        )
        .with_slide_url_prefix("https://cdn.example.org/slides/");

        let response = service.convert(Some(DECK)).await.unwrap();
        assert_eq!(response.metadata.total_slides, 5);
        assert_eq!(response.metadata.title, DEFAULT_CONVERSION_TITLE);
        assert!(response.slide_urls[0].starts_with("https://cdn.example.org/slides/"));
        assert!(!response.slide_urls[0].contains("slides//"));
    }

    #[test]
    fn test_stored_file_name_follows_source() {
        let named = PresentationSource::parse("https://example.org/files/ukatili.pptx").unwrap();
        assert_eq!(stored_file_name(&named), "ukatili.pptx");

        let query = PresentationSource::parse("https://example.org/download?id=7").unwrap();
        assert_eq!(stored_file_name(&query), STORED_FILE_NAME);

        let bare = PresentationSource::parse("https://example.org/").unwrap();
        assert_eq!(stored_file_name(&bare), STORED_FILE_NAME);
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let service = ConversionService::new(FakeFetcher::default());

        let (status, body) = service.respond(None).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Missing URL parameter");

        let (status, _) = service.respond(Some("  ")).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_server_error() {
        let service = ConversionService::new(FakeFetcher::default().with_status(DECK, 404));

        let (status, body) = service.respond(Some(DECK)).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to fetch PPTX file: HTTP 404");
    }

    #[tokio::test]
    async fn test_success_body_shape() {
        let bytes = PptxFixture::new().with_text_slide(&["x"]).build();
        let service = ConversionService::new(FakeFetcher::default().with_body(DECK, bytes));

        let (status, body) = service.respond(Some(DECK)).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["metadata"]["totalSlides"], 1);
        assert!(body["metadata"]["convertedAt"].is_string());
        assert_eq!(body["slideUrls"].as_array().map(|a| a.len()), Some(1));
    }
}
