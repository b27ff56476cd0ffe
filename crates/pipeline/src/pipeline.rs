//! The render pipeline: fetch, extract, synthesize.
//!
//! Per call the pipeline moves through [`RenderStage`]s once:
//! `Fetching -> Extracting -> Synthesizing | FallbackSynthesizing -> Done`.
//! There is no retry, cancellation, or partial output. Each call owns its
//! buffers and result; the pipeline itself holds no mutable state, so one
//! instance can serve any number of concurrent renders.

use crate::error::FetchError;
use crate::fetch::{Fetcher, SourceFetcher};
use crate::source::PresentationSource;
use slides_core::html::PREVIEW_ERROR_HTML;
use slides_core::{FallbackEstimate, HtmlSlideRenderer, RenderedSlide, SlideDocument};
use slides_pptx::PptxParser;
use std::fmt;

/// Caller-selected render behaviour.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Skip extraction and emit size-estimated placeholders.
    pub fallback_only: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the cheap preview path.
    pub fn with_fallback_only(mut self, fallback_only: bool) -> Self {
        self.fallback_only = fallback_only;
        self
    }
}

/// Stage of a single render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Fetching,
    Extracting,
    Synthesizing,
    FallbackSynthesizing,
    Done,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStage::Fetching => "fetching",
            RenderStage::Extracting => "extracting",
            RenderStage::Synthesizing => "synthesizing",
            RenderStage::FallbackSynthesizing => "fallback-synthesizing",
            RenderStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Renders presentation sources into [`SlideDocument`]s.
#[derive(Debug, Clone)]
pub struct RenderPipeline<F = SourceFetcher> {
    fetcher: F,
    parser: PptxParser,
    renderer: HtmlSlideRenderer,
    options: RenderOptions,
}

impl Default for RenderPipeline<SourceFetcher> {
    fn default() -> Self {
        Self::new(SourceFetcher::new())
    }
}

impl<F: Fetcher> RenderPipeline<F> {
    /// Create a pipeline around a fetcher with default settings.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            parser: PptxParser::new(),
            renderer: HtmlSlideRenderer::new(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_renderer(mut self, renderer: HtmlSlideRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_parser(mut self, parser: PptxParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn renderer(&self) -> &HtmlSlideRenderer {
        &self.renderer
    }

    /// Render a source into a slide document.
    ///
    /// # Errors
    /// Only [`FetchError`], when the source cannot be resolved or retrieved.
    /// Once the bytes are in memory this always resolves to a document,
    /// degraded to placeholders if extraction fails.
    pub async fn render(&self, source: impl AsRef<str>) -> Result<SlideDocument, FetchError> {
        let source = PresentationSource::parse(source.as_ref())?;
        self.render_source(&source).await
    }

    /// Render an already-parsed source.
    pub async fn render_source(
        &self,
        source: &PresentationSource,
    ) -> Result<SlideDocument, FetchError> {
        log::info!(
            "Rendering {}",
            source.file_name().unwrap_or_else(|| source.to_string())
        );
        log::debug!("{}: {}", source, RenderStage::Fetching);
        let bytes = self.fetcher.fetch(source).await?;

        let document = self.render_bytes(&bytes);
        log::debug!(
            "{}: {} ({} slides)",
            source,
            RenderStage::Done,
            document.metadata().total_slides
        );
        Ok(document)
    }

    /// Render fetched content. Never fails.
    pub fn render_bytes(&self, bytes: &[u8]) -> SlideDocument {
        if self.options.fallback_only {
            log::debug!("Placeholder preview requested; skipping extraction");
            return self.render_fallback(bytes.len());
        }

        log::debug!("{} {} bytes", RenderStage::Extracting, bytes.len());
        match self.parser.parse_bytes(bytes) {
            Ok(parsed) => {
                log::debug!("{} {} units", RenderStage::Synthesizing, parsed.units().len());
                let fragments = self.renderer.render_units(parsed.units());
                SlideDocument::new(fragments, &parsed.title, &parsed.author, false)
            }
            Err(e) => {
                log::warn!("Structural extraction failed, using placeholder slides: {}", e);
                self.render_fallback(bytes.len())
            }
        }
    }

    fn render_fallback(&self, byte_len: usize) -> SlideDocument {
        let estimate = FallbackEstimate::from_byte_len(byte_len);
        log::debug!(
            "{} {} placeholder slides for {} bytes",
            RenderStage::FallbackSynthesizing,
            estimate.slide_count,
            byte_len
        );
        SlideDocument::new(self.renderer.render_fallback(estimate), "", "", true)
    }

    /// First slide of the rendered source, or an error placeholder.
    ///
    /// Never fails; failure shows only in the returned fragment.
    pub async fn preview(&self, source: impl AsRef<str>) -> RenderedSlide {
        match self.render(source).await {
            Ok(document) => document.first().cloned().unwrap_or_else(preview_error_slide),
            Err(e) => {
                log::error!("Error generating preview: {}", e);
                preview_error_slide()
            }
        }
    }
}

/// Placeholder returned by a failed preview.
pub fn preview_error_slide() -> RenderedSlide {
    RenderedSlide {
        index: 0,
        html: PREVIEW_ERROR_HTML.to_string(),
    }
}
