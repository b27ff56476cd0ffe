//! Presentation render pipeline.
//!
//! Fetches a presentation, extracts its structure, and synthesizes HTML
//! slide fragments. Only fetch failures reach the caller; anything that goes
//! wrong after the bytes are in memory degrades to placeholder slides.

pub mod convert;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod source;

pub use convert::{ConversionMetadata, ConversionResponse, ConversionService, ErrorBody};
pub use error::{ConvertError, FetchError};
pub use fetch::{Fetcher, SourceFetcher};
pub use pipeline::{RenderOptions, RenderPipeline, RenderStage};
pub use source::PresentationSource;
