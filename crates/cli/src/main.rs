//! CLI tool for rendering PowerPoint files as HTML slides.

use anyhow::{Context, Result};
use clap::Parser;
use slides_core::embed::{is_embeddable, office_viewer_url};
use slides_core::{PresentationFormat, SlideDocument};
use slides_pipeline::{
    ConversionService, PresentationSource, RenderOptions, RenderPipeline, SourceFetcher,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Render a presentation (URL or local file) as HTML slide fragments.
#[derive(Parser, Debug)]
#[command(name = "pptx-slides")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Presentation URL or path (.pptx)
    source: String,

    /// Print only the first slide; failures print a placeholder instead
    #[arg(long)]
    preview: bool,

    /// Skip extraction and emit size-estimated placeholder slides
    #[arg(long)]
    fallback_only: bool,

    /// Print the rendered document as JSON
    #[arg(long, conflicts_with_all = ["preview", "embed", "convert"])]
    json: bool,

    /// Print the embedded office viewer URL instead of rendering
    #[arg(long, conflicts_with_all = ["preview", "convert"])]
    embed: bool,

    /// Print the conversion endpoint response for the source
    #[arg(long, conflicts_with = "preview")]
    convert: bool,

    /// Write a standalone HTML page to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds (default: none)
    #[arg(long)]
    timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.embed {
        if !is_embeddable(&args.source) {
            log::warn!("The hosted viewer needs a public HTTPS link; {} may not load", args.source);
        }
        println!("{}", office_viewer_url(&args.source));
        return Ok(());
    }

    let source = PresentationSource::parse(&args.source)
        .with_context(|| format!("Invalid source {}", args.source))?;
    check_local_extension(&source)?;

    let fetcher = match args.timeout {
        Some(secs) => SourceFetcher::with_timeout(Duration::from_secs(secs))?,
        None => SourceFetcher::new(),
    };

    if args.convert {
        let service = ConversionService::new(fetcher);
        let (status, body) = service.respond(Some(&args.source)).await;
        println!("{}", serde_json::to_string_pretty(&body)?);
        if status >= 400 {
            anyhow::bail!("Conversion failed with status {}", status);
        }
        return Ok(());
    }

    let pipeline = RenderPipeline::new(fetcher)
        .with_options(RenderOptions::new().with_fallback_only(args.fallback_only));

    if args.preview {
        let slide = pipeline.preview(&args.source).await;
        println!("{}", slide.html);
        return Ok(());
    }

    let document = pipeline
        .render_source(&source)
        .await
        .with_context(|| format!("Failed to render {}", source))?;

    if args.verbose {
        let metadata = document.metadata();
        eprintln!(
            "  {} by {}: {} slides{}",
            metadata.title,
            metadata.author,
            metadata.total_slides,
            if metadata.degraded { " (placeholders)" } else { "" }
        );
    }

    if let Some(ref path) = args.output {
        let page = pipeline.renderer().render_document(&document);
        write_output(path, &page)?;
        if args.verbose {
            eprintln!("Written to: {}", path.display());
        }
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print_slides(&document);
    }

    Ok(())
}

/// Reject local files that are not PowerPoint documents.
fn check_local_extension(source: &PresentationSource) -> Result<()> {
    if let Some(path) = source.as_path() {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if PresentationFormat::from_filename(name).is_none() {
            anyhow::bail!(
                "Please select a valid PowerPoint file (.ppt or .pptx): {}",
                path.display()
            );
        }
    }
    Ok(())
}

/// Print each fragment on its own line, in order.
fn print_slides(document: &SlideDocument) {
    for slide in document.slides() {
        println!("{}", slide.html);
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
