//! Sign command - embed a signature image into a document page.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::Args;
use console::style;
use tracing::{debug, info};

use penmark_core::{
    DragDelta, PenmarkConfig, RenderContext, ResizeDelta, Session,
};

/// Arguments for the sign command.
#[derive(Args)]
pub struct SignArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Signature image file (PNG)
    #[arg(short, long, conflicts_with = "data_uri")]
    signature: Option<PathBuf>,

    /// Signature as a base64 data URI, as produced by a capture pad
    #[arg(long)]
    data_uri: Option<String>,

    /// Page to sign, 1-based
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Overlay x position in viewport pixels
    #[arg(short, long, default_value_t = 10.0)]
    x: f64,

    /// Overlay y position in viewport pixels
    #[arg(short, long, default_value_t = 10.0)]
    y: f64,

    /// Overlay box width in viewport pixels
    #[arg(long)]
    width: Option<f64>,

    /// Overlay box height in viewport pixels
    #[arg(long)]
    height: Option<f64>,

    /// Render scale the viewport coordinates were measured at
    #[arg(long, default_value_t = 1.5)]
    render_scale: f64,

    /// Output file (default: derived from the document title)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: SignArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = if let Some(path) = config_path {
        PenmarkConfig::from_file(std::path::Path::new(path))?
    } else {
        PenmarkConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data_uri = match (&args.signature, &args.data_uri) {
        (Some(path), None) => {
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read signature {}", path.display()))?;
            format!("data:image/png;base64,{}", BASE64.encode(&bytes))
        }
        (None, Some(uri)) => uri.clone(),
        _ => anyhow::bail!("provide a signature with --signature <file> or --data-uri <uri>"),
    };

    let session = Session::new(config);
    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    session.load(&bytes)?;
    info!(
        pages = session.page_count().unwrap_or(0),
        "loaded {}",
        args.input.display()
    );

    session.go_to_page(args.page);
    if session.current_page() != args.page {
        anyhow::bail!(
            "page {} is out of range, document has {} pages",
            args.page,
            session.page_count().unwrap_or(0)
        );
    }

    session.set_signature(data_uri);

    // Replay the requested placement as gesture events on the default box.
    let overlay = session.overlay();
    session.drag_overlay(DragDelta::new(
        args.x - overlay.position.x,
        args.y - overlay.position.y,
    )?);
    if args.width.is_some() || args.height.is_some() {
        session.resize_overlay(ResizeDelta::new(
            args.width.unwrap_or(overlay.size.width),
            args.height.unwrap_or(overlay.size.height),
            0.0,
            0.0,
        )?);
    }
    debug!(overlay = ?session.overlay(), "overlay positioned");

    let page_height = session
        .page_height(args.page)
        .context("page has no resolvable size")?;
    let ctx = RenderContext::new(args.render_scale, page_height)?;

    let signed = session.embed_signature(&ctx).await?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(session.suggested_filename()));
    fs::write(&output, &signed)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} Signed page {} of {} -> {} ({} bytes)",
        style("✓").green(),
        args.page,
        args.input.display(),
        output.display(),
        signed.len()
    );

    Ok(())
}
