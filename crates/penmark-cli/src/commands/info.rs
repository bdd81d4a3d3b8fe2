//! Info command - show document metadata.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use console::style;

use penmark_core::Session;

/// Arguments for the info command.
#[derive(Args)]
pub struct InfoArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(serde::Serialize)]
struct DocumentInfo {
    pages: u32,
    suggested_filename: String,
    page_sizes: Vec<PageSize>,
}

#[derive(serde::Serialize)]
struct PageSize {
    page: u32,
    width: f64,
    height: f64,
}

pub async fn run(args: InfoArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let session = Session::default();
    session.load(&bytes)?;

    let pages = session.page_count().unwrap_or(0);
    let page_sizes: Vec<PageSize> = (1..=pages)
        .filter_map(|page| {
            session.page_size(page).map(|(width, height)| PageSize {
                page,
                width,
                height,
            })
        })
        .collect();

    let doc_info = DocumentInfo {
        pages,
        suggested_filename: session.suggested_filename(),
        page_sizes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc_info)?);
        return Ok(());
    }

    println!("{} {}", style("Document:").bold(), args.input.display());
    println!("  Pages: {}", doc_info.pages);
    println!("  Output name: {}", doc_info.suggested_filename);
    for size in &doc_info.page_sizes {
        println!(
            "  Page {}: {:.1} x {:.1} pt",
            size.page, size.width, size.height
        );
    }

    Ok(())
}
