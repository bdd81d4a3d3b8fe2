//! CLI application for placing a signature image onto a PDF page.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, info, sign};

/// penmark - stamp a signature image into a PDF page
#[derive(Parser)]
#[command(name = "penmark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file with calibration constants
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a signature image into a document page
    Sign(sign::SignArgs),

    /// Show document metadata (pages, sizes, title)
    Info(info::InfoArgs),

    /// Manage calibration configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sign(args) => sign::run(args, cli.config.as_deref()).await,
        Commands::Info(args) => info::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
