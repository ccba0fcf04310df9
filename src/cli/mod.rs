//! Command-line interface for archimap-export
//!
//! Provides `export`, `info`, `verify` and `completions` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod completions;
mod export;
mod info;
mod verify;

/// Export the architecture database to paginated JSON with a search index
#[derive(Parser)]
#[command(name = "archimap-export")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the database to page files, a search index and a manifest
    Export(export::ExportArgs),

    /// Show record and page counts without writing anything
    Info(info::InfoArgs),

    /// Check an output directory against its manifest
    Verify(verify::VerifyArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Parse arguments and run the selected command.
///
/// A rejected command line comes back as a [`clap::Error`] so the caller can
/// let clap print it; every other failure is an ordinary error chain.
pub fn run() -> Result<()> {
    let cli = Cli::try_parse()?;

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Export(args) => export::run(args),
        Commands::Info(args) => info::run(args),
        Commands::Verify(args) => verify::run(args),
        Commands::Completions(args) => completions::run(args),
    }
}
