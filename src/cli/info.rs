//! Info command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::source::{ArchitectureSource, PagePlan};
use crate::utils::format_with_commas;

#[derive(Args)]
pub struct InfoArgs {
    /// SQLite database to inspect
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Records per page
    #[arg(short = 'p', long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Path to config file (archimap-export.toml or .yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let file_config = load_config(&cwd, args.config.as_deref())?;
    let config = merge_cli_with_config(
        file_config,
        CliOverrides { source_path: args.source, output_dir: None, page_size: args.page_size },
    )?;

    let source = ArchitectureSource::open(&config.source_path)?;
    let total = source.count().context("Failed to count records")?;
    let plan = PagePlan::new(total, config.page_size)?;

    println!("Source: {}", source.path().display());
    println!();
    println!("Statistics:");
    println!("  Records: {}", format_with_commas(plan.total_items as u64));
    println!("  Page size: {}", plan.page_size);
    println!("  Pages: {}", plan.total_pages);
    if let Some(last) = plan.pages().last() {
        println!("  Last page items: {}", plan.total_items - last.offset);
    }

    Ok(())
}
