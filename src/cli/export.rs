//! Export command implementation

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::pipeline::{ExportRun, ExportSummary};
use crate::utils::{format_megabytes, format_with_commas, json_output_size};

#[derive(Args)]
pub struct ExportArgs {
    /// SQLite database to export [default: public/db/archimap.sqlite3]
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory for output files [default: public/data]
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Records per page file [default: 50]
    #[arg(short = 'p', long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Path to config file (archimap-export.toml or .yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let start_time = Instant::now();

    let cwd = std::env::current_dir()?;
    let file_config = load_config(&cwd, args.config.as_deref())?;
    let config = merge_cli_with_config(
        file_config,
        CliOverrides {
            source_path: args.source,
            output_dir: args.output_dir,
            page_size: args.page_size,
        },
    )?;

    println!("Database: {}", config.source_path.display());
    println!("Output: {}", config.output_dir.display());

    let progress = if args.no_progress { ProgressBar::hidden() } else { ProgressBar::new(0) };
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} pages {msg}") {
        progress.set_style(style);
    }

    let result = ExportRun::new(&config).execute(|written| {
        progress.set_length(written.total_pages as u64);
        progress.set_message(format!("({} items)", written.items));
        progress.inc(1);
    });
    progress.finish_and_clear();
    let summary = result?;

    let total_size = json_output_size(&summary.output_dir)
        .with_context(|| format!("Failed to measure {}", summary.output_dir.display()))?;
    print_summary(&summary, total_size);
    println!("  Elapsed: {:.1}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

fn print_summary(summary: &ExportSummary, total_size: u64) {
    let manifest = &summary.manifest;
    println!();
    println!("Export completed successfully!");
    println!("Summary:");
    println!("  Total items: {}", format_with_commas(manifest.total_items as u64));
    println!("  Pages created: {} ({} per page)", manifest.total_pages, manifest.items_per_page);
    println!("  Index keys: {}", format_with_commas(summary.index_keys as u64));
    if !summary.stale_pages_removed.is_empty() {
        println!("  Stale pages removed: {}", summary.stale_pages_removed.len());
    }
    println!("  Total JSON size: {}", format_megabytes(total_size));
}
