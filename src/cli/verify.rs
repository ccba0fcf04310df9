//! Verify command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::domain::DEFAULT_OUTPUT_DIR;
use crate::verify::verify_output;

#[derive(Args)]
pub struct VerifyArgs {
    /// Export output directory to check
    #[arg(value_name = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let report = verify_output(&args.output_dir)?;

    for problem in &report.problems {
        println!("  ✗ {problem}");
    }

    if !report.is_ok() {
        anyhow::bail!(
            "{} problem(s) found in {}",
            report.problems.len(),
            args.output_dir.display()
        );
    }

    let total_pages = report.manifest.as_ref().map_or(0, |m| m.total_pages);
    println!(
        "OK: {} pages, {} items in {}",
        total_pages,
        report.items_seen,
        args.output_dir.display()
    );
    Ok(())
}
