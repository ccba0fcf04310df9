//! Manifest (`metadata.json`) generation.

use super::write_pretty;
use crate::domain::{Manifest, FORMAT_VERSION, METADATA_FILE};
use crate::error::ExportResult;
use crate::source::PagePlan;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Build the manifest for a finished plan, stamped with the local wall clock.
pub fn build_manifest(plan: &PagePlan) -> Manifest {
    Manifest {
        total_items: plan.total_items,
        total_pages: plan.total_pages,
        items_per_page: plan.page_size,
        generated_at: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        format_version: FORMAT_VERSION.to_string(),
    }
}

pub fn write_metadata(output_dir: &Path, manifest: &Manifest) -> ExportResult<(PathBuf, u64)> {
    let path = output_dir.join(METADATA_FILE);
    let bytes = write_pretty(&path, manifest)?;
    Ok((path, bytes))
}
