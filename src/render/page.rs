//! Page file writer.

use super::write_compact;
use crate::domain::{page_file_name, parse_page_file_name, Page};
use crate::error::{ExportError, ExportResult};
use std::path::{Path, PathBuf};

/// Write `page_<n>.json` into `output_dir`, replacing any previous file.
///
/// Returns the written path and its size in bytes.
pub fn write_page(output_dir: &Path, page: &Page) -> ExportResult<(PathBuf, u64)> {
    let path = output_dir.join(page_file_name(page.page));
    let bytes = write_compact(&path, page)?;
    Ok((path, bytes))
}

/// Delete `page_<n>.json` files with `n > total_pages` left behind by an
/// earlier, larger export. Returns the removed page numbers in ascending order.
pub fn prune_stale_pages(output_dir: &Path, total_pages: usize) -> ExportResult<Vec<usize>> {
    let entries = std::fs::read_dir(output_dir).map_err(|e| ExportError::write(output_dir, e))?;
    let mut stale = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExportError::write(output_dir, e))?;
        let name = entry.file_name();
        let Some(number) = name.to_str().and_then(parse_page_file_name) else {
            continue;
        };
        if number > total_pages {
            stale.push((number, entry.path()));
        }
    }
    stale.sort();

    for (_, path) in &stale {
        std::fs::remove_file(path).map_err(|e| ExportError::write(path, e))?;
        tracing::debug!(path = %path.display(), "removed stale page file");
    }
    Ok(stale.into_iter().map(|(number, _)| number).collect())
}
