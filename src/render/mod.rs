//! Output file writers (pages, search index, manifest)

pub mod metadata;
pub mod page;
pub mod search_index;

pub use metadata::{build_manifest, write_metadata};
pub use page::{prune_stale_pages, write_page};
pub use search_index::write_search_index;

use crate::error::{ExportError, ExportResult};
use serde::Serialize;
use std::path::Path;

/// Compact encoding: no whitespace between tokens, non-ASCII left as UTF-8.
pub(crate) fn write_compact<T: Serialize>(path: &Path, value: &T) -> ExportResult<u64> {
    let bytes = serde_json::to_vec(value)
        .map_err(|source| ExportError::Serialize { path: path.to_path_buf(), source })?;
    write_bytes(path, &bytes)
}

/// Two-space indented encoding.
pub(crate) fn write_pretty<T: Serialize>(path: &Path, value: &T) -> ExportResult<u64> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|source| ExportError::Serialize { path: path.to_path_buf(), source })?;
    write_bytes(path, &bytes)
}

fn write_bytes(path: &Path, bytes: &[u8]) -> ExportResult<u64> {
    std::fs::write(path, bytes).map_err(|e| ExportError::write(path, e))?;
    Ok(bytes.len() as u64)
}
