//! Search index writer.

use super::write_compact;
use crate::domain::SEARCH_INDEX_FILE;
use crate::error::ExportResult;
use crate::index::SearchIndex;
use std::path::{Path, PathBuf};

pub fn write_search_index(output_dir: &Path, index: &SearchIndex) -> ExportResult<(PathBuf, u64)> {
    let path = output_dir.join(SEARCH_INDEX_FILE);
    let bytes = write_compact(&path, index)?;
    Ok((path, bytes))
}
