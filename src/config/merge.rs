//! CLI override merging.

use crate::domain::Config;
use crate::error::{ExportError, ExportResult};
use std::path::PathBuf;

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub page_size: Option<usize>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> ExportResult<Config> {
    if let Some(source_path) = cli.source_path {
        config.source_path = source_path;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }

    if config.page_size == 0 {
        return Err(ExportError::Config("page_size must be > 0".to_string()));
    }
    Ok(config)
}
