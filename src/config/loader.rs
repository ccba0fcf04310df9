//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Section name accepted for nested configs (`[archimap-export]`).
const SECTION: &str = "archimap-export";

/// Load the export config.
///
/// An explicit `config_path` must parse; a file auto-discovered in
/// `search_dir` that fails to parse is warned about and ignored.
pub fn load_config(search_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(search_dir),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => {
            tracing::debug!(path = %config_file.display(), "loaded config");
            Ok(cfg)
        }
        Err(e) if !config_path_provided => {
            tracing::warn!(
                "Failed to parse auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

/// Parse TOML config, either flat or nested under `[archimap-export]`.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = if let Some(nested) = raw.get(SECTION) { nested.clone() } else { raw };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, either flat or nested under `archimap-export:`.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let config_val = if let Some(nested) = raw.get(SECTION) {
        nested.clone()
    } else if raw.is_null() {
        // An empty YAML document parses as null.
        return Ok(Config::default());
    } else {
        raw
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    let candidates = [
        "archimap-export.toml",
        ".archimap-export.toml",
        "archimap-export.yml",
        "archimap-export.yaml",
    ];

    candidates.iter().map(|candidate| search_dir.join(candidate)).find(|path| path.exists())
}
