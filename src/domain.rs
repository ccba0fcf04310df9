//! Core data types shared by the export pipeline.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manifest format version written to `metadata.json`.
pub const FORMAT_VERSION: &str = "1.0";

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_SOURCE_PATH: &str = "public/db/archimap.sqlite3";
pub const DEFAULT_OUTPUT_DIR: &str = "public/data";

/// Substituted for a missing building title ("unknown building").
pub const UNKNOWN_TITLE: &str = "不明な建築物";
/// Substituted for a missing architect ("unknown architect").
pub const UNKNOWN_ARCHITECT: &str = "不明な建築家";
/// Substituted for a missing address ("unknown address").
pub const UNKNOWN_ADDRESS: &str = "住所不明";

pub const PAGE_FILE_PREFIX: &str = "page_";
pub const SEARCH_INDEX_FILE: &str = "search_index.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Resolved export settings (CLI > config file > defaults).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One row of `ZCDARCHITECTURE` as read from the database, before normalization.
///
/// Columns keep whatever storage class SQLite returned; SQLite does not
/// enforce declared column types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: i64,
    pub title: Option<Value>,
    pub architect: Option<Value>,
    pub year: Option<Value>,
    pub address: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub category: Option<Value>,
    pub big_category: Option<Value>,
    pub description: Option<Value>,
    pub image_url: Option<Value>,
    pub tags: Option<Value>,
    pub prefecture: Option<Value>,
    pub contractor: Option<Value>,
    pub structural_designer: Option<Value>,
    pub landscape_designer: Option<Value>,
    pub shinkenchiku_url: Option<Value>,
}

/// A normalized building record as it appears in page files.
///
/// Field order here is the key order in the emitted JSON. Pass-through
/// columns carry the stored value as-is, so a TEXT latitude stays a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub architect: String,
    pub year: Option<i64>,
    pub address: String,
    pub latitude: serde_json::Value,
    pub longitude: serde_json::Value,
    pub category: serde_json::Value,
    pub big_category: serde_json::Value,
    pub description: serde_json::Value,
    pub image_url: serde_json::Value,
    pub tags: serde_json::Value,
    pub prefecture: serde_json::Value,
    pub contractor: serde_json::Value,
    pub structural_designer: serde_json::Value,
    pub landscape_designer: serde_json::Value,
    pub shinkenchiku_url: serde_json::Value,
}

/// Contents of one `page_<n>.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub items: Vec<Record>,
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub total_items: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    pub generated_at: String,
    pub format_version: String,
}

/// File name for a 1-based page number.
pub fn page_file_name(page: usize) -> String {
    format!("{PAGE_FILE_PREFIX}{page}.json")
}

/// Parse the page number out of a `page_<n>.json` file name.
pub fn parse_page_file_name(name: &str) -> Option<usize> {
    name.strip_prefix(PAGE_FILE_PREFIX)?.strip_suffix(".json")?.parse().ok()
}
