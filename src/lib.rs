//! archimap-export: export the architecture database for static loading
//!
//! Reads the `ZCDARCHITECTURE` table of a SQLite database and writes, into
//! one output directory:
//!
//! - `page_<n>.json`: fixed-size pages of normalized records in id order
//! - `search_index.json`: a five-facet lexical index (architect, year,
//!   title prefix, category, address prefix)
//! - `metadata.json`: counts, page size, generation time, format version

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod utils;
pub mod verify;

pub use domain::{Config, Manifest, Page, Record};
pub use error::{ExportError, ExportResult};
pub use index::SearchIndex;
pub use pipeline::{run_export, ExportRun, ExportSummary, RunError, Stage};
