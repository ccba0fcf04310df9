//! Utility functions

pub mod format;

pub use format::{format_megabytes, format_with_commas, json_output_size};
