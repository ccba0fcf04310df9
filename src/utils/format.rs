//! Human-readable numbers for the run summary.

use std::io;
use std::path::Path;

/// Format an integer with thousands separators (`12345` -> `12,345`).
pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Bytes as megabytes with one decimal place.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Total size of every `*.json` file directly inside `dir`.
pub fn json_output_size(dir: &Path) -> io::Result<u64> {
    let mut total = 0u64;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") && entry.file_type()?.is_file()
        {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}
