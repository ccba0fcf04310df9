//! Consistency check of an export directory against its manifest.

use crate::domain::{
    page_file_name, parse_page_file_name, Manifest, Page, METADATA_FILE, SEARCH_INDEX_FILE,
};
use anyhow::{Context, Result};
use std::path::Path;

const FACETS: [&str; 5] = ["architects", "years", "categories", "titles", "addresses"];

/// Result of checking one output directory.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub manifest: Option<Manifest>,
    pub pages_checked: usize,
    pub items_seen: usize,
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check that `metadata.json`, the page files and `search_index.json` agree.
///
/// Only an unreadable output directory is an `Err`; every inconsistency is
/// collected into [`VerifyReport::problems`].
pub fn verify_output(output_dir: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    let manifest: Manifest = match read_json(&output_dir.join(METADATA_FILE)) {
        Ok(manifest) => manifest,
        Err(err) => {
            report.problems.push(format!("{METADATA_FILE}: {err:#}"));
            return Ok(report);
        }
    };

    let mut last_id: Option<i64> = None;
    for number in 1..=manifest.total_pages {
        let name = page_file_name(number);
        let page: Page = match read_json(&output_dir.join(&name)) {
            Ok(page) => page,
            Err(err) => {
                report.problems.push(format!("{name}: {err:#}"));
                continue;
            }
        };
        report.pages_checked += 1;
        report.items_seen += page.items.len();
        check_page_header(&name, number, &page, &manifest, &mut report.problems);

        for item in &page.items {
            if let Some(prev) = last_id {
                if item.id <= prev {
                    report.problems.push(format!(
                        "{name}: id {} does not ascend after id {prev}",
                        item.id
                    ));
                }
            }
            last_id = Some(item.id);
        }
    }

    if report.pages_checked == manifest.total_pages && report.items_seen != manifest.total_items {
        report.problems.push(format!(
            "pages hold {} items but manifest says {}",
            report.items_seen, manifest.total_items
        ));
    }

    let entries = std::fs::read_dir(output_dir)
        .with_context(|| format!("Failed to list {}", output_dir.display()))?;
    let mut extra: Vec<usize> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().and_then(parse_page_file_name))
        .filter(|&n| n == 0 || n > manifest.total_pages)
        .collect();
    extra.sort_unstable();
    for n in extra {
        report.problems.push(format!("{}: not listed in manifest", page_file_name(n)));
    }

    match read_json::<serde_json::Value>(&output_dir.join(SEARCH_INDEX_FILE)) {
        Ok(index) => {
            for facet in FACETS {
                if !index.get(facet).is_some_and(serde_json::Value::is_object) {
                    report.problems.push(format!("{SEARCH_INDEX_FILE}: missing facet '{facet}'"));
                }
            }
        }
        Err(err) => report.problems.push(format!("{SEARCH_INDEX_FILE}: {err:#}")),
    }

    report.manifest = Some(manifest);
    Ok(report)
}

fn check_page_header(
    name: &str,
    number: usize,
    page: &Page,
    manifest: &Manifest,
    problems: &mut Vec<String>,
) {
    let checks = [
        ("page", page.page, number),
        ("total_pages", page.total_pages, manifest.total_pages),
        ("items_per_page", page.items_per_page, manifest.items_per_page),
        ("total_items", page.total_items, manifest.total_items),
    ];
    for (field, found, expected) in checks {
        if found != expected {
            problems.push(format!("{name}: {field} is {found}, expected {expected}"));
        }
    }
    if page.items.len() > manifest.items_per_page {
        problems.push(format!(
            "{name}: {} items exceeds items_per_page {}",
            page.items.len(),
            manifest.items_per_page
        ));
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Config;
    use crate::pipeline::run_export;
    use crate::source::tests::fixture_db;
    use std::fs;
    use tempfile::TempDir;

    fn exported(count: i64, page_size: usize) -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().expect("tmp");
        let db = fixture_db(tmp.path(), count);
        let out = tmp.path().join("data");
        run_export(&Config { source_path: db, output_dir: out.clone(), page_size })
            .expect("export");
        (tmp, out)
    }

    #[test]
    fn fresh_export_verifies_clean() {
        let (_tmp, out) = exported(23, 10);
        let report = verify_output(&out).expect("verify");
        assert!(report.is_ok(), "unexpected problems: {:?}", report.problems);
        assert_eq!(report.pages_checked, 3);
        assert_eq!(report.items_seen, 23);
    }

    #[test]
    fn empty_export_verifies_clean() {
        let (_tmp, out) = exported(0, 50);
        let report = verify_output(&out).expect("verify");
        assert!(report.is_ok(), "unexpected problems: {:?}", report.problems);
        assert_eq!(report.pages_checked, 0);
    }

    #[test]
    fn missing_page_is_reported() {
        let (_tmp, out) = exported(23, 10);
        fs::remove_file(out.join("page_2.json")).expect("remove");
        let report = verify_output(&out).expect("verify");
        assert!(report.problems.iter().any(|p| p.starts_with("page_2.json")));
    }

    #[test]
    fn extra_page_is_reported() {
        let (_tmp, out) = exported(5, 10);
        fs::copy(out.join("page_1.json"), out.join("page_2.json")).expect("copy");
        let report = verify_output(&out).expect("verify");
        assert_eq!(report.problems, vec!["page_2.json: not listed in manifest".to_string()]);
    }

    #[test]
    fn missing_manifest_is_reported() {
        let tmp = TempDir::new().expect("tmp");
        let report = verify_output(tmp.path()).expect("verify");
        assert!(!report.is_ok());
        assert!(report.problems[0].starts_with("metadata.json"));
        assert!(report.manifest.is_none());
    }

    #[test]
    fn index_without_facet_is_reported() {
        let (_tmp, out) = exported(3, 10);
        fs::write(out.join("search_index.json"), r#"{"architects":{}}"#).expect("write");
        let report = verify_output(&out).expect("verify");
        assert_eq!(report.problems.len(), 4);
        assert!(report.problems.iter().all(|p| p.contains("missing facet")));
    }
}
