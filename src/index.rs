//! Five-facet lexical search index.
//!
//! Each facet maps a lower-cased key to the ids of the records filed under it,
//! in the order the records were added. Ids are not deduplicated; lookups only
//! test membership.

use crate::domain::{Record, UNKNOWN_ADDRESS, UNKNOWN_ARCHITECT, UNKNOWN_TITLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TITLE_PREFIX_CHARS: usize = 3;
pub const TITLE_MIN_TOKEN_CHARS: usize = 2;
pub const ADDRESS_PREFIX_CHARS: usize = 5;

pub type Facet = BTreeMap<String, Vec<i64>>;

/// Serialized as `search_index.json`; field order is the key order on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub architects: Facet,
    pub years: Facet,
    pub categories: Facet,
    pub titles: Facet,
    pub addresses: Facet,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `record` under every facet key it produces.
    pub fn add(&mut self, record: &Record) {
        let id = record.id;

        if record.architect != UNKNOWN_ARCHITECT {
            push(&mut self.architects, record.architect.to_lowercase(), id);
        }

        if let Some(year) = record.year {
            push(&mut self.years, year.to_string(), id);
        }

        // The title placeholder is left out like the other placeholders, so
        // untitled records never share a "不明な" key.
        if record.title != UNKNOWN_TITLE {
            for key in title_keys(&record.title) {
                push(&mut self.titles, key, id);
            }
        }

        if let Some(category) = record.category.as_str().filter(|c| !c.is_empty()) {
            push(&mut self.categories, category.to_lowercase(), id);
        }

        if record.address != UNKNOWN_ADDRESS {
            let key = char_prefix(&record.address.to_lowercase(), ADDRESS_PREFIX_CHARS);
            push(&mut self.addresses, key, id);
        }
    }

    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
        for record in records {
            self.add(record);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facets().iter().all(|(_, facet)| facet.is_empty())
    }

    /// Facets with their on-disk names.
    pub fn facets(&self) -> [(&'static str, &Facet); 5] {
        [
            ("architects", &self.architects),
            ("years", &self.years),
            ("categories", &self.categories),
            ("titles", &self.titles),
            ("addresses", &self.addresses),
        ]
    }

    /// Number of distinct keys across all facets.
    pub fn key_count(&self) -> usize {
        self.facets().iter().map(|(_, facet)| facet.len()).sum()
    }
}

fn push(facet: &mut Facet, key: String, id: i64) {
    facet.entry(key).or_default().push(id);
}

/// Title keys: the leading characters of each sufficiently long whitespace token.
fn title_keys(title: &str) -> Vec<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() >= TITLE_MIN_TOKEN_CHARS)
        .map(|token| char_prefix(token, TITLE_PREFIX_CHARS))
        .collect()
}

fn char_prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
