//! Raw row to output record mapping.

use crate::domain::{RawRecord, Record, UNKNOWN_ADDRESS, UNKNOWN_ARCHITECT, UNKNOWN_TITLE};
use rusqlite::types::Value;

/// Map a raw row to a [`Record`], filling placeholders for missing
/// title/architect/address and dropping non-positive years.
///
/// Never fails: a column holding an unexpected storage class is rendered,
/// not rejected.
pub fn normalize(raw: RawRecord) -> Record {
    Record {
        id: raw.id,
        title: or_placeholder(raw.title, UNKNOWN_TITLE),
        architect: or_placeholder(raw.architect, UNKNOWN_ARCHITECT),
        year: raw.year.as_ref().and_then(positive_year),
        address: or_placeholder(raw.address, UNKNOWN_ADDRESS),
        latitude: pass_through(raw.latitude),
        longitude: pass_through(raw.longitude),
        category: pass_through(raw.category),
        big_category: pass_through(raw.big_category),
        description: pass_through(raw.description),
        image_url: pass_through(raw.image_url),
        tags: pass_through(raw.tags),
        prefecture: pass_through(raw.prefecture),
        contractor: pass_through(raw.contractor),
        structural_designer: pass_through(raw.structural_designer),
        landscape_designer: pass_through(raw.landscape_designer),
        shinkenchiku_url: pass_through(raw.shinkenchiku_url),
    }
}

fn or_placeholder(value: Option<Value>, placeholder: &str) -> String {
    match value.and_then(as_text) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder.to_string(),
    }
}

/// Text rendering of a column; numbers are formatted, blobs decoded lossily.
fn as_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// The stored value in its JSON form. Non-finite reals have no JSON form and become null.
fn pass_through(value: Option<Value>) -> serde_json::Value {
    match value {
        None | Some(Value::Null) => serde_json::Value::Null,
        Some(Value::Integer(i)) => i.into(),
        Some(Value::Real(f)) => {
            serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
        }
        Some(Value::Text(s)) => s.into(),
        Some(Value::Blob(bytes)) => String::from_utf8_lossy(&bytes).into_owned().into(),
    }
}

fn positive_year(value: &Value) -> Option<i64> {
    match *value {
        Value::Integer(year) if year > 0 => Some(year),
        // Core Data occasionally stores whole numbers as REAL.
        Value::Real(year) if year > 0.0 && year.fract() == 0.0 && year <= i64::MAX as f64 => {
            Some(year as i64)
        }
        _ => None,
    }
}
