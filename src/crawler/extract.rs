//! Reference extraction
//!
//! Finds every item id embedded in a payload. A candidate must be exactly 32
//! alphanumerics sitting directly between quote or slash characters, so ids
//! inside JSON strings and URL paths are found while words in prose are not.

use crate::catalog::{ItemId, ItemPayloads};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A delimiter, 32 alphanumerics, a delimiter
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["'/][a-zA-Z0-9]{32}["'/]"#).expect("id pattern is a valid regex")
});

/// Extracts the ids referenced by a payload
///
/// An absent or null payload has no references.
///
/// # Example
///
/// ```
/// use catalog_relations::crawler::extract_reference_ids;
/// use serde_json::json;
///
/// let payload = json!({ "itemId": "0123456789abcdef0123456789abcdef" });
/// let ids = extract_reference_ids(Some(&payload));
/// assert_eq!(ids.len(), 1);
/// ```
pub fn extract_reference_ids(payload: Option<&Value>) -> BTreeSet<ItemId> {
    let mut ids = BTreeSet::new();
    if let Some(value) = payload {
        collect_ids(value, &mut ids);
    }
    ids
}

/// Union of the ids referenced by both payloads of an item
pub fn extract_from_payloads(payloads: &ItemPayloads) -> BTreeSet<ItemId> {
    let mut ids = extract_reference_ids(payloads.primary.as_ref());
    ids.extend(extract_reference_ids(payloads.secondary.as_ref()));
    ids
}

/// Scans text for delimited ids
///
/// A closing delimiter may also open the next id (`/id1/id2/`).
pub fn find_ids(text: &str) -> BTreeSet<ItemId> {
    let mut ids = BTreeSet::new();
    let mut pos = 0;

    while let Some(m) = ID_PATTERN.find_at(text, pos) {
        // Delimiters are single-byte ASCII
        let candidate = &text[m.start() + 1..m.end() - 1];
        if let Ok(id) = ItemId::parse(candidate) {
            ids.insert(id);
        }
        pos = m.end() - 1;
    }

    ids
}

/// Scans every string and object key in `value`
///
/// Strings are scanned unescaped and wrapped in quotes, so an id that fills a
/// whole value is delimited and quotes inside HTML or embedded JSON still act
/// as delimiters.
fn collect_ids(value: &Value, ids: &mut BTreeSet<ItemId>) {
    match value {
        Value::String(text) => ids.extend(find_ids(&quoted(text))),
        Value::Array(values) => {
            for value in values {
                collect_ids(value, ids);
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                ids.extend(find_ids(&quoted(key)));
                collect_ids(value, ids);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text)
}
