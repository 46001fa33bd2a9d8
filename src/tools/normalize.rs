//! Search payload normalization.
//!
//! Turns the provider's raw SERP JSON into [`SearchRecord`]s and renders
//! them as the bounded text block the model reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One organic search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Result title.
    pub title: String,
    /// Result link.
    pub url: String,
    /// Result snippet.
    pub snippet: String,
}

/// Field names tried in order for each record attribute.
const TITLE_FIELDS: &[&str] = &["title"];
const URL_FIELDS: &[&str] = &["link", "url"];
const SNIPPET_FIELDS: &[&str] = &["description", "snippet"];

fn first_str(item: &Value, fields: &[&str]) -> String {
    fields
        .iter()
        .find_map(|f| item.get(*f).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Extracts organic results from a raw search payload.
///
/// A missing or non-list `organic` field yields no records. Items that are
/// not objects are skipped; missing attributes become empty strings.
#[must_use]
pub fn normalize(raw: &Value) -> Vec<SearchRecord> {
    raw.get("organic")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| SearchRecord {
                    title: first_str(item, TITLE_FIELDS),
                    url: first_str(item, URL_FIELDS),
                    snippet: first_str(item, SNIPPET_FIELDS),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Renders records as blank-line separated blocks, truncated to
/// `max_chars` characters.
#[must_use]
pub fn render(records: &[SearchRecord], max_chars: usize) -> String {
    let text = records
        .iter()
        .map(|r| format!("{}\nLink: {}\nSnippet: {}", r.title, r.url, r.snippet))
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&text, max_chars)
}

/// Keeps at most `max_chars` characters, never splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
