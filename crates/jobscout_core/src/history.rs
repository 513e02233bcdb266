use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::null_as_default;

pub const HISTORY_PAGE_SIZE: usize = 5;

/// A previously submitted scrape request, as listed by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeHistoryEntry {
    pub public_id: Option<String>,
    pub query: Option<String>,
    pub location: Option<String>,
    pub max_pages: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub profile_keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Free-form options; values may be any JSON type.
    #[serde(deserialize_with = "null_as_default")]
    pub custom_options: BTreeMap<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub enable_auto_learning: bool,
    pub description: Option<String>,
    pub platform_id: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    /// RFC 3339 timestamp.
    pub created: Option<String>,
}

impl ScrapeHistoryEntry {
    /// `"key: value, ..."` rendering of the custom options, sorted by key.
    /// String values appear without quotes; anything else as compact JSON.
    pub fn custom_options_label(&self) -> Option<String> {
        if self.custom_options.is_empty() {
            return None;
        }
        Some(
            self.custom_options
                .iter()
                .map(|(key, value)| match value {
                    Value::String(text) => format!("{key}: {text}"),
                    other => format!("{key}: {other}"),
                })
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage<'a, T> {
    pub entries: &'a [T],
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
}

impl<T> HistoryPage<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slices `entries` into 1-based pages; out-of-range pages are clamped.
/// An empty list yields a single empty page.
pub fn paginate<T>(entries: &[T], page: usize, page_size: usize) -> HistoryPage<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = entries.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(entries.len());
    HistoryPage {
        entries: &entries[start.min(end)..end],
        page,
        total_pages,
    }
}
