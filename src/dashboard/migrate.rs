//! Normalisation of whatever JSON we were handed into a [`Document`].
//!
//! [`migrate`] is total: it never fails and never performs I/O.  Fields that
//! are missing or malformed keep their default value, everything else is
//! taken from the input, and unknown top-level fields ride along in
//! [`Document::extra`].
//!
//! ## Supporting another historical layout
//!
//! Add a variant to [`LegacyLayout`], recognise it in
//! [`LegacyLayout::detect`] and convert it in [`LegacyLayout::apply`].  Keep
//! the conversion pure so `migrate` stays idempotent.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{today, Document, NewsItem};

/// Top-level keys that map onto [`Document`] fields.
const CANONICAL_FIELDS: [&str; 5] = ["devLinks", "chatLinks", "appLinks", "googleLinks", "news"];

/// Source label given to news entries converted from saved bookmarks.
const BOOKMARK_SOURCE: &str = "Saved Link";
const UNTITLED: &str = "Untitled";
const DEFAULT_CATEGORY: &str = "General";

/// Map an arbitrary JSON value onto the canonical document shape.
pub fn migrate(raw: &Value) -> Document {
    let mut doc = Document::default();
    let Some(fields) = raw.as_object() else {
        debug!("migrate: input is not an object, using defaults");
        return doc;
    };

    adopt(fields, "devLinks", &mut doc.dev_links);
    adopt(fields, "chatLinks", &mut doc.chat_links);
    adopt(fields, "appLinks", &mut doc.app_links);
    adopt(fields, "googleLinks", &mut doc.google_links);
    adopt(fields, "news", &mut doc.news);

    if let Some(legacy) = LegacyLayout::detect(fields) {
        legacy.apply(&mut doc);
    }

    doc.extra = fields
        .iter()
        .filter(|(key, _)| !CANONICAL_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    doc
}

/// Overwrite `slot` with `fields[key]` if it is present and decodes.
fn adopt<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = fields.get(key) else {
        return;
    };
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => *slot = decoded,
        Err(e) => warn!("migrate: ignoring malformed `{key}`: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Legacy layouts
// ---------------------------------------------------------------------------

/// Historical document layouts that need converting.
#[derive(Debug)]
enum LegacyLayout<'a> {
    /// Before the news table existed the dashboard kept a `bookmarks` list of
    /// `{ id?, name, url, tags }` records.
    Bookmarks(&'a [Value]),
}

impl<'a> LegacyLayout<'a> {
    fn detect(fields: &'a Map<String, Value>) -> Option<Self> {
        let has_news = fields.get("news").is_some_and(|news| !news.is_null());
        if has_news {
            return None;
        }
        let bookmarks = fields.get("bookmarks")?.as_array()?;
        Some(Self::Bookmarks(bookmarks))
    }

    fn apply(self, doc: &mut Document) {
        match self {
            Self::Bookmarks(bookmarks) => {
                debug!("migrate: converting {} legacy bookmarks", bookmarks.len());
                let date = today();
                doc.news = bookmarks
                    .iter()
                    .enumerate()
                    .map(|(index, bookmark)| bookmark_to_news(index, bookmark, &date))
                    .collect();
            }
        }
    }
}

fn bookmark_to_news(index: usize, bookmark: &Value, date: &str) -> NewsItem {
    let text = |key: &str| {
        bookmark
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let id = match bookmark.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => index.to_string(),
    };

    let category = bookmark
        .get("tags")
        .and_then(Value::as_array)
        .and_then(|tags| tags.first())
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    NewsItem {
        id,
        title: text("name").unwrap_or_else(|| UNTITLED.to_string()),
        url: text("url").unwrap_or_default(),
        source: BOOKMARK_SOURCE.to_string(),
        date: date.to_string(),
        category,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
