//! The synchronized dashboard document.
//!
//! [`Document`] is the whole state that gets persisted: four link sections
//! and a curated news list.  The JSON shape matches what the remote endpoint
//! stores, so field names are camelCase on the wire.
//!
//! ## For contributors
//!
//! Every change to the document goes through an [`Edit`] applied by
//! [`crate::sync::SyncController::update`].  To add a new kind of change:
//!
//! 1. Add a variant to [`Edit`].
//! 2. Handle it in [`Edit::apply`].
//! 3. Emit it from [`crate::input`].

mod defaults;
mod migrate;

pub use migrate::migrate;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named shortcut.  Links carry no id: list position is their identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub name: String,
    pub url: String,
}

impl LinkItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One row of the curated news table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Unique within the list, assigned once at creation.
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub category: String,
}

impl NewsItem {
    /// Build a new entry as the add form submits it.
    ///
    /// The id is the current wall clock in milliseconds.  Blank `source` and
    /// `category` fall back to `"Unknown"` and `"General"`.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: &str,
        date: impl Into<String>,
        category: &str,
    ) -> Self {
        let or = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            id: Local::now().timestamp_millis().to_string(),
            title: title.into(),
            url: url.into(),
            source: or(source, "Unknown"),
            date: date.into(),
            category: or(category, "General"),
        }
    }
}

/// The four link sections.  They are identical in shape and differ only in
/// where the UI shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSection {
    Dev,
    Chat,
    App,
    Google,
}

impl LinkSection {
    pub const ALL: [LinkSection; 4] = [Self::Dev, Self::Chat, Self::App, Self::Google];

    pub fn title(self) -> &'static str {
        match self {
            Self::Dev => "Dev",
            Self::Chat => "Chat",
            Self::App => "Apps",
            Self::Google => "Google",
        }
    }
}

/// The entire synchronized state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub dev_links: Vec<LinkItem>,
    pub chat_links: Vec<LinkItem>,
    pub app_links: Vec<LinkItem>,
    pub google_links: Vec<LinkItem>,
    pub news: Vec<NewsItem>,
    /// Top-level fields we don't understand.  Kept so that writing the
    /// document back never drops data another client put there.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            dev_links: defaults::dev_links(),
            chat_links: defaults::chat_links(),
            app_links: defaults::app_links(),
            google_links: defaults::google_links(),
            news: defaults::news(),
            extra: Map::new(),
        }
    }
}

impl Document {
    pub fn links(&self, section: LinkSection) -> &[LinkItem] {
        match section {
            LinkSection::Dev => &self.dev_links,
            LinkSection::Chat => &self.chat_links,
            LinkSection::App => &self.app_links,
            LinkSection::Google => &self.google_links,
        }
    }

    pub fn links_mut(&mut self, section: LinkSection) -> &mut Vec<LinkItem> {
        match section {
            LinkSection::Dev => &mut self.dev_links,
            LinkSection::Chat => &mut self.chat_links,
            LinkSection::App => &mut self.app_links,
            LinkSection::Google => &mut self.google_links,
        }
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// A single user-level change to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    AddLink { section: LinkSection, item: LinkItem },
    /// Remove the link at `index`, but only if it is still `item`.  The
    /// index came from a snapshot that a background load may have replaced.
    RemoveLink {
        section: LinkSection,
        index: usize,
        item: LinkItem,
    },
    AddNews(NewsItem),
    RemoveNews { id: String },
}

impl Edit {
    /// Apply the edit in place.  Removing something that isn't there is a
    /// no-op.
    pub fn apply(self, doc: &mut Document) {
        match self {
            Edit::AddLink { section, item } => doc.links_mut(section).push(item),
            Edit::RemoveLink {
                section,
                index,
                item,
            } => {
                let links = doc.links_mut(section);
                if links.get(index) == Some(&item) {
                    // `remove` shifts the tail, keeping relative order.
                    links.remove(index);
                }
            }
            Edit::AddNews(item) => doc.news.push(item),
            Edit::RemoveNews { id } => doc.news.retain(|n| n.id != id),
        }
    }
}

/// Today's date in the format news entries use.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(links: &[LinkItem]) -> Vec<&str> {
        links.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn default_document_is_fully_populated() {
        let doc = Document::default();
        for section in LinkSection::ALL {
            assert!(!doc.links(section).is_empty(), "{section:?} should have defaults");
        }
        assert_eq!(doc.news.len(), 4);
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn add_link_appends_at_end() {
        let mut doc = Document::default();
        Edit::AddLink {
            section: LinkSection::Dev,
            item: LinkItem::new("Test", "test.com"),
        }
        .apply(&mut doc);

        assert_eq!(doc.dev_links.last(), Some(&LinkItem::new("Test", "test.com")));
        assert_eq!(doc.dev_links.len(), 4);
    }

    #[test]
    fn remove_link_preserves_order_of_the_rest() {
        let mut doc = Document::default();
        Edit::RemoveLink {
            section: LinkSection::Google,
            index: 1,
            item: LinkItem::new("Calendar", "https://calendar.google.com"),
        }
        .apply(&mut doc);

        assert_eq!(names(&doc.google_links), vec!["Gmail", "Drive", "Meet"]);
    }

    #[test]
    fn remove_link_skips_when_entry_at_index_changed() {
        let mut doc = Document::default();
        doc.google_links.remove(0);
        let before = doc.clone();

        // Index 1 was Calendar in the snapshot; it now holds Drive.
        Edit::RemoveLink {
            section: LinkSection::Google,
            index: 1,
            item: LinkItem::new("Calendar", "https://calendar.google.com"),
        }
        .apply(&mut doc);

        assert_eq!(doc, before);
    }

    #[test]
    fn remove_link_out_of_range_is_noop() {
        let mut doc = Document::default();
        let before = doc.clone();
        Edit::RemoveLink {
            section: LinkSection::Chat,
            index: 99,
            item: LinkItem::new("ChatGPT", "https://chat.openai.com"),
        }
        .apply(&mut doc);
        assert_eq!(doc, before);
    }

    #[test]
    fn remove_news_by_id() {
        let mut doc = Document::default();
        Edit::RemoveNews { id: "2".into() }.apply(&mut doc);

        let ids: Vec<&str> = doc.news.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);

        Edit::RemoveNews { id: "nope".into() }.apply(&mut doc);
        assert_eq!(doc.news.len(), 3);
    }

    #[test]
    fn new_news_item_fills_blank_source_and_category() {
        let item = NewsItem::new("Title", "https://example.com", "  ", "2025-01-01", "");
        assert_eq!(item.source, "Unknown");
        assert_eq!(item.category, "General");
        assert!(item.id.parse::<i64>().is_ok(), "id is a millisecond timestamp");
    }

    #[test]
    fn add_news_appends() {
        let mut doc = Document::default();
        let item = NewsItem::new("T", "u", "S", "2025-01-01", "C");
        Edit::AddNews(item.clone()).apply(&mut doc);
        assert_eq!(doc.news.last(), Some(&item));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let value = serde_json::to_value(Document::default()).unwrap();
        for key in ["devLinks", "chatLinks", "appLinks", "googleLinks", "news"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn json_round_trip_keeps_unknown_fields() {
        let mut doc = Document::default();
        doc.extra.insert("habits".into(), json!({"coding": [1, 2, 3]}));

        let text = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn today_is_iso_date() {
        let today = today();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
