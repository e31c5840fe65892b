//! Built-in content for a fresh dashboard.

use super::{LinkItem, NewsItem};

pub fn dev_links() -> Vec<LinkItem> {
    vec![
        LinkItem::new("GitHub", "https://github.com"),
        LinkItem::new("Supabase", "https://supabase.com"),
        LinkItem::new("Vercel", "https://vercel.com"),
    ]
}

pub fn chat_links() -> Vec<LinkItem> {
    vec![
        LinkItem::new("ChatGPT", "https://chat.openai.com"),
        LinkItem::new("Gemini", "https://gemini.google.com"),
        LinkItem::new("Claude", "https://claude.ai"),
    ]
}

pub fn app_links() -> Vec<LinkItem> {
    vec![
        LinkItem::new("Figma", "https://figma.com"),
        LinkItem::new("Trello", "https://trello.com"),
        LinkItem::new("Spotify", "https://spotify.com"),
    ]
}

pub fn google_links() -> Vec<LinkItem> {
    vec![
        LinkItem::new("Gmail", "https://gmail.com"),
        LinkItem::new("Calendar", "https://calendar.google.com"),
        LinkItem::new("Drive", "https://drive.google.com"),
        LinkItem::new("Meet", "https://meet.google.com"),
    ]
}

pub fn news() -> Vec<NewsItem> {
    let item = |id: &str, title: &str, url: &str, source: &str, date: &str, category: &str| {
        NewsItem {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            source: source.into(),
            date: date.into(),
            category: category.into(),
        }
    };

    vec![
        item(
            "1",
            "The Future of AI Software Development",
            "https://news.ycombinator.com",
            "Hacker News",
            "2024-03-21",
            "Tech",
        ),
        item(
            "2",
            "NVIDIA announces new Blackwell GPU architecture",
            "https://www.theverge.com",
            "The Verge",
            "2024-03-20",
            "Hardware",
        ),
        item(
            "3",
            "Global markets rally ahead of Fed meeting",
            "https://www.reuters.com",
            "Reuters",
            "2024-03-19",
            "Finance",
        ),
        item(
            "4",
            "SpaceX Starship reaches orbit for the first time",
            "https://techcrunch.com",
            "TechCrunch",
            "2024-03-18",
            "Space",
        ),
    ]
}
