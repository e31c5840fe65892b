use ratatui::widgets::{ListState, TableState};

use crate::dashboard::{today, Document, Edit, LinkItem, LinkSection, NewsItem};
use crate::sync::SyncStatus;

/// Something the event loop must hand to the sync controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit(Edit),
    SaveNow,
    /// Switch to this remote URL (empty for local-only), then save.
    Connect(String),
    /// Open this address in the system browser.
    Open(String),
}

/// A focusable region of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Links(LinkSection),
    News,
}

impl Pane {
    const ORDER: [Pane; 5] = [
        Pane::Links(LinkSection::Dev),
        Pane::Links(LinkSection::Chat),
        Pane::Links(LinkSection::App),
        Pane::Links(LinkSection::Google),
        Pane::News,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

// ---------------------------------------------------------------------------
// Input forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddLink(LinkSection),
    AddNews,
    Connect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// A small modal form: a list of labelled text fields, one active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub active: usize,
}

impl Form {
    fn add_link(section: LinkSection) -> Self {
        Self {
            kind: FormKind::AddLink(section),
            fields: vec![Field::new("Name", ""), Field::new("URL", "")],
            active: 0,
        }
    }

    fn add_news() -> Self {
        Self {
            kind: FormKind::AddNews,
            fields: vec![
                Field::new("Title", ""),
                Field::new("URL", ""),
                Field::new("Source", ""),
                Field::new("Date", today()),
                Field::new("Category", ""),
            ],
            active: 0,
        }
    }

    fn connect(current_url: &str) -> Self {
        Self {
            kind: FormKind::Connect,
            fields: vec![Field::new("Remote URL", current_url)],
            active: 0,
        }
    }

    pub fn title(&self) -> String {
        match self.kind {
            FormKind::AddLink(section) => format!(" Add {} link ", section.title()),
            FormKind::AddNews => " Add news ".to_string(),
            FormKind::Connect => " Connect remote store (empty = local only) ".to_string(),
        }
    }

    pub fn push(&mut self, c: char) {
        self.fields[self.active].value.push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.active].value.pop();
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub fn previous_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    fn on_last_field(&self) -> bool {
        self.active + 1 == self.fields.len()
    }

    fn value(&self, index: usize) -> &str {
        self.fields[index].value.trim()
    }

    /// Turn the filled-in form into an action.  `None` when a required field
    /// is blank.
    fn submit(&self) -> Option<Action> {
        match self.kind {
            FormKind::AddLink(section) => {
                let (name, url) = (self.value(0), self.value(1));
                if name.is_empty() || url.is_empty() {
                    return None;
                }
                Some(Action::Edit(Edit::AddLink {
                    section,
                    item: LinkItem::new(name, url),
                }))
            }
            FormKind::AddNews => {
                let (title, url) = (self.value(0), self.value(1));
                if title.is_empty() || url.is_empty() {
                    return None;
                }
                let item = NewsItem::new(title, url, self.value(2), self.value(3), self.value(4));
                Some(Action::Edit(Edit::AddNews(item)))
            }
            FormKind::Connect => Some(Action::Connect(self.value(0).to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub struct App {
    /// Latest snapshot of the synchronized document.
    pub doc: Document,
    /// Latest snapshot of the sync flags.
    pub status: SyncStatus,
    /// Configured remote URL; empty in local-only mode.
    pub url: String,
    pub focus: Pane,
    /// Selection per link section, in [`LinkSection::ALL`] order.
    pub link_states: [ListState; 4],
    pub news_state: TableState,
    /// Open modal form, if any.  While set, keys go to the form.
    pub form: Option<Form>,
    /// Whether the user has requested to quit.
    pub quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            doc: Document::default(),
            status: SyncStatus::default(),
            url: String::new(),
            focus: Pane::Links(LinkSection::Dev),
            link_states: Default::default(),
            news_state: TableState::default(),
            form: None,
            quit: false,
        }
    }

    /// Take a fresh snapshot from the sync controller.  Selections that now
    /// point past the end are pulled back.
    pub fn refresh(&mut self, doc: Document, status: SyncStatus, url: String) {
        self.doc = doc;
        self.status = status;
        self.url = url;

        for section in LinkSection::ALL {
            let len = self.doc.links(section).len();
            clamp(&mut self.link_states[section_index(section)], len);
        }
        let len = self.doc.news.len();
        let selected = self.news_state.selected();
        self.news_state.select(clamp_index(selected, len));
    }

    // -- focus & navigation --------------------------------------------------

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Pane::Links(section) => self.doc.links(section).len(),
            Pane::News => self.doc.news.len(),
        }
    }

    pub fn selected(&self) -> Option<usize> {
        match self.focus {
            Pane::Links(section) => self.link_states[section_index(section)].selected(),
            Pane::News => self.news_state.selected(),
        }
    }

    fn select(&mut self, index: Option<usize>) {
        match self.focus {
            Pane::Links(section) => self.link_states[section_index(section)].select(index),
            Pane::News => self.news_state.select(index),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let i = match self.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.focused_len() == 0 {
            return;
        }
        let i = match self.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.focused_len() > 0 {
            self.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.focused_len();
        if len > 0 {
            self.select(Some(len - 1));
        }
    }

    // -- actions -------------------------------------------------------------

    /// The address behind the selection in the focused pane, ready for a
    /// browser.
    pub fn open_selected(&self) -> Option<Action> {
        let index = self.selected()?;
        let url = match self.focus {
            Pane::Links(section) => &self.doc.links(section).get(index)?.url,
            Pane::News => &self.doc.news.get(index)?.url,
        };
        browser_url(url).map(Action::Open)
    }

    /// Remove whatever is selected in the focused pane.
    pub fn delete_selected(&self) -> Option<Action> {
        let index = self.selected()?;
        let edit = match self.focus {
            Pane::Links(section) => Edit::RemoveLink {
                section,
                index,
                item: self.doc.links(section).get(index)?.clone(),
            },
            Pane::News => Edit::RemoveNews {
                id: self.doc.news.get(index)?.id.clone(),
            },
        };
        Some(Action::Edit(edit))
    }

    pub fn open_add_form(&mut self) {
        self.form = Some(match self.focus {
            Pane::Links(section) => Form::add_link(section),
            Pane::News => Form::add_news(),
        });
    }

    pub fn open_connect_form(&mut self) {
        self.form = Some(Form::connect(&self.url));
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Enter in a form: advance to the next field, or submit on the last one.
    /// An incomplete form stays open.
    pub fn form_enter(&mut self) -> Option<Action> {
        let form = self.form.as_mut()?;
        if !form.on_last_field() {
            form.next_field();
            return None;
        }
        let action = form.submit()?;
        self.form = None;
        Some(action)
    }
}

/// Bare hosts such as `x.com` get an `https://` scheme.  Blank is `None`.
fn browser_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        None
    } else if url.contains("://") || url.starts_with("mailto:") {
        Some(url.to_string())
    } else {
        Some(format!("https://{url}"))
    }
}

fn section_index(section: LinkSection) -> usize {
    LinkSection::ALL
        .iter()
        .position(|s| *s == section)
        .unwrap_or(0)
}

fn clamp_index(selected: Option<usize>, len: usize) -> Option<usize> {
    match selected {
        _ if len == 0 => None,
        Some(i) => Some(i.min(len - 1)),
        None => None,
    }
}

fn clamp(state: &mut ListState, len: usize) {
    let selected = state.selected();
    state.select(clamp_index(selected, len));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refreshed(doc: Document) -> App {
        let mut app = App::new();
        app.refresh(doc, SyncStatus::default(), String::new());
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form.as_mut().unwrap().push(c);
        }
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_on_first_link_section() {
        let app = App::new();
        assert_eq!(app.focus, Pane::Links(LinkSection::Dev));
        assert!(!app.quit);
        assert!(app.form.is_none());
        assert!(app.selected().is_none());
    }

    // -- focus ---------------------------------------------------------------

    #[test]
    fn focus_cycles_through_all_panes() {
        let mut app = App::new();
        for _ in 0..5 {
            app.focus_next();
        }
        assert_eq!(app.focus, Pane::Links(LinkSection::Dev));

        app.focus_previous();
        assert_eq!(app.focus, Pane::News);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_on_empty_is_noop() {
        let mut doc = Document::default();
        doc.dev_links.clear();
        let mut app = refreshed(doc);
        app.select_next();
        app.select_last();
        assert!(app.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_clamps() {
        let mut app = refreshed(Document::default());
        app.select_next();
        assert_eq!(app.selected(), Some(0));
        for _ in 0..10 {
            app.select_next();
        }
        assert_eq!(app.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = refreshed(Document::default());
        app.select_first();
        app.select_previous();
        assert_eq!(app.selected(), Some(0));
    }

    #[test]
    fn selection_is_kept_per_pane() {
        let mut app = refreshed(Document::default());
        app.select_last();
        app.focus_next();
        assert!(app.selected().is_none());
        app.focus_previous();
        assert_eq!(app.selected(), Some(2));
    }

    #[test]
    fn refresh_pulls_selection_back_inside_list() {
        let mut app = refreshed(Document::default());
        app.focus = Pane::News;
        app.select_last();
        assert_eq!(app.selected(), Some(3));

        let mut doc = Document::default();
        doc.news.truncate(2);
        app.refresh(doc, SyncStatus::default(), String::new());
        assert_eq!(app.selected(), Some(1));

        let mut doc = Document::default();
        doc.news.clear();
        app.refresh(doc, SyncStatus::default(), String::new());
        assert_eq!(app.selected(), None);
    }

    // -- delete --------------------------------------------------------------

    #[test]
    fn delete_selected_link_uses_index() {
        let mut app = refreshed(Document::default());
        app.focus = Pane::Links(LinkSection::Google);
        app.select_next();
        app.select_next();
        assert_eq!(
            app.delete_selected(),
            Some(Action::Edit(Edit::RemoveLink {
                section: LinkSection::Google,
                index: 1,
                item: LinkItem::new("Calendar", "https://calendar.google.com"),
            }))
        );
    }

    #[test]
    fn delete_selected_news_uses_id() {
        let mut app = refreshed(Document::default());
        app.focus = Pane::News;
        app.select_last();
        assert_eq!(
            app.delete_selected(),
            Some(Action::Edit(Edit::RemoveNews { id: "4".into() }))
        );
    }

    // -- open ----------------------------------------------------------------

    #[test]
    fn open_selected_link_and_news() {
        let mut app = refreshed(Document::default());
        app.select_first();
        assert_eq!(
            app.open_selected(),
            Some(Action::Open("https://github.com".into()))
        );

        app.focus = Pane::News;
        app.select_first();
        let expected = app.doc.news[0].url.clone();
        assert_eq!(app.open_selected(), Some(Action::Open(expected)));
    }

    #[test]
    fn open_adds_scheme_and_skips_blank_urls() {
        let mut doc = Document::default();
        doc.dev_links = vec![LinkItem::new("Bare", "x.com"), LinkItem::new("Blank", " ")];
        let mut app = refreshed(doc);

        app.select_first();
        assert_eq!(app.open_selected(), Some(Action::Open("https://x.com".into())));
        app.select_next();
        assert_eq!(app.open_selected(), None);
    }

    #[test]
    fn open_without_selection_does_nothing() {
        let app = refreshed(Document::default());
        assert!(app.open_selected().is_none());
    }

    #[test]
    fn delete_without_selection_does_nothing() {
        let app = refreshed(Document::default());
        assert!(app.delete_selected().is_none());
    }

    // -- forms ---------------------------------------------------------------

    #[test]
    fn add_link_form_submits_on_last_field() {
        let mut app = refreshed(Document::default());
        app.focus = Pane::Links(LinkSection::Chat);
        app.open_add_form();

        type_text(&mut app, "Test");
        assert_eq!(app.form_enter(), None, "first Enter moves to URL");
        type_text(&mut app, "test.com");

        assert_eq!(
            app.form_enter(),
            Some(Action::Edit(Edit::AddLink {
                section: LinkSection::Chat,
                item: LinkItem::new("Test", "test.com"),
            }))
        );
        assert!(app.form.is_none());
    }

    #[test]
    fn incomplete_link_form_stays_open() {
        let mut app = refreshed(Document::default());
        app.open_add_form();
        type_text(&mut app, "No URL");
        app.form_enter();
        assert_eq!(app.form_enter(), None);
        assert!(app.form.is_some());
    }

    #[test]
    fn add_news_form_prefills_date_and_defaults_blanks() {
        let mut app = refreshed(Document::default());
        app.focus = Pane::News;
        app.open_add_form();

        type_text(&mut app, "Headline");
        app.form_enter();
        type_text(&mut app, "https://example.com/story");
        app.form_enter(); // source left blank
        app.form_enter(); // date keeps today
        app.form_enter(); // category left blank
        let action = app.form_enter();

        match action {
            Some(Action::Edit(Edit::AddNews(item))) => {
                assert_eq!(item.title, "Headline");
                assert_eq!(item.url, "https://example.com/story");
                assert_eq!(item.source, "Unknown");
                assert_eq!(item.date, today());
                assert_eq!(item.category, "General");
            }
            other => panic!("expected AddNews, got {other:?}"),
        }
    }

    #[test]
    fn connect_form_starts_with_current_url_and_allows_empty() {
        let mut app = App::new();
        app.refresh(Document::default(), SyncStatus::default(), "https://old".into());
        app.open_connect_form();
        assert_eq!(app.form.as_ref().unwrap().fields[0].value, "https://old");

        for _ in 0.."https://old".len() {
            app.form.as_mut().unwrap().backspace();
        }
        assert_eq!(app.form_enter(), Some(Action::Connect(String::new())));
    }

    #[test]
    fn form_field_navigation_wraps() {
        let mut form = Form::add_news();
        form.previous_field();
        assert_eq!(form.active, 4);
        form.next_field();
        assert_eq!(form.active, 0);
    }
}
