//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is three rows: the four link sections side by side, the
//!   news table, and a one-line status bar.  An open form is drawn as a
//!   centred popup on top.
//! * Colours and styles are defined inline.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Form, Pane};
use crate::dashboard::LinkSection;
use crate::sync::SyncStatus;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [links_area, news_area, status_area] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let columns: [Rect; 4] = Layout::horizontal([Constraint::Ratio(1, 4); 4]).areas(links_area);
    for (section, area) in LinkSection::ALL.into_iter().zip(columns) {
        draw_links(app, frame, section, area);
    }
    draw_news(app, frame, news_area);
    draw_status_bar(app, frame, status_area);

    if let Some(form) = &app.form {
        draw_form(form, frame);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border)
}

fn highlight() -> Style {
    Style::default()
        .add_modifier(Modifier::BOLD)
        .bg(Color::DarkGray)
}

/// Render one link section.
fn draw_links(app: &mut App, frame: &mut Frame, section: LinkSection, area: Rect) {
    let items: Vec<ListItem> = app
        .doc
        .links(section)
        .iter()
        .map(|link| {
            ListItem::new(Line::from(vec![
                Span::styled(&link.name, Style::default().fg(Color::White)),
                Span::raw(" "),
                Span::styled(&link.url, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let focused = app.focus == Pane::Links(section);
    let list = List::new(items)
        .block(pane_block(section.title(), focused))
        .highlight_style(highlight())
        .highlight_symbol("▸ ");

    let index = LinkSection::ALL
        .iter()
        .position(|s| *s == section)
        .unwrap_or(0);
    frame.render_stateful_widget(list, area, &mut app.link_states[index]);
}

/// Render the curated news table.
fn draw_news(app: &mut App, frame: &mut Frame, area: Rect) {
    let header = Row::new(["Date", "Title", "Source", "Category"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .doc
        .news
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.date.as_str()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(item.title.as_str()),
                Cell::from(item.source.as_str()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format!("[{}]", item.category)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(16),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(pane_block("News", app.focus == Pane::News))
    .row_highlight_style(highlight())
    .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.news_state);
}

/// The sync indicator: what the user should know right now, and its colour.
pub fn sync_label(status: &SyncStatus, url: &str) -> (&'static str, Color) {
    if status.loading {
        ("Loading…", Color::Gray)
    } else if status.saving {
        ("Saving…", Color::Gray)
    } else if status.dirty {
        ("Unsaved changes", Color::Yellow)
    } else if url.is_empty() {
        ("Local only", Color::Gray)
    } else if status.last_error.is_none() {
        ("Synced", Color::Green)
    } else {
        ("Not synced", Color::Red)
    }
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let (label, colour) = sync_label(&app.status, &app.url);

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(label, Style::default().fg(colour)),
    ];
    if let Some(error) = &app.status.last_error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(error.as_str(), Style::default().fg(Color::Red)));
    }
    spans.push(Span::raw(
        "  q: quit  tab: pane  ↑/↓: move  enter: open  a: add  d: delete  s: save  c: connect",
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render an open form as a centred popup.
fn draw_form(form: &Form, frame: &mut Frame) {
    let height = form.fields.len() as u16 + 4;
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let style = if i == form.active {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let cursor = if i == form.active { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:>10}: ", field.label), style),
                Span::styled(format!("{}{cursor}", field.value), style),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "enter: next/submit  tab: field  esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(form.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Document;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(app: &mut App) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    fn app_with(status: SyncStatus, url: &str) -> App {
        let mut app = App::new();
        app.refresh(Document::default(), status, url.to_string());
        app
    }

    #[test]
    fn label_priority() {
        let busy = SyncStatus {
            loading: true,
            dirty: true,
            ..Default::default()
        };
        assert_eq!(sync_label(&busy, "u").0, "Loading…");

        let dirty = SyncStatus {
            dirty: true,
            ..Default::default()
        };
        assert_eq!(sync_label(&dirty, "u").0, "Unsaved changes");

        assert_eq!(sync_label(&SyncStatus::default(), "").0, "Local only");
        assert_eq!(sync_label(&SyncStatus::default(), "u").0, "Synced");

        let failed = SyncStatus {
            last_error: Some("boom".into()),
            ..Default::default()
        };
        assert_eq!(sync_label(&failed, "u").0, "Not synced");
    }

    #[test]
    fn draw_shows_links_and_news() {
        let mut app = app_with(SyncStatus::default(), "");
        let text = screen_text(&mut app);
        assert!(text.contains("GitHub"));
        assert!(text.contains("Gmail"));
        assert!(text.contains("Hacker News"));
        assert!(text.contains("Local only"));
    }

    #[test]
    fn draw_shows_last_error() {
        let status = SyncStatus {
            last_error: Some("Failed to save to Sheet.".into()),
            dirty: true,
            ..Default::default()
        };
        let mut app = app_with(status, "https://example.com");
        let text = screen_text(&mut app);
        assert!(text.contains("Unsaved changes"));
        assert!(text.contains("Failed to save to Sheet."));
    }

    #[test]
    fn draw_does_not_panic_with_empty_document_and_form() {
        let mut doc = Document::default();
        for section in LinkSection::ALL {
            doc.links_mut(section).clear();
        }
        doc.news.clear();
        let mut app = App::new();
        app.refresh(doc, SyncStatus::default(), String::new());
        app.open_connect_form();

        let text = screen_text(&mut app);
        assert!(text.contains("Remote URL"));
    }

    #[test]
    fn draw_does_not_panic_on_tiny_terminal() {
        let mut app = app_with(SyncStatus::default(), "");
        app.open_add_form();
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }
}
