//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] changes and, where the document or
//! the sync settings are affected, to an [`Action`] for the event loop.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_normal_key`] that calls it.
//! 3. Update the help text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{Action, App};

/// Process a single key event.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if app.form.is_some() {
        handle_form_key(app, key)
    } else {
        handle_normal_key(app, key)
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('c') => app.open_connect_form(),
        KeyCode::Enter | KeyCode::Char('o') => return app.open_selected(),
        KeyCode::Char('d') | KeyCode::Delete => return app.delete_selected(),
        KeyCode::Char('s') => return Some(Action::SaveNow),
        _ => {}
    }
    None
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => return app.form_enter(),
        KeyCode::Tab | KeyCode::Down => app.form.as_mut()?.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.as_mut()?.previous_field(),
        KeyCode::Backspace => app.form.as_mut()?.backspace(),
        KeyCode::Char(c) => app.form.as_mut()?.push(c),
        _ => {}
    }
    None
}
