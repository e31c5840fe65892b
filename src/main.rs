//! startpage: a terminal start page with link shortcuts and a curated news
//! table, kept in sync with a self-hosted JSON endpoint.
//!
//! ## Architecture overview
//!
//! ```text
//!                    Action              update() / manual_save() / set_url()
//! ┌──────────┐  ┌──────────────┐  ─────────────────►  ┌──────────────┐  HTTP  ┌────────┐
//! │ input.rs │─►│   main loop  │                      │   sync/      │ ─────► │ remote │
//! └──────────┘  └──────────────┘  ◄─────────────────  │ (controller) │        └────────┘
//!                   │  refresh()     document + flags  └──────────────┘
//!                   ▼                                        │ backup
//!               ┌────────┐  draw()  ┌────────┐               ▼
//!               │ app.rs │ ───────► │ ui.rs  │          data directory
//!               └────────┘          └────────┘
//! ```
//!
//! * **`dashboard/`**: the document model, defaults, edits and migration.
//! * **`sync/`**: the sync controller, local backup and remote store client.
//! * **`config`**: command-line / environment settings.
//! * **`app`**: presentation state (focus, selection, open form).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` changes and [`app::Action`]s.
//! * **`main`**: wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod config;
mod dashboard;
mod input;
mod sync;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{Action, App};
use config::Cli;
use sync::{DirStore, HttpRemote, LocalBackup, SyncController};

// ---------------------------------------------------------------------------
// RAII terminal guard, restores the terminal even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Log to `<data-dir>/startpage.log`; the terminal belongs to the UI.
fn init_logging(data_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(data_dir, "startpage.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "startpage=info".into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

/// Hand an action to the sync controller.  Network work runs on spawned
/// tasks so the UI never waits for it.
fn dispatch(sync: &SyncController<HttpRemote>, action: Action) {
    match action {
        Action::Edit(edit) => sync.update(|doc| edit.apply(doc)),
        Action::SaveNow => {
            let sync = sync.clone();
            tokio::spawn(async move { sync.manual_save().await });
        }
        Action::Connect(url) => {
            let sync = sync.clone();
            tokio::spawn(async move {
                sync.set_url(&url).await;
                sync.manual_save().await;
            });
        }
        Action::Open(url) => {
            info!("opening {url}");
            tokio::task::spawn_blocking(move || {
                if let Err(e) = webbrowser::open(&url) {
                    warn!("could not open {url}: {e}");
                }
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir()?;
    let _log_guard = init_logging(&data_dir)?;
    info!("starting, data directory {}", data_dir.display());

    // -- sync controller -----------------------------------------------------
    let local = LocalBackup::new(DirStore::new(&data_dir));
    if let Some(url) = &cli.url {
        local.write_url(url.trim());
    }
    let sync = SyncController::new(HttpRemote::new(), local);
    {
        let sync = sync.clone();
        tokio::spawn(async move { sync.load().await });
    }

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // -- main event loop -----------------------------------------------------
    // ~10 fps.  Each iteration:
    //   1. Snapshot the controller's document and flags.
    //   2. Render the UI.
    //   3. Poll for keyboard input (up to tick_rate).
    // The input poll blocks this thread only; spawned sync tasks run on the
    // runtime's worker threads.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.refresh(sync.document(), sync.status(), sync.url());

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = input::handle_key_event(&mut app, key) {
                    dispatch(&sync, action);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // Restore the terminal first, then push out anything unsaved.
    drop(guard);
    sync.flush().await;
    info!("exiting");
    Ok(())
}
