//! Local-first synchronization of the dashboard document.
//!
//! [`SyncController`] owns the in-memory [`Document`] and the sync flags.
//! Everything else reads through it and changes the document only via
//! [`SyncController::update`].
//!
//! ```text
//!   update() ──► document + dirty ──► local backup ──► 2 s timer ──► save()
//!                                                        ▲  (reset on every update)
//!   manual_save() ─────────────────────────────────────────────────► save()
//!
//!   save(): local backup ──► [URL set?] ──► remote POST ──► clear dirty / set error
//! ```
//!
//! * **`local`**: the backup and URL slots on disk.
//! * **`remote`**: the [`RemoteStore`] trait and its HTTP implementation.
//! * **`error`**: [`SyncError`].  It never leaves this module: failures turn
//!   into [`SyncStatus::last_error`].
//!
//! Saves are not serialised against each other.  If an autosave and a manual
//! save overlap, whichever finishes last decides the flags.  Both carry the
//! whole document, so the remote ends up with one of two complete states.

mod error;
mod local;
mod remote;

pub use error::SyncError;
#[cfg(test)]
pub use local::MemoryStore;
pub use local::{DirStore, LocalBackup};
pub use remote::{HttpRemote, RemoteStore};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::dashboard::{migrate, Document};

/// Quiet period after the last edit before it is pushed to the remote store.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

pub const LOAD_FAILED: &str = "Failed to load data from Sheet.";
pub const SAVE_FAILED: &str = "Failed to save to Sheet.";

/// Observable sync flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// A remote fetch is in flight.
    pub loading: bool,
    /// A remote save is in flight.
    pub saving: bool,
    /// The document has edits the store of record hasn't confirmed.
    pub dirty: bool,
    /// Sticky until the next successful load or save.
    pub last_error: Option<String>,
}

struct State {
    doc: Document,
    /// Empty means local-only mode.
    url: String,
    status: SyncStatus,
}

impl State {
    /// Clear `dirty` after `saved` reached the store of record, unless the
    /// document was edited again in the meantime.  That newer edit has its
    /// own autosave pending.
    fn settle(&mut self, saved: &Document) {
        if self.doc == *saved {
            self.status.dirty = false;
        } else {
            debug!("document changed during save, staying dirty");
        }
    }
}

struct Inner<R> {
    remote: R,
    local: LocalBackup,
    state: Mutex<State>,
    /// Handle of the pending autosave timer, if any.
    autosave: Mutex<Option<AbortHandle>>,
}

/// Handle to the shared sync state.  Clones refer to the same document.
pub struct SyncController<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for SyncController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RemoteStore> SyncController<R> {
    /// Start from the built-in defaults and the remembered URL.  Call
    /// [`load`](Self::load) to pull in stored data.
    pub fn new(remote: R, local: LocalBackup) -> Self {
        let url = local.read_url();
        Self {
            inner: Arc::new(Inner {
                remote,
                local,
                state: Mutex::new(State {
                    doc: Document::default(),
                    url,
                    status: SyncStatus::default(),
                }),
                autosave: Mutex::new(None),
            }),
        }
    }

    pub fn document(&self) -> Document {
        self.inner.state().doc.clone()
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.state().status.clone()
    }

    pub fn url(&self) -> String {
        self.inner.state().url.clone()
    }

    /// Pull the document from the remote store, falling back to the local
    /// backup.  Never fails; problems end up in [`SyncStatus::last_error`].
    pub async fn load(&self) {
        let url = self.url();
        let inner = &self.inner;

        if url.is_empty() {
            if let Some(raw) = inner.local.read_backup() {
                info!("loaded dashboard from local backup");
                inner.state().doc = migrate(&raw);
            }
            return;
        }

        {
            let mut state = inner.state();
            state.status.loading = true;
            state.status.last_error = None;
        }

        let fetched = inner.remote.fetch(&url).await;

        let mut state = inner.state();
        if state.url != url {
            debug!("URL changed while loading from {url}, discarding result");
            // A non-empty URL has its own load in flight that will clear this.
            if state.url.is_empty() {
                state.status.loading = false;
            }
            return;
        }

        match fetched {
            Ok(Some(fields)) => {
                let doc = migrate(&Value::Object(fields));
                inner.local.write_backup(&doc);
                state.doc = doc;
                state.status.last_error = None;
                info!("loaded dashboard from remote store");
            }
            Ok(None) => {
                // Push our document on the next save.
                info!("remote store is empty, keeping local document");
                state.status.dirty = true;
            }
            Err(e) => {
                warn!("load failed: {e}");
                state.status.last_error = Some(LOAD_FAILED.to_string());
                if let Some(raw) = inner.local.read_backup() {
                    info!("falling back to local backup");
                    state.doc = migrate(&raw);
                }
            }
        }
        state.status.loading = false;
    }

    /// Change the document.
    ///
    /// The edit is visible immediately, `dirty` is set, the local backup is
    /// rewritten and the autosave timer restarts with the new document.
    pub fn update(&self, edit: impl FnOnce(&mut Document)) {
        let snapshot = {
            let mut state = self.inner.state();
            edit(&mut state.doc);
            state.status.dirty = true;
            self.inner.local.write_backup(&state.doc);
            state.doc.clone()
        };
        self.schedule_autosave(snapshot);
    }

    /// Save the current document now, superseding any pending autosave.
    pub async fn manual_save(&self) {
        self.cancel_autosave();
        let doc = self.document();
        self.inner.save(doc).await;
    }

    /// Remember a new remote URL (empty for local-only) and reload if it
    /// changed.
    pub async fn set_url(&self, url: &str) {
        let url = url.trim().to_string();
        self.inner.local.write_url(&url);

        let changed = {
            let mut state = self.inner.state();
            let changed = state.url != url;
            if changed {
                info!("remote URL changed to {url:?}");
                state.url = url;
                // The error belonged to the previous endpoint.
                state.status.last_error = None;
            }
            changed
        };

        if changed {
            self.load().await;
        }
    }

    /// Cancel the autosave timer and save once more if anything is unsaved.
    pub async fn flush(&self) {
        self.cancel_autosave();
        if self.status().dirty {
            let doc = self.document();
            self.inner.save(doc).await;
        }
    }

    fn schedule_autosave(&self, doc: Document) {
        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(AUTOSAVE_DELAY).await;
            // Run the save as its own task: aborting this timer from here on
            // must not cut a request short.
            tokio::spawn(async move { inner.save(doc).await });
        });

        let previous = self.inner.autosave_slot().replace(timer.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_autosave(&self) {
        let pending = self.inner.autosave_slot().take();
        if let Some(pending) = pending {
            debug!("cancelling pending autosave");
            pending.abort();
        }
    }
}

impl<R: RemoteStore> Inner<R> {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn autosave_slot(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.autosave.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write `doc` locally, then remotely if a URL is configured.
    async fn save(&self, doc: Document) {
        self.local.write_backup(&doc);

        let url = self.state().url.clone();
        if url.is_empty() {
            // The local backup is the store of record.
            self.state().settle(&doc);
            return;
        }

        self.state().status.saving = true;
        let result = self.remote.save(&url, &doc).await;

        let mut state = self.state();
        match result {
            Ok(()) => {
                state.settle(&doc);
                state.status.last_error = None;
            }
            Err(e) => {
                warn!("save failed: {e}");
                state.status.last_error = Some(SAVE_FAILED.to_string());
            }
        }
        state.status.saving = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
