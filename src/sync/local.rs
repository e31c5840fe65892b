//! Best-effort local persistence.
//!
//! Two named slots survive between sessions: the last known-good document
//! and the remote URL.  Nothing here ever fails loudly.  A write error is
//! logged and dropped, a corrupt backup reads as "no backup".

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::SyncError;
use crate::dashboard::Document;

const BACKUP_SLOT: &str = "dashboard_data_backup";
const URL_SLOT: &str = "dashboard_sheet_api_url";

/// A durable string key-value store.
pub trait SlotStore: Send + Sync {
    /// Read a slot.  `Ok(None)` when it has never been written.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

impl<S: SlotStore + ?Sized> SlotStore for Arc<S> {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).set(key, value)
    }
}

/// One file per slot inside a directory.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SlotStore for DirStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.dir.join(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a half-written slot.
        let path = self.dir.join(key);
        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(tmp, path)
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    slots: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl SlotStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backup adapter
// ---------------------------------------------------------------------------

/// Typed access to the backup and URL slots.
pub struct LocalBackup {
    store: Box<dyn SlotStore>,
}

impl LocalBackup {
    pub fn new(store: impl SlotStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// The stored document as raw JSON, still to be migrated.
    ///
    /// `None` if the slot is empty, unreadable, or not valid JSON.
    pub fn read_backup(&self) -> Option<Value> {
        let text = match self.store.get(BACKUP_SLOT) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!("local backup unreadable: {e}");
                return None;
            }
        };

        match parse_backup(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    pub fn write_backup(&self, doc: &Document) {
        let text = match serde_json::to_string(doc) {
            Ok(text) => text,
            Err(e) => {
                warn!("could not serialize local backup: {e}");
                return;
            }
        };
        match self.store.set(BACKUP_SLOT, &text) {
            Ok(()) => debug!("local backup written ({} bytes)", text.len()),
            Err(e) => warn!("could not write local backup: {e}"),
        }
    }

    /// The remembered remote URL, or an empty string for local-only mode.
    pub fn read_url(&self) -> String {
        match self.store.get(URL_SLOT) {
            Ok(url) => url.map(|u| u.trim().to_string()).unwrap_or_default(),
            Err(e) => {
                warn!("stored remote URL unreadable: {e}");
                String::new()
            }
        }
    }

    pub fn write_url(&self, url: &str) {
        if let Err(e) = self.store.set(URL_SLOT, url) {
            warn!("could not remember remote URL: {e}");
        }
    }
}

fn parse_backup(text: &str) -> Result<Value, SyncError> {
    serde_json::from_str(text).map_err(SyncError::LocalParse)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
