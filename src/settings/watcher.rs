//! Live settings reload
//!
//! Watches the settings file with a debounced `notify` watcher and turns
//! file changes into per-key [`SettingsContext::update`] calls.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};
use serde_json::{Map, Value};

use super::{changed_keys, FileStore, KeyChange, SettingsContext, SettingsStore};
use crate::error::Result;

type EventResult = std::result::Result<Vec<DebouncedEvent>, notify::Error>;

/// Watches one settings file and reports which top-level keys changed
pub struct SettingsWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: Receiver<EventResult>,
    store: FileStore,
    file_name: Option<OsString>,
    last: Map<String, Value>,
}

impl SettingsWatcher {
    /// Start watching `store`'s file.
    ///
    /// The parent directory is watched rather than the file itself, so the
    /// watch survives editors that replace the file on save.
    pub fn new(store: FileStore, debounce: Duration) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, tx)?;

        let dir = watch_dir(store.path());
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        tracing::info!("Watching settings file {}", store.path().display());

        let last = store.read_all().unwrap_or_else(|e| {
            tracing::warn!("Could not read settings for the watcher baseline: {}", e);
            Map::new()
        });

        Ok(Self {
            _debouncer: debouncer,
            rx,
            file_name: store.path().file_name().map(OsString::from),
            store,
            last,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Drain pending file events (non-blocking) and return the keys that
    /// changed since the last read.
    pub fn poll_changes(&mut self) -> Result<Vec<KeyChange>> {
        let mut touched = false;

        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(events) => {
                    touched |= events.iter().any(|event| {
                        !matches!(event.kind, DebouncedEventKind::AnyContinuous)
                            && self.is_settings_file(&event.path)
                    });
                }
                Err(e) => tracing::warn!("Settings watcher error: {:?}", e),
            }
        }

        if !touched {
            return Ok(Vec::new());
        }
        self.reread()
    }

    /// Read the file again and diff it against the previous read
    pub fn reread(&mut self) -> Result<Vec<KeyChange>> {
        let current = self.store.read_all()?;
        let changes = changed_keys(&self.last, &current);
        self.last = current;
        if !changes.is_empty() {
            tracing::debug!("Settings file changed {} key(s)", changes.len());
        }
        Ok(changes)
    }

    /// Poll and apply every change to `context`; returns the updated keys.
    ///
    /// A file that fails to read or parse leaves the context untouched.
    pub fn apply(&mut self, context: &SettingsContext) -> Vec<String> {
        let changes = match self.poll_changes() {
            Ok(changes) => changes,
            Err(e) => {
                tracing::warn!("Ignoring settings change: {}", e);
                return Vec::new();
            }
        };

        changes
            .into_iter()
            .filter_map(|change| match context.update(&change.key, change.value) {
                Ok(_) => Some(change.key),
                Err(e) => {
                    tracing::warn!("Failed to apply settings key {}: {}", change.key, e);
                    None
                }
            })
            .collect()
    }

    fn is_settings_file(&self, path: &Path) -> bool {
        match &self.file_name {
            Some(name) => path.file_name() == Some(name.as_os_str()),
            None => path == self.store.path(),
        }
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
