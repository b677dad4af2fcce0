//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use keybridge::keymap::{CompositionOrder, InputHandler};
use keybridge::settings::{FileStore, Platform, SettingsContext};
use serde_json::{Map, Value};
use tempfile::TempDir;

/// A settings file in a temporary directory
pub struct SettingsFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl SettingsFixture {
    pub fn new(yaml: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("settings.yaml");
        fs::write(&path, yaml).expect("Failed to write settings");
        Self { dir, path }
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.path)
    }

    pub fn rewrite(&self, yaml: &str) {
        fs::write(&self.path, yaml).expect("Failed to rewrite settings");
    }
}

/// Unwrap a JSON object literal into a stored settings map
pub fn stored(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

/// A context loaded from a JSON literal on a fixed platform
pub fn loaded_context(platform: Platform, value: Value) -> Arc<SettingsContext> {
    let context = SettingsContext::new(platform);
    context.load(stored(value)).expect("settings should load");
    Arc::new(context)
}

/// A handler whose emitted text is collected into the returned buffer
pub fn recording_handler(
    context: Arc<SettingsContext>,
    order: CompositionOrder,
) -> (InputHandler, Arc<Mutex<Vec<String>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sent);
    let mut handler = InputHandler::new(context, order);
    handler.on_translated(move |text: &str| {
        sink.lock().expect("sink lock").push(text.to_string());
    });
    (handler, sent)
}
