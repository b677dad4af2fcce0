//! Settings system tests
//!
//! Loading from files, defaulting and repair, site resolution and live updates.

mod common;

use common::{loaded_context, stored, SettingsFixture};
use keybridge::config_paths;
use keybridge::settings::{
    changed_keys, default_settings, AltPolicy, Cmdline, Content, Diagnostic, FileStore,
    MemoryStore, Platform, Renderer, SettingsContext, SettingsStore, Takeover, DEFAULT_FILENAME,
    DEFAULT_SELECTOR, KNOWN_MODES,
};
use keybridge::ConfigError;
use serde_json::json;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_settings_file_ends_with_yaml() {
    if let Some(path) = config_paths::settings_file() {
        assert!(path.to_string_lossy().ends_with("settings.yaml"));
        assert!(path.to_string_lossy().contains("keybridge"));
    }
}

// ========================================================================
// Loading
// ========================================================================

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let context = SettingsContext::new(Platform::Windows);
    let snapshot = context
        .load_from(&FileStore::new(dir.path().join("absent.yaml")))
        .unwrap();

    let global = snapshot.global();
    assert_eq!(global.alt, AltPolicy::All);
    assert!(!global.shift_alt && !global.shift_ctrl && !global.shift_alt_ctrl);
    assert_eq!(global.cmdline_timeout, 3000.0);
    for mode in KNOWN_MODES {
        assert_eq!(global.ignore_keys.get(*mode), Some(&Vec::new()));
    }

    let site = context.resolve("https://example.com").unwrap();
    assert_eq!(site.cmdline, Some(Cmdline::External));
    assert_eq!(site.content, Some(Content::Text));
    assert_eq!(site.renderer, Some(Renderer::Canvas));
    assert_eq!(site.takeover, Some(Takeover::Always));
    assert_eq!(site.priority, Some(0.0));
    assert_eq!(site.selector.as_deref(), Some(DEFAULT_SELECTOR));
    assert_eq!(site.filename.as_deref(), Some(DEFAULT_FILENAME));
}

#[test]
fn test_yaml_file_loads() {
    let fixture = SettingsFixture::new(
        r#"
globalSettings:
  alt: alphanum
  shiftCtrl: true
  ignoreKeys:
    normal: ["<C-w>"]
  layouts:
    default:
      1: "!"
      2: "@"
localSettings:
  'github\.com':
    priority: 5
    takeover: never
"#,
    );
    let context = SettingsContext::new(Platform::Linux);
    let snapshot = context.load_from(&fixture.store()).unwrap();

    assert!(snapshot.diagnostics.is_empty(), "{:?}", snapshot.diagnostics);
    assert_eq!(snapshot.global().alt, AltPolicy::Alphanum);
    assert!(snapshot.global().shift_ctrl);
    assert!(snapshot.layout.is_custom());
    assert_eq!(snapshot.layout.len(), 2);
    assert_eq!(
        context.resolve("https://github.com/x").unwrap().takeover,
        Some(Takeover::Never)
    );
    assert_eq!(
        context.resolve("https://gitlab.com/x").unwrap().takeover,
        Some(Takeover::Always)
    );
}

#[test]
fn test_unparseable_file_is_an_error() {
    let fixture = SettingsFixture::new("globalSettings: {alt: \n");
    let context = SettingsContext::new(Platform::Linux);
    assert!(matches!(
        context.load_from(&fixture.store()),
        Err(ConfigError::Parse { .. })
    ));
    assert!(!context.is_ready());
}

// ========================================================================
// Defaulting and repair
// ========================================================================

#[test]
fn test_bad_values_are_repaired_with_diagnostics() {
    let context = loaded_context(
        Platform::Mac,
        json!({
            "globalSettings": {
                "alt": "everything",
                "shiftAlt": 1,
                "cmdlineTimeout": "soon",
                "ignoreKeys": { "insert": ["<C-v>", false] },
            },
            "localSettings": {
                ".*": { "content": "markdown", "selector": ["textarea"] },
            },
        }),
    );
    let snapshot = context.snapshot().unwrap();
    let global = snapshot.global();

    assert_eq!(global.alt, AltPolicy::Alphanum);
    assert!(!global.shift_alt);
    assert_eq!(global.cmdline_timeout, 3000.0);
    assert_eq!(global.ignore_keys["insert"], vec!["<C-v>".to_string()]);

    let site = context.resolve("https://x").unwrap();
    assert_eq!(site.content, Some(Content::Text));
    assert_eq!(site.selector.as_deref(), Some(DEFAULT_SELECTOR));

    let kinds: Vec<&str> = snapshot
        .diagnostics
        .iter()
        .map(|d| match d {
            Diagnostic::TypeMismatch { .. } => "type",
            Diagnostic::UnexpectedValue { .. } => "value",
            Diagnostic::DroppedEntry { .. } => "dropped",
            Diagnostic::InvalidLayout { .. } => "layout",
            Diagnostic::InvalidPattern { .. } => "pattern",
        })
        .collect();
    assert_eq!(kinds.iter().filter(|k| **k == "type").count(), 3);
    assert_eq!(kinds.iter().filter(|k| **k == "value").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "dropped").count(), 1);
}

#[test]
fn test_diagnostics_name_the_offending_path() {
    let validated = default_settings(
        json!({ "localSettings": { r"docs\.rs": { "priority": "high" } } }),
        Platform::Linux,
    );
    let message = validated.diagnostics[0].to_string();
    assert!(message.contains(r#"localSettings["docs\\.rs"].priority"#), "{}", message);
    assert!(message.contains("expected a number, found a string"), "{}", message);
}

#[test]
fn test_defaulting_is_idempotent_for_a_file() {
    let fixture = SettingsFixture::new(
        "globalSettings:\n  alt: 7\n  layouts: {default: {q: Q}}\nlocalSettings:\n  x: 3\n",
    );
    let first = default_settings(
        serde_json::Value::Object(fixture.store().read_all().unwrap()),
        Platform::Linux,
    );
    let second = default_settings(first.value.clone(), Platform::Linux);
    assert_eq!(first.value, second.value);
    assert!(second.diagnostics.is_empty());
}

// ========================================================================
// Site resolution
// ========================================================================

#[test]
fn test_priority_ordered_fold() {
    let context = loaded_context(
        Platform::Linux,
        json!({ "localSettings": {
            "example": { "priority": 2, "renderer": "html", "takeover": "once" },
            r"example\.com/docs": { "priority": 3, "takeover": "never" },
            "com": { "content": "html" },
        } }),
    );

    let docs = context.resolve("https://example.com/docs/intro").unwrap();
    assert_eq!(docs.renderer, Some(Renderer::Html));
    assert_eq!(docs.takeover, Some(Takeover::Never));
    assert_eq!(docs.content, Some(Content::Html));
    assert_eq!(docs.priority, Some(3.0));

    let home = context.resolve("https://example.com/").unwrap();
    assert_eq!(home.takeover, Some(Takeover::Once));
}

#[test]
fn test_resolve_before_load_is_an_error() {
    let context = SettingsContext::new(Platform::Linux);
    let err = context.resolve("https://example.com").unwrap_err();
    assert!(matches!(err, ConfigError::Uninitialized));
    assert!(err.to_string().contains("not initialized"));
}

// ========================================================================
// Live updates
// ========================================================================

#[test]
fn test_store_changes_become_key_updates() {
    let fixture = SettingsFixture::new("globalSettings:\n  shiftAlt: false\n");
    let store = fixture.store();
    let context = SettingsContext::new(Platform::Linux);
    context.load_from(&store).unwrap();

    let before = store.read_all().unwrap();
    fixture.rewrite(
        "globalSettings:\n  shiftAlt: true\nlocalSettings:\n  x: {renderer: html}\n",
    );
    let after = store.read_all().unwrap();

    let changes = changed_keys(&before, &after);
    assert_eq!(changes.len(), 2);
    for change in changes {
        context.update(&change.key, change.value).unwrap();
    }

    assert!(context.snapshot().unwrap().global().shift_alt);
    assert_eq!(
        context.resolve("https://x.org").unwrap().renderer,
        Some(Renderer::Html)
    );
}

#[test]
fn test_memory_store_feeds_context() {
    let mut store = MemoryStore::new(stored(json!({})));
    store.set("globalSettings", json!({ "alt": "alphanum" }));
    let context = SettingsContext::new(Platform::Linux);
    assert_eq!(
        context.load_from(&store).unwrap().global().alt,
        AltPolicy::Alphanum
    );
}
