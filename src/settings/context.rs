//! Shared settings context
//!
//! Holds the current [`Snapshot`] behind an atomic pointer. Readers take the
//! snapshot once per event and never block; writers rebuild a complete
//! snapshot and swap it in.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use serde_json::{Map, Value};

use super::{
    default_settings, Diagnostic, GlobalSettings, Platform, Settings, SettingsStore, SiteConfig,
    SiteTable, ACTIVE_LAYOUT,
};
use crate::error::{ConfigError, Result};
use crate::keymap::{KeyTranslator, LayoutMapper};

/// One consistent view of the settings
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Defaulted settings tree, as it would be stored
    pub tree: Value,
    pub settings: Settings,
    pub layout: LayoutMapper,
    pub sites: SiteTable,
    /// Everything repaired or discarded while building this snapshot
    pub diagnostics: Vec<Diagnostic>,
}

impl Snapshot {
    /// Default, validate and compile a stored settings tree
    pub fn build(stored: Value, platform: Platform) -> Result<Self> {
        let validated = default_settings(stored, platform);
        let mut diagnostics = validated.diagnostics;
        let settings: Settings = serde_json::from_value(validated.value.clone())?;

        let (layout, layout_diagnostics) = LayoutMapper::from_config(
            ACTIVE_LAYOUT,
            settings.global_settings.active_layout(),
        );
        diagnostics.extend(layout_diagnostics);

        let (sites, site_diagnostics) = SiteTable::new(&settings.local_settings);
        diagnostics.extend(site_diagnostics);

        Ok(Self {
            tree: validated.value,
            settings,
            layout,
            sites,
            diagnostics,
        })
    }

    pub fn global(&self) -> &GlobalSettings {
        &self.settings.global_settings
    }

    pub fn translator(&self) -> KeyTranslator<'_> {
        KeyTranslator::new(&self.settings.global_settings, &self.layout)
    }

    pub fn resolve(&self, url: &str) -> SiteConfig {
        self.sites.resolve(url)
    }

    /// Top-level stored keys of the defaulted tree
    pub fn stored(&self) -> Map<String, Value> {
        match &self.tree {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }
}

/// Settings shared between the input path and configuration updates
#[derive(Debug)]
pub struct SettingsContext {
    platform: Platform,
    current: ArcSwapOption<Snapshot>,
    /// Serializes writers; readers never take it
    write: Mutex<()>,
}

impl SettingsContext {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            current: ArcSwapOption::empty(),
            write: Mutex::new(()),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether settings have been loaded
    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Load the stored settings, replacing any previous snapshot.
    ///
    /// This is the readiness signal: until it succeeds, [`snapshot`] and
    /// [`resolve`] fail with [`ConfigError::Uninitialized`].
    ///
    /// [`snapshot`]: Self::snapshot
    /// [`resolve`]: Self::resolve
    pub fn load(&self, stored: Map<String, Value>) -> Result<Arc<Snapshot>> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = Arc::new(Snapshot::build(Value::Object(stored), self.platform)?);
        log_diagnostics(&snapshot.diagnostics);
        tracing::info!(
            sites = snapshot.sites.len(),
            custom_layout = snapshot.layout.is_custom(),
            "Settings loaded"
        );
        self.current.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    pub fn load_from(&self, store: &impl SettingsStore) -> Result<Arc<Snapshot>> {
        self.load(store.read_all()?)
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.current.load_full().ok_or(ConfigError::Uninitialized)
    }

    /// Effective site configuration for `url`
    pub fn resolve(&self, url: &str) -> Result<SiteConfig> {
        Ok(self.snapshot()?.resolve(url))
    }

    /// Replace one top-level stored key; `Value::Null` removes it.
    ///
    /// The whole tree is defaulted again, so a patch can never leave the
    /// snapshot in an unvalidated state.
    pub fn update(&self, key: &str, value: Value) -> Result<Arc<Snapshot>> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stored = self
            .current
            .load_full()
            .ok_or(ConfigError::Uninitialized)?
            .stored();

        if value.is_null() {
            stored.shift_remove(key);
        } else {
            stored.insert(key.to_string(), value);
        }

        let snapshot = Arc::new(Snapshot::build(Value::Object(stored), self.platform)?);
        log_diagnostics(&snapshot.diagnostics);
        tracing::debug!(key, "Applied settings update");
        self.current.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }
}

impl Default for SettingsContext {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        tracing::warn!("{}", diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MemoryStore, Renderer};
    use serde_json::json;

    fn stored(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_access_before_load_fails() {
        let context = SettingsContext::new(Platform::Linux);
        assert!(!context.is_ready());
        assert!(matches!(context.snapshot(), Err(ConfigError::Uninitialized)));
        assert!(matches!(
            context.resolve("https://example.com"),
            Err(ConfigError::Uninitialized)
        ));
        assert!(matches!(
            context.update("globalSettings", json!({})),
            Err(ConfigError::Uninitialized)
        ));
    }

    #[test]
    fn test_load_empty_store_uses_defaults() {
        let context = SettingsContext::new(Platform::Mac);
        let snapshot = context.load_from(&MemoryStore::default()).unwrap();
        assert!(context.is_ready());
        assert!(snapshot.diagnostics.is_empty());
        assert_eq!(snapshot.global().alt, crate::settings::AltPolicy::Alphanum);
        assert_eq!(
            context.resolve("https://anything").unwrap().renderer,
            Some(Renderer::Canvas)
        );
    }

    #[test]
    fn test_update_swaps_snapshot() {
        let context = SettingsContext::new(Platform::Linux);
        let before = context.load(Map::new()).unwrap();

        context
            .update(
                "localSettings",
                json!({ r"example\.com": { "priority": 10, "renderer": "html" } }),
            )
            .unwrap();

        // Readers holding the old snapshot keep a consistent view
        assert_eq!(before.resolve("https://example.com").renderer, Some(Renderer::Canvas));
        assert_eq!(
            context.resolve("https://example.com").unwrap().renderer,
            Some(Renderer::Html)
        );
        // `.*` is restored by the defaulter
        assert_eq!(
            context.resolve("https://other.com").unwrap().renderer,
            Some(Renderer::Canvas)
        );
    }

    #[test]
    fn test_update_null_removes_key() {
        let context = SettingsContext::new(Platform::Linux);
        context
            .load(stored(json!({ "globalSettings": { "shiftCtrl": true } })))
            .unwrap();
        assert!(context.snapshot().unwrap().global().shift_ctrl);

        context.update("globalSettings", Value::Null).unwrap();
        assert!(!context.snapshot().unwrap().global().shift_ctrl);
    }

    #[test]
    fn test_update_is_validated() {
        let context = SettingsContext::new(Platform::Linux);
        context.load(Map::new()).unwrap();
        let snapshot = context
            .update("globalSettings", json!({ "shiftAlt": "yes" }))
            .unwrap();
        assert!(!snapshot.global().shift_alt);
        assert_eq!(snapshot.diagnostics.len(), 1);
    }

    #[test]
    fn test_invalid_layout_and_pattern_are_diagnostics() {
        let context = SettingsContext::new(Platform::Linux);
        let snapshot = context
            .load(stored(json!({
                "globalSettings": { "layouts": { "default": { "1": "é" } } },
                "localSettings": { "[": { "priority": 3 } },
            })))
            .unwrap();
        assert!(!snapshot.layout.is_custom());
        assert_eq!(snapshot.sites.len(), 1);
        assert!(matches!(
            &snapshot.diagnostics[..],
            [Diagnostic::InvalidLayout { .. }, Diagnostic::InvalidPattern { .. }]
        ));
    }
}
