//! Settings tree: defaults, validation, per-site resolution and live updates
//!
//! # Architecture
//!
//! ```text
//! SettingsStore::read_all() → default_settings() → Snapshot { Settings, LayoutMapper, SiteTable }
//!                                                     ↑
//!                          SettingsWatcher → SettingsContext::update(key, value)
//! ```
//!
//! Problems in user settings never fail a load. They are repaired and
//! reported as [`Diagnostic`]s next to the repaired tree.

mod context;
mod defaults;
mod merge;
mod site;
mod store;
mod watcher;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::keymap::Mode;

pub use context::{SettingsContext, Snapshot};
pub use defaults::{
    global_defaults, settings_defaults, site_defaults, Platform, ACTIVE_LAYOUT,
    DEFAULT_CMDLINE_TIMEOUT, DEFAULT_FILENAME, DEFAULT_SELECTOR, DEFAULT_SITE_PATTERN,
    KNOWN_MODES, WILDCARD_MODE,
};
pub use merge::{default_settings, merge, Shape, Validated};
pub use site::{resolve, SiteTable};
pub use store::{changed_keys, FileStore, KeyChange, MemoryStore, SettingsStore};
pub use watcher::SettingsWatcher;

/// The whole persisted settings object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub global_settings: GlobalSettings,
    /// URL regex pattern → partial site configuration, in declaration order
    pub local_settings: IndexMap<String, SiteConfig>,
}

/// How Alt combinations on non-alphanumeric keys are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltPolicy {
    /// Alt only translates on alphanumeric keys; Alt+punctuation is left to
    /// the platform to compose (macOS option-key characters)
    Alphanum,
    All,
}

/// Settings read by the key translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub alt: AltPolicy,
    /// Shift+Alt reports an explicit Shift over the unshifted key
    pub shift_alt: bool,
    /// Shift+Control reports an explicit Shift over the unshifted key
    pub shift_ctrl: bool,
    /// Shift+Alt+Control reports an explicit Shift over the unshifted key
    pub shift_alt_ctrl: bool,
    /// Mode token (or `all`) → notations that are never sent
    pub ignore_keys: IndexMap<String, Vec<String>>,
    /// Named layouts; only [`ACTIVE_LAYOUT`] is used
    pub layouts: IndexMap<String, Value>,
    pub cmdline_timeout: f64,
}

impl GlobalSettings {
    /// Built-in global settings for a platform
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            alt: platform.default_alt_policy(),
            shift_alt: false,
            shift_ctrl: false,
            shift_alt_ctrl: false,
            ignore_keys: KNOWN_MODES
                .iter()
                .map(|mode| (mode.to_string(), Vec::new()))
                .collect(),
            layouts: IndexMap::new(),
            cmdline_timeout: DEFAULT_CMDLINE_TIMEOUT,
        }
    }

    /// Suppressed notations for a mode: its own list, then the wildcard list
    pub fn ignored_keys<'a>(&'a self, mode: &Mode) -> impl Iterator<Item = &'a str> + 'a {
        let own = self.ignore_keys.get(mode.as_str());
        let wildcard = self.ignore_keys.get(WILDCARD_MODE);
        own.into_iter()
            .chain(wildcard)
            .flatten()
            .map(String::as_str)
    }

    pub fn is_ignored(&self, notation: &str, mode: &Mode) -> bool {
        self.ignored_keys(mode).any(|ignored| ignored == notation)
    }

    /// The configured layout in effect, if any
    pub fn active_layout(&self) -> Option<&Value> {
        self.layouts.get(ACTIVE_LAYOUT)
    }
}

/// Where the editor's command line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cmdline {
    /// Inside the editor surface
    Editor,
    /// In a separate host-drawn line
    External,
    None,
}

/// What is read from and written back to the target element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    Text,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    Canvas,
    Html,
}

/// When a target element is taken over automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Takeover {
    Always,
    Once,
    Empty,
    Nonempty,
    Never,
}

/// Per-target settings. Entries in the site table are partial; a resolved
/// configuration is the fold of every matching entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmdline: Option<Cmdline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<Renderer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeover: Option<Takeover>,
    /// Template for the name of the file backing the editor buffer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl SiteConfig {
    /// Priority used for ordering; a missing priority counts as 1
    pub fn priority_or_default(&self) -> f64 {
        self.priority.unwrap_or(1.0)
    }

    /// Override every field `other` sets
    pub fn merge_from(&mut self, other: &SiteConfig) {
        if other.cmdline.is_some() {
            self.cmdline = other.cmdline;
        }
        if other.content.is_some() {
            self.content = other.content;
        }
        if other.priority.is_some() {
            self.priority = other.priority;
        }
        if other.renderer.is_some() {
            self.renderer = other.renderer;
        }
        if other.selector.is_some() {
            self.selector.clone_from(&other.selector);
        }
        if other.takeover.is_some() {
            self.takeover = other.takeover;
        }
        if other.filename.is_some() {
            self.filename.clone_from(&other.filename);
        }
    }
}

/// Why a configured layout was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("layout is not a mapping")]
    NotAMapping,
    #[error("key {0:?} is not a mappable key")]
    UnknownKey(String),
    #[error("value for {0:?} is not a string")]
    NonStringValue(String),
    #[error("{key:?} maps to {value:?}, which is not a mappable key")]
    UnknownShifted { key: String, value: String },
    #[error("{value:?} is claimed by both {first:?} and {second:?}")]
    DuplicateShifted { value: char, first: char, second: char },
}

/// A problem found in user settings, and how it was repaired
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("{path}: expected {expected}, found {found}; using the default")]
    TypeMismatch {
        path: String,
        expected: Shape,
        found: Shape,
    },
    #[error("{path}: {value:?} is not one of {}; using the default", .allowed.join(", "))]
    UnexpectedValue {
        path: String,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("{path}: dropped {value} ({reason})")]
    DroppedEntry {
        path: String,
        value: String,
        reason: &'static str,
    },
    #[error("layout {layout:?} discarded, using the built-in layout: {reason}")]
    InvalidLayout {
        layout: String,
        reason: LayoutViolation,
    },
    #[error("site pattern {pattern:?} is not a valid regular expression; skipping it: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_yaml::to_string(self) {
            Ok(yaml) => f.write_str(&yaml),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_priority_defaults_to_one() {
        assert_eq!(SiteConfig::default().priority_or_default(), 1.0);
        let config = SiteConfig {
            priority: Some(0.0),
            ..Default::default()
        };
        assert_eq!(config.priority_or_default(), 0.0);
    }

    #[test]
    fn test_merge_from_keeps_unset_fields() {
        let mut base = SiteConfig {
            renderer: Some(Renderer::Canvas),
            takeover: Some(Takeover::Always),
            ..Default::default()
        };
        let overlay = SiteConfig {
            renderer: Some(Renderer::Html),
            ..Default::default()
        };
        base.merge_from(&overlay);
        assert_eq!(base.renderer, Some(Renderer::Html));
        assert_eq!(base.takeover, Some(Takeover::Always));
    }

    #[test]
    fn test_ignored_keys_mode_then_wildcard() {
        let mut global = GlobalSettings::for_platform(Platform::Linux);
        global
            .ignore_keys
            .insert("normal".to_string(), vec!["<C-n>".to_string()]);
        global
            .ignore_keys
            .insert("all".to_string(), vec!["<C-->".to_string()]);

        let normal = Mode::from("normal");
        let keys: Vec<&str> = global.ignored_keys(&normal).collect();
        assert_eq!(keys, vec!["<C-n>", "<C-->"]);
        assert!(global.is_ignored("<C-->", &Mode::from("insert")));
        assert!(!global.is_ignored("<C-n>", &Mode::from("insert")));
        assert!(global.is_ignored("<C-->", &Mode::from("unheard_of")));
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let global = GlobalSettings::for_platform(Platform::Linux);
        let value = serde_json::to_value(&global).unwrap();
        assert!(value.get("shiftAltCtrl").is_some());
        assert!(value.get("ignoreKeys").is_some());
        assert!(value.get("cmdlineTimeout").is_some());
    }
}
