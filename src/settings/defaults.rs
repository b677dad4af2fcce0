//! Default settings schema
//!
//! The schema is a settings tree holding every default. Its value shapes are
//! what user settings are validated against.

use serde_json::{json, Value};

use super::AltPolicy;

/// Site pattern that always exists and carries every site default
pub const DEFAULT_SITE_PATTERN: &str = ".*";

/// Layout name read from `globalSettings.layouts`
pub const ACTIVE_LAYOUT: &str = "default";

/// `ignoreKeys` entry applied in every mode
pub const WILDCARD_MODE: &str = "all";

pub const DEFAULT_CMDLINE_TIMEOUT: f64 = 3000.0;

pub const DEFAULT_SELECTOR: &str =
    r#"textarea:not([readonly], [aria-readonly]), div[role="textbox"]"#;

pub const DEFAULT_FILENAME: &str =
    "{hostname%32}_{pathname%32}_{selector%32}_{timestamp%32}.{extension}";

/// Mode tokens that get an `ignoreKeys` entry by default
pub const KNOWN_MODES: &[&str] = &[
    WILDCARD_MODE,
    "normal",
    "visual",
    "insert",
    "replace",
    "cmdline_normal",
    "cmdline_insert",
    "cmdline_replace",
    "operator",
    "visual_select",
    "cmdline_hover",
    "statusline_hover",
    "statusline_drag",
    "vsep_hover",
    "vsep_drag",
    "more",
    "more_lastline",
    "showmatch",
];

pub(super) const ALT_VALUES: &[&str] = &["alphanum", "all"];
pub(super) const CMDLINE_VALUES: &[&str] = &["editor", "external", "none"];
pub(super) const CONTENT_VALUES: &[&str] = &["text", "html"];
pub(super) const RENDERER_VALUES: &[&str] = &["canvas", "html"];
pub(super) const TAKEOVER_VALUES: &[&str] = &["always", "once", "empty", "nonempty", "never"];

/// Enumerated string fields of a site entry and their allowed values
pub(super) const SITE_ENUM_FIELDS: &[(&str, &[&str])] = &[
    ("cmdline", CMDLINE_VALUES),
    ("content", CONTENT_VALUES),
    ("renderer", RENDERER_VALUES),
    ("takeover", TAKEOVER_VALUES),
];

/// Host platform family; only used to pick platform-dependent defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Mac => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Other => "other",
        }
    }

    /// Option-key characters on macOS need Alt+punctuation left alone
    pub fn default_alt_policy(self) -> AltPolicy {
        match self {
            Platform::Mac => AltPolicy::Alphanum,
            _ => AltPolicy::All,
        }
    }
}

/// Defaults for `globalSettings`
pub fn global_defaults(platform: Platform) -> Value {
    let ignore_keys: serde_json::Map<String, Value> = KNOWN_MODES
        .iter()
        .map(|mode| (mode.to_string(), json!([])))
        .collect();
    let alt = match platform.default_alt_policy() {
        AltPolicy::Alphanum => "alphanum",
        AltPolicy::All => "all",
    };

    json!({
        "alt": alt,
        "shiftAlt": false,
        "shiftCtrl": false,
        "shiftAltCtrl": false,
        "ignoreKeys": ignore_keys,
        "layouts": {},
        "cmdlineTimeout": 3000,
    })
}

/// Defaults for the [`DEFAULT_SITE_PATTERN`] site entry
pub fn site_defaults() -> Value {
    json!({
        "cmdline": "external",
        "content": "text",
        "priority": 0,
        "renderer": "canvas",
        "selector": DEFAULT_SELECTOR,
        "takeover": "always",
        "filename": DEFAULT_FILENAME,
    })
}

/// The whole default settings tree
pub fn settings_defaults(platform: Platform) -> Value {
    json!({
        "globalSettings": global_defaults(platform),
        "localSettings": {
            DEFAULT_SITE_PATTERN: site_defaults(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{GlobalSettings, SiteConfig, Takeover};

    #[test]
    fn test_alt_default_depends_on_platform() {
        assert_eq!(global_defaults(Platform::Mac)["alt"], "alphanum");
        assert_eq!(global_defaults(Platform::Linux)["alt"], "all");
        assert_eq!(global_defaults(Platform::Windows)["alt"], "all");
    }

    #[test]
    fn test_schema_matches_typed_defaults() {
        for platform in [Platform::Mac, Platform::Linux] {
            let typed: GlobalSettings =
                serde_json::from_value(global_defaults(platform)).unwrap();
            assert_eq!(typed, GlobalSettings::for_platform(platform));
        }
    }

    #[test]
    fn test_site_defaults_are_complete() {
        let site: SiteConfig = serde_json::from_value(site_defaults()).unwrap();
        assert_eq!(site.priority, Some(0.0));
        assert_eq!(site.takeover, Some(Takeover::Always));
        assert_eq!(site.selector.as_deref(), Some(DEFAULT_SELECTOR));
        assert!(site.cmdline.is_some());
        assert!(site.content.is_some());
        assert!(site.renderer.is_some());
        assert!(site.filename.is_some());
    }

    #[test]
    fn test_every_mode_has_an_ignore_list() {
        let defaults = global_defaults(Platform::Linux);
        for mode in KNOWN_MODES {
            assert_eq!(defaults["ignoreKeys"][*mode], json!([]));
        }
    }
}
