//! Merging user settings with the default schema
//!
//! Missing fields are copied from the schema. A present field whose shape
//! (primitive type or array-ness) differs from the default is replaced by the
//! default, never coerced. Running the defaulter on its own output is a no-op.

use std::fmt;

use serde_json::{Map, Value};

use super::defaults::{
    settings_defaults, site_defaults, Platform, ALT_VALUES, DEFAULT_SITE_PATTERN,
    SITE_ENUM_FIELDS,
};
use super::Diagnostic;

/// Runtime shape of a settings value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Shape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Bool,
            Value::Number(_) => Shape::Number,
            Value::String(_) => Shape::String,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Null => "null",
            Shape::Bool => "a boolean",
            Shape::Number => "a number",
            Shape::String => "a string",
            Shape::Array => "a list",
            Shape::Object => "a mapping",
        })
    }
}

/// A repaired settings tree and what was repaired
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub value: Value,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fill `user` from `schema`, recursing through mappings present in both.
pub fn merge(user: Value, schema: &Value) -> Validated {
    let mut diagnostics = Vec::new();
    let value = merge_value(user, schema, "", &mut diagnostics);
    Validated { value, diagnostics }
}

/// Apply the full default schema to a stored settings tree.
///
/// On top of [`merge`]: enumerated strings are checked against their allowed
/// values, `ignoreKeys` lists keep only strings, and site entries other than
/// [`DEFAULT_SITE_PATTERN`] are shape-checked without being filled, so their
/// unset fields fall through to lower-priority matches.
pub fn default_settings(stored: Value, platform: Platform) -> Validated {
    let schema = settings_defaults(platform);
    let mut diagnostics = Vec::new();
    let mut value = merge_value(stored, &schema, "", &mut diagnostics);

    if let Value::Object(root) = &mut value {
        check_root(root, &schema, &mut diagnostics);
    }

    Validated { value, diagnostics }
}

fn check_root(root: &mut Map<String, Value>, schema: &Value, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(Value::Object(global)) = root.get_mut("globalSettings") {
        let global_schema = &schema["globalSettings"];
        check_allowed(global, "alt", ALT_VALUES, global_schema, "globalSettings", diagnostics);
        if let Some(Value::Object(ignore_keys)) = global.get_mut("ignoreKeys") {
            sanitize_ignore_keys(ignore_keys, diagnostics);
        }
    }

    if let Some(Value::Object(sites)) = root.get_mut("localSettings") {
        let site_schema = site_defaults();
        for (pattern, entry) in sites.iter_mut() {
            let path = child_path("localSettings", pattern);
            if pattern != DEFAULT_SITE_PATTERN {
                check_site_entry(entry, &site_schema, &path, diagnostics);
            }
            if let Value::Object(fields) = entry {
                for &(field, allowed) in SITE_ENUM_FIELDS {
                    check_allowed(fields, field, allowed, &site_schema, &path, diagnostics);
                }
            }
        }
    }
}

fn merge_value(user: Value, schema: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) -> Value {
    match (user, schema) {
        (Value::Object(mut fields), Value::Object(defaults)) => {
            for (name, default) in defaults {
                let field_path = child_path(path, name);
                match fields.get_mut(name) {
                    None => {
                        fields.insert(name.clone(), default.clone());
                    }
                    Some(slot) => {
                        let current = std::mem::take(slot);
                        *slot = merge_value(current, default, &field_path, diagnostics);
                    }
                }
            }
            Value::Object(fields)
        }
        (user, schema) if Shape::of(&user) != Shape::of(schema) => {
            diagnostics.push(Diagnostic::TypeMismatch {
                path: display_path(path),
                expected: Shape::of(schema),
                found: Shape::of(&user),
            });
            schema.clone()
        }
        (user, _) => user,
    }
}

/// Shape-check the fields a site entry sets, without adding missing ones
fn check_site_entry(entry: &mut Value, schema: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let fields = match entry {
        Value::Object(fields) => fields,
        other => {
            diagnostics.push(Diagnostic::TypeMismatch {
                path: path.to_string(),
                expected: Shape::Object,
                found: Shape::of(other),
            });
            *other = Value::Object(Map::new());
            return;
        }
    };

    let Value::Object(defaults) = schema else {
        return;
    };
    for (name, slot) in fields.iter_mut() {
        if let Some(default) = defaults.get(name) {
            let current = std::mem::take(slot);
            *slot = merge_value(current, default, &child_path(path, name), diagnostics);
        }
    }
}

fn check_allowed(
    fields: &mut Map<String, Value>,
    name: &str,
    allowed: &'static [&'static str],
    schema: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(Value::String(current)) = fields.get(name) else {
        return;
    };
    if allowed.contains(&current.as_str()) {
        return;
    }
    diagnostics.push(Diagnostic::UnexpectedValue {
        path: child_path(path, name),
        value: current.clone(),
        allowed,
    });
    if let Some(default) = schema.get(name) {
        fields.insert(name.to_string(), default.clone());
    }
}

fn sanitize_ignore_keys(ignore_keys: &mut Map<String, Value>, diagnostics: &mut Vec<Diagnostic>) {
    for (mode, list) in ignore_keys.iter_mut() {
        let path = child_path("globalSettings.ignoreKeys", mode);
        let entries = match list {
            Value::Array(entries) => entries,
            other => {
                diagnostics.push(Diagnostic::TypeMismatch {
                    path,
                    expected: Shape::Array,
                    found: Shape::of(other),
                });
                *other = Value::Array(Vec::new());
                continue;
            }
        };
        entries.retain(|entry| {
            if entry.is_string() {
                return true;
            }
            diagnostics.push(Diagnostic::DroppedEntry {
                path: path.clone(),
                value: entry.to_string(),
                reason: "key notations must be strings",
            });
            false
        });
    }
}

/// `parent.name`, or `parent["name"]` when `name` is not a plain identifier
fn child_path(parent: &str, name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    match (parent.is_empty(), plain) {
        (true, true) => name.to_string(),
        (true, false) => format!("[{:?}]", name),
        (false, true) => format!("{}.{}", parent, name),
        (false, false) => format!("{}[{:?}]", parent, name),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "settings".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_fills_missing_fields() {
        let merged = merge(json!({ "a": 1 }), &json!({ "a": 0, "b": "x" }));
        assert_eq!(merged.value, json!({ "a": 1, "b": "x" }));
        assert!(merged.diagnostics.is_empty());
    }

    #[test]
    fn test_merge_replaces_mismatched_shapes() {
        let merged = merge(
            json!({ "a": "1", "b": [true], "c": {} }),
            &json!({ "a": 0, "b": false, "c": [] }),
        );
        assert_eq!(merged.value, json!({ "a": 0, "b": false, "c": [] }));
        assert_eq!(merged.diagnostics.len(), 3);
        assert_eq!(
            merged.diagnostics[0],
            Diagnostic::TypeMismatch {
                path: "a".to_string(),
                expected: Shape::Number,
                found: Shape::String,
            }
        );
    }

    #[test]
    fn test_merge_recurses_into_mappings() {
        let merged = merge(
            json!({ "outer": { "kept": true } }),
            &json!({ "outer": { "kept": false, "added": 2 } }),
        );
        assert_eq!(merged.value, json!({ "outer": { "kept": true, "added": 2 } }));
    }

    #[test]
    fn test_merge_keeps_unknown_fields() {
        let merged = merge(json!({ "extra": [1, 2] }), &json!({ "a": 0 }));
        assert_eq!(merged.value, json!({ "extra": [1, 2], "a": 0 }));
    }

    #[test]
    fn test_non_mapping_root_is_replaced() {
        let validated = default_settings(json!("nope"), Platform::Linux);
        assert_eq!(validated.value, settings_defaults(Platform::Linux));
        assert_eq!(validated.diagnostics.len(), 1);
    }

    #[test]
    fn test_empty_tree_gets_full_defaults() {
        let validated = default_settings(json!({}), Platform::Mac);
        assert!(validated.diagnostics.is_empty());
        assert_eq!(validated.value["globalSettings"]["alt"], "alphanum");
        assert_eq!(validated.value["localSettings"][".*"]["renderer"], "canvas");
    }

    #[test]
    fn test_unexpected_enum_value_is_replaced() {
        let validated = default_settings(
            json!({
                "globalSettings": { "alt": "sometimes" },
                "localSettings": { "example\\.com": { "takeover": "later" } },
            }),
            Platform::Linux,
        );
        assert_eq!(validated.value["globalSettings"]["alt"], "all");
        assert_eq!(
            validated.value["localSettings"]["example\\.com"]["takeover"],
            "always"
        );
        assert_eq!(validated.diagnostics.len(), 2);
        assert!(matches!(
            &validated.diagnostics[1],
            Diagnostic::UnexpectedValue { path, value, .. }
                if path == r#"localSettings["example\\.com"].takeover"# && value == "later"
        ));
    }

    #[test]
    fn test_other_site_entries_are_not_filled() {
        let validated = default_settings(
            json!({ "localSettings": { "example\\.com": { "renderer": "html" } } }),
            Platform::Linux,
        );
        let entry = &validated.value["localSettings"]["example\\.com"];
        assert_eq!(entry, &json!({ "renderer": "html" }));
        assert!(validated.diagnostics.is_empty());
    }

    #[test]
    fn test_site_entry_shapes_are_checked() {
        let validated = default_settings(
            json!({ "localSettings": {
                "a": { "priority": "high", "selector": "textarea" },
                "b": "not a mapping",
            } }),
            Platform::Linux,
        );
        let sites = &validated.value["localSettings"];
        assert_eq!(sites["a"], json!({ "priority": 0, "selector": "textarea" }));
        assert_eq!(sites["b"], json!({}));
        assert_eq!(validated.diagnostics.len(), 2);
    }

    #[test]
    fn test_ignore_keys_drop_non_strings() {
        let validated = default_settings(
            json!({ "globalSettings": { "ignoreKeys": {
                "normal": ["<C-n>", 3],
                "custom_mode": "<C-a>",
            } } }),
            Platform::Linux,
        );
        let ignore_keys = &validated.value["globalSettings"]["ignoreKeys"];
        assert_eq!(ignore_keys["normal"], json!(["<C-n>"]));
        assert_eq!(ignore_keys["custom_mode"], json!([]));
        assert_eq!(ignore_keys["insert"], json!([]));
        assert_eq!(validated.diagnostics.len(), 2);
    }

    #[test]
    fn test_defaulting_is_idempotent() {
        let stored = json!({
            "globalSettings": {
                "alt": 3,
                "shiftCtrl": true,
                "ignoreKeys": { "normal": ["<C-w>", null], "mystery": 1 },
                "layouts": { "default": { "1": "!" } },
            },
            "localSettings": {
                "github\\.com": { "priority": "x", "renderer": "webgl" },
                ".*": { "selector": 5 },
            },
            "unrelated": { "kept": true },
        });
        let first = default_settings(stored, Platform::Linux);
        assert!(!first.diagnostics.is_empty());

        let second = default_settings(first.value.clone(), Platform::Linux);
        assert_eq!(second.value, first.value);
        assert!(second.diagnostics.is_empty());
    }

    #[test]
    fn test_child_path_quotes_patterns() {
        assert_eq!(child_path("", "alt"), "alt");
        assert_eq!(child_path("globalSettings", "alt"), "globalSettings.alt");
        assert_eq!(child_path("localSettings", ".*"), r#"localSettings[".*"]"#);
    }
}
