//! Persistent key-value settings storage
//!
//! The stored object has two top-level keys, `globalSettings` and
//! `localSettings`. Anything else is carried along untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Source of the stored settings object
pub trait SettingsStore {
    /// Every stored top-level key. An empty store reads as an empty map.
    fn read_all(&self) -> Result<Map<String, Value>>;
}

/// YAML settings file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/keybridge/settings.yaml`, when a config dir exists
    pub fn default_location() -> Option<Self> {
        crate::config_paths::settings_file().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole file with `settings`
    pub fn write_all(&self, settings: &Map<String, Value>) -> Result<()> {
        let yaml = serde_yaml::to_string(settings).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, yaml).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for FileStore {
    fn read_all(&self) -> Result<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", self.path.display());
                return Ok(Map::new());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        match yaml_to_json(yaml) {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(ConfigError::NotAMapping),
        }
    }
}

/// In-memory store, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl MemoryStore {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }
}

impl SettingsStore for MemoryStore {
    fn read_all(&self) -> Result<Map<String, Value>> {
        Ok(self.values.clone())
    }
}

/// Convert YAML into the JSON data model. Non-string mapping keys (`1: "!"`
/// in a layout) become their string form.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Null => "null".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// One top-level key whose stored value changed
#[derive(Debug, Clone, PartialEq)]
pub struct KeyChange {
    pub key: String,
    /// New value; `Value::Null` when the key was removed
    pub value: Value,
}

/// Top-level keys that differ between two reads of the store
pub fn changed_keys(old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<KeyChange> {
    let mut changes: Vec<KeyChange> = new
        .iter()
        .filter(|(key, value)| old.get(*key) != Some(*value))
        .map(|(key, value)| KeyChange {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();

    changes.extend(
        old.keys()
            .filter(|key| !new.contains_key(*key))
            .map(|key| KeyChange {
                key: key.clone(),
                value: Value::Null,
            }),
    );

    changes
}
