//! Centralized configuration paths for keybridge
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/keybridge/`
//! - Windows: `%APPDATA%\keybridge\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "keybridge";

/// Prefix of the daily-rotated log files (`keybridge.log.YYYY-MM-DD`)
pub const LOG_FILE_PREFIX: &str = "keybridge.log";

/// Base config directory
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/keybridge`
///   - Else: `~/.config/keybridge`
///
/// Windows:
///   - `%APPDATA%\keybridge`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/keybridge/settings.yaml`
pub fn settings_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("settings.yaml"))
}

/// `~/.config/keybridge/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Most recent log file, or the base name when none exist yet
pub fn log_file() -> Option<PathBuf> {
    let logs_dir = logs_dir()?;

    let newest = fs::read_dir(&logs_dir)
        .ok()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        // YYYY-MM-DD suffixes sort chronologically
        .max();

    newest.or_else(|| Some(logs_dir.join(LOG_FILE_PREFIX)))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&logs)?;
    Ok(logs)
}
