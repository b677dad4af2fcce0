//! Command-line interface
//!
//! Supports:
//! - Checking a settings file and printing the defaulted tree
//! - Resolving the site configuration for a URL
//! - Translating key specs read from stdin
//! - Splitting a notation string into key presses

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keybridge::keymap::{KeyOutcome, KeyPress, Modifiers, RawKeyEvent};

/// Translate keyboard events to modal-editor key notation
#[derive(Parser, Debug)]
#[command(name = "keybridge", version, about = "Keyboard events to modal-editor key notation")]
pub struct CliArgs {
    /// Settings file (defaults to ~/.config/keybridge/settings.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load settings, report problems and print the defaulted tree
    Check,
    /// Print the effective site configuration for a URL
    Resolve {
        url: String,
    },
    /// Translate key specs such as `ctrl+shift+@`, one per stdin line
    Translate {
        /// Editor mode used for ignore lists
        #[arg(short, long, default_value = "normal")]
        mode: String,
        /// Reload settings when the file changes
        #[arg(short, long)]
        watch: bool,
    },
    /// Split a notation string such as `<C-w>j` into key presses
    Keys {
        notation: String,
    },
}

/// Parse a key spec: modifier names and a key joined by `+`.
///
/// Modifier names are case-insensitive: `ctrl`/`control`, `shift`,
/// `alt`/`option`, `meta`, `super`/`os`/`cmd`. A trailing `+` names the
/// plus key itself (`ctrl++`). `space` names the space bar.
pub fn parse_key_spec(spec: &str) -> Result<RawKeyEvent, String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err("empty key spec".to_string());
    }

    let (mods_part, key) = match spec.strip_suffix("++") {
        Some(mods) => (Some(mods), "+"),
        None if spec == "+" => (None, "+"),
        None => match spec.rsplit_once('+') {
            Some((mods, key)) => (Some(mods), key),
            None => (None, spec),
        },
    };

    if key.is_empty() {
        return Err(format!("missing key in {:?}", spec));
    }

    let mut mods = Modifiers::NONE;
    for name in mods_part.into_iter().flat_map(|part| part.split('+')) {
        mods = mods
            | match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "shift" => Modifiers::SHIFT,
                "alt" | "option" => Modifiers::ALT,
                "meta" => Modifiers::META,
                "super" | "os" | "cmd" => Modifiers::OS,
                _ => return Err(format!("unknown modifier {:?} in {:?}", name, spec)),
            };
    }

    let key = if key.eq_ignore_ascii_case("space") {
        " "
    } else {
        key
    };
    Ok(RawKeyEvent::new(key, mods))
}

/// One line of `translate` output
pub fn describe_outcome(outcome: &KeyOutcome) -> String {
    match outcome {
        KeyOutcome::Emitted(notation) => notation.clone(),
        KeyOutcome::Ignored(notation) => format!("{} (ignored)", notation),
        KeyOutcome::Declined => "(declined)".to_string(),
    }
}

/// One line of `keys` output
pub fn describe_press(press: &KeyPress) -> String {
    let key = if press.key == " " { "Space" } else { &press.key };
    if press.modifiers.is_empty() {
        key.to_string()
    } else {
        format!("{}+{}", press.modifiers, key)
    }
}
