//! keybridge - keyboard events to modal-editor key notation
//!
//! This crate translates host keyboard events into the key notation strings
//! a remote modal editor expects (`<C-w>`, `<S-Tab>`, `<lt>`), and resolves
//! the per-site configuration that parameterizes the translation.

pub mod config_paths;
pub mod error;
pub mod keymap;
pub mod settings;
pub mod tracing;

// Re-export commonly used types
pub use error::{ConfigError, Result};
pub use keymap::{InputHandler, KeyOutcome, KeyTranslator, Mode, Modifiers, RawKeyEvent};
pub use settings::{Settings, SettingsContext, SiteConfig};
