//! Key translation core
//!
//! This module turns host keyboard events into the key notation strings the
//! remote editor understands:
//! - Non-literal keys get bracketed names (`Escape` → `<Esc>`)
//! - Held modifiers prefix the name in a fixed order (`<C-A-Left>`)
//! - Shifted punctuation is resolved against the active keyboard layout
//! - Per-mode ignore lists suppress chosen notations
//!
//! Text insertion and IME compositions bypass translation and are forwarded
//! verbatim through the [`CompositionBridge`].
//!
//! # Architecture
//!
//! ```text
//! RawKeyEvent  → KeyTranslator::translate() → KeyOutcome   ─┐
//!                  (GlobalSettings, LayoutMapper, Mode)       ├→ InputSink::input(text)
//! SurfaceEvent → CompositionBridge::handle() → TextOutcome ─┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let context = Arc::new(SettingsContext::default());
//! context.load_from(&FileStore::new("settings.yaml"))?;
//!
//! let mut handler = InputHandler::new(context, CompositionOrder::default());
//! handler.on_translated(|text: &str| editor.input(text));
//! handler.handle_key(&RawKeyEvent::new("w", Modifiers::CTRL))?;
//! ```

mod composition;
mod handler;
mod layout;
mod modifiers;
mod notation;
mod translator;
mod types;
#[cfg(feature = "winit")]
mod winit_adapter;

pub use composition::{
    CompositionBridge, CompositionOrder, CompositionState, SurfaceEvent, TextOutcome,
};
pub use handler::{ChannelSink, InputHandler, InputSink};
pub use layout::{validate_layout, LayoutMap, LayoutMapper, MappableKey, DEFAULT_LAYOUT};
pub use modifiers::compose;
pub use notation::{
    add_modifier, is_non_literal, non_literal, parse_keys, translate_key, NotationError,
};
pub use translator::{KeyOutcome, KeyTranslator};
pub use types::{
    is_modifier_label, KeyPress, Mode, Modifier, Modifiers, RawKeyEvent, MODIFIER_KEY_LABELS,
};
#[cfg(feature = "winit")]
pub use winit_adapter::{raw_event_from_winit, surface_event_from_ime};
