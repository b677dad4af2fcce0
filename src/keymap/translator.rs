//! Raw key event → notation string
//!
//! One call per host event. Every event ends in exactly one [`KeyOutcome`];
//! nothing here can fail.

use super::layout::LayoutMapper;
use super::modifiers::compose;
use super::notation::{is_non_literal, translate_key};
use super::types::{is_modifier_label, Mode, RawKeyEvent};
use crate::settings::{AltPolicy, GlobalSettings};

/// What happened to a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Send the notation; the host's default action must be suppressed
    Emitted(String),
    /// Translated, but listed in the mode's ignore list. Nothing is sent and
    /// the host keeps its default action.
    Ignored(String),
    /// Not a key event; left for raw text capture
    Declined,
}

impl KeyOutcome {
    /// Whether the host event's default action and propagation must be stopped
    pub fn prevents_default(&self) -> bool {
        matches!(self, KeyOutcome::Emitted(_))
    }

    /// The emitted notation, if any
    pub fn notation(&self) -> Option<&str> {
        match self {
            KeyOutcome::Emitted(notation) => Some(notation),
            _ => None,
        }
    }
}

/// Translates events against one settings snapshot
#[derive(Debug, Clone, Copy)]
pub struct KeyTranslator<'a> {
    settings: &'a GlobalSettings,
    layout: &'a LayoutMapper,
}

impl<'a> KeyTranslator<'a> {
    pub fn new(settings: &'a GlobalSettings, layout: &'a LayoutMapper) -> Self {
        Self { settings, layout }
    }

    pub fn translate(&self, event: &RawKeyEvent, mode: &Mode) -> KeyOutcome {
        let mods = event.modifiers;

        // Alt+punctuation produces characters on some platforms (macOS
        // option key); those arrive as text instead
        if mods.alt()
            && self.settings.alt == AltPolicy::Alphanum
            && !event.key.chars().any(|c| c.is_ascii_alphanumeric())
        {
            tracing::trace!(%event, "declined: alt policy is alphanum");
            return KeyOutcome::Declined;
        }

        if !event.trusted || is_modifier_label(&event.key) {
            tracing::trace!(%event, "declined: untrusted or bare modifier");
            return KeyOutcome::Declined;
        }

        if !is_non_literal(&event.key) && !mods.has_command_modifier() {
            tracing::trace!(%event, "declined: literal key");
            return KeyOutcome::Declined;
        }

        let (base, include_shift) = match event.single_char() {
            Some(c) if self.layout.has_unshifted(c) && !self.shift_flag(event) => {
                (translate_key(&event.key), false)
            }
            Some(c) => (translate_key(&self.layout.unshifted_of(c).to_string()), true),
            None => (translate_key(&event.key), true),
        };

        let notation = compose(&base, mods, include_shift);

        if self.settings.is_ignored(&notation, mode) {
            tracing::debug!(%notation, %mode, "ignored");
            return KeyOutcome::Ignored(notation);
        }

        tracing::debug!(%notation, %mode, "emitted");
        KeyOutcome::Emitted(notation)
    }

    /// The shift-interaction flag for the held combination
    fn shift_flag(&self, event: &RawKeyEvent) -> bool {
        let mods = event.modifiers;
        match (mods.shift(), mods.alt(), mods.ctrl()) {
            (true, true, true) => self.settings.shift_alt_ctrl,
            (true, true, false) => self.settings.shift_alt,
            (true, false, true) => self.settings.shift_ctrl,
            _ => false,
        }
    }
}
