//! Adapter from winit keyboard and IME events to host-neutral events

use winit::event::Ime;
use winit::keyboard::{Key, ModifiersState, NamedKey};

use super::composition::SurfaceEvent;
use super::types::{Modifiers, RawKeyEvent};

/// Convert a winit logical key plus modifier state to a [`RawKeyEvent`].
///
/// Key labels follow DOM `KeyboardEvent.key` naming (`ArrowLeft`, `Escape`,
/// `" "` for space). Returns `None` for keys with no label.
pub fn raw_event_from_winit(key: &Key, state: ModifiersState) -> Option<RawKeyEvent> {
    let label = match key {
        Key::Character(text) => text.to_string(),
        Key::Named(named) => named_label(*named)?.to_string(),
        Key::Dead(_) | Key::Unidentified(_) => return None,
    };

    let mods = Modifiers::new(
        state.control_key(),
        state.shift_key(),
        state.alt_key(),
        false,
        state.super_key(),
    );

    Some(RawKeyEvent::new(label, mods))
}

fn named_label(key: NamedKey) -> Option<&'static str> {
    let label = match key {
        NamedKey::Space => " ",
        NamedKey::Enter => "Enter",
        NamedKey::Escape => "Escape",
        NamedKey::Tab => "Tab",
        NamedKey::Backspace => "Backspace",
        NamedKey::Delete => "Delete",
        NamedKey::Insert => "Insert",

        NamedKey::ArrowUp => "ArrowUp",
        NamedKey::ArrowDown => "ArrowDown",
        NamedKey::ArrowLeft => "ArrowLeft",
        NamedKey::ArrowRight => "ArrowRight",
        NamedKey::Home => "Home",
        NamedKey::End => "End",
        NamedKey::PageUp => "PageUp",
        NamedKey::PageDown => "PageDown",

        NamedKey::F1 => "F1",
        NamedKey::F2 => "F2",
        NamedKey::F3 => "F3",
        NamedKey::F4 => "F4",
        NamedKey::F5 => "F5",
        NamedKey::F6 => "F6",
        NamedKey::F7 => "F7",
        NamedKey::F8 => "F8",
        NamedKey::F9 => "F9",
        NamedKey::F10 => "F10",
        NamedKey::F11 => "F11",
        NamedKey::F12 => "F12",

        // Bare modifier presses; the translator declines them
        NamedKey::Alt => "Alt",
        NamedKey::AltGraph => "AltGraph",
        NamedKey::Control => "Control",
        NamedKey::Shift => "Shift",
        NamedKey::Super => "OS",
        NamedKey::Meta => "Meta",
        NamedKey::Hyper => "Hyper",
        NamedKey::Fn => "Fn",

        _ => return None,
    };
    Some(label)
}

/// Convert a winit IME event to a text-surface event.
///
/// winit reports the committed text after clearing the preedit, which
/// matches [`CompositionOrder::EndAfterInput`](super::CompositionOrder).
pub fn surface_event_from_ime(ime: &Ime) -> Option<SurfaceEvent> {
    match ime {
        Ime::Preedit(text, _) if !text.is_empty() => Some(SurfaceEvent::composing(text.clone())),
        Ime::Commit(text) => Some(SurfaceEvent::end(text.clone())),
        Ime::Enabled | Ime::Preedit(..) | Ime::Disabled => None,
    }
}
