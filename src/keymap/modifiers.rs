//! Folding held modifiers into a key notation

use super::notation::add_modifier;
use super::types::{Modifier, Modifiers};

/// Apply held modifiers to a base notation.
///
/// Modifiers are tested Alt, Control, OS, Meta, then Shift (only when
/// `include_shift` is set). Each one is prepended, so `a` with Alt and
/// Control held becomes `<C-A-a>`. OS and Meta share the `D` slot and
/// produce at most one prefix.
pub fn compose(base: &str, mods: Modifiers, include_shift: bool) -> String {
    let mut text = base.to_string();
    let mut meta_slot_used = false;

    for modifier in Modifier::COMPOSE_ORDER {
        if !mods.held(modifier) {
            continue;
        }
        if matches!(modifier, Modifier::Os | Modifier::Meta) {
            if meta_slot_used {
                continue;
            }
            meta_slot_used = true;
        }
        text = add_modifier(modifier.notation(), &text);
    }

    if include_shift && mods.shift() {
        text = add_modifier(Modifier::Shift.notation(), &text);
    }

    text
}
