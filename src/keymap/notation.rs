//! Key notation strings understood by the remote editor
//!
//! Host key labels map to `<Name>` forms (`Escape` → `<Esc>`), modifiers
//! prefix the name (`<C-A-Left>`), everything else is sent literally.
//! [`parse_keys`] goes the other way, turning a notation string back into
//! host key presses.

use thiserror::Error;

use super::types::{KeyPress, Modifier, Modifiers};

/// Host labels with a bracketed notation, paired with their notation name.
/// The first entry for a name is its canonical host label.
const NON_LITERAL_KEYS: &[(&str, &str)] = &[
    (" ", "Space"),
    ("<", "lt"),
    ("\\", "Bslash"),
    ("|", "Bar"),
    ("ArrowDown", "Down"),
    ("ArrowLeft", "Left"),
    ("ArrowRight", "Right"),
    ("ArrowUp", "Up"),
    ("Backspace", "BS"),
    ("Delete", "Del"),
    ("End", "End"),
    ("Enter", "CR"),
    ("Escape", "Esc"),
    ("F1", "F1"),
    ("F2", "F2"),
    ("F3", "F3"),
    ("F4", "F4"),
    ("F5", "F5"),
    ("F6", "F6"),
    ("F7", "F7"),
    ("F8", "F8"),
    ("F9", "F9"),
    ("F10", "F10"),
    ("F11", "F11"),
    ("F12", "F12"),
    ("Home", "Home"),
    ("Insert", "Insert"),
    ("PageDown", "PageDown"),
    ("PageUp", "PageUp"),
    ("Tab", "Tab"),
];

/// Extra notation names accepted when parsing
const NAME_ALIASES: &[(&str, &str)] = &[
    ("Return", "Enter"),
    ("Enter", "Enter"),
    ("Escape", "Escape"),
    ("Backspace", "Backspace"),
    ("Delete", "Delete"),
    ("Gt", ">"),
    ("Nul", "@"),
];

/// Bracketed notation for a host key label, if it has one (`"Escape"` → `"<Esc>"`)
pub fn non_literal(key: &str) -> Option<String> {
    NON_LITERAL_KEYS
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, name)| format!("<{}>", name))
}

/// Whether a host key label has a bracketed notation
pub fn is_non_literal(key: &str) -> bool {
    NON_LITERAL_KEYS.iter().any(|(label, _)| *label == key)
}

/// Notation for a key with no modifiers applied yet
pub fn translate_key(key: &str) -> String {
    non_literal(key).unwrap_or_else(|| key.to_string())
}

/// Prepend a modifier letter to a notation.
///
/// `text` may be a literal (`a`), a bracketed name (`<Esc>`) or an already
/// modified key (`<A-Left>`); the result always has the form `<X-...>`.
pub fn add_modifier(modifier: char, text: &str) -> String {
    let inner = text
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|inner| !inner.is_empty())
        .unwrap_or(text);
    format!("<{}-{}>", modifier, inner)
}

/// Errors from parsing a notation string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("unterminated '<' at byte {0}")]
    Unterminated(usize),
    #[error("empty key name in {0:?}")]
    EmptyKey(String),
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
}

/// Split a notation string into host key presses.
///
/// `"ab<C-w><lt>"` yields `a`, `b`, Control+`w`, `<`. A `<` that does not
/// start a recognised `<...>` group is an error rather than a literal; use
/// `<lt>` for a literal less-than.
pub fn parse_keys(notation: &str) -> Result<Vec<KeyPress>, NotationError> {
    let mut presses = Vec::new();
    let mut rest = notation;
    let mut offset = 0;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let Some(mut end) = rest[1..].find('>') else {
                return Err(NotationError::Unterminated(offset));
            };
            // `<C->>` names the '>' key itself
            if rest[1..1 + end].ends_with('-') && rest[end + 2..].starts_with('>') {
                end += 1;
            }
            let group = &rest[1..1 + end];
            presses.push(parse_group(group)?);
            let consumed = end + 2;
            rest = &rest[consumed..];
            offset += consumed;
        } else {
            presses.push(KeyPress::new(c.to_string(), Modifiers::NONE));
            rest = &rest[c.len_utf8()..];
            offset += c.len_utf8();
        }
    }

    Ok(presses)
}

fn parse_group(group: &str) -> Result<KeyPress, NotationError> {
    if group.is_empty() {
        return Err(NotationError::EmptyKey(format!("<{}>", group)));
    }

    let mut mods = Modifiers::NONE;
    let mut rest = group;
    loop {
        let run = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        let Some(key_part) = rest[run..].strip_prefix('-') else {
            break;
        };
        if run == 0 || key_part.is_empty() {
            break;
        }
        let Some(run_mods) = modifier_run(&rest[..run]) else {
            break;
        };
        mods = mods | run_mods;
        rest = key_part;
    }

    let key = key_label(rest).ok_or_else(|| NotationError::UnknownKey(rest.to_string()))?;
    Ok(KeyPress::new(key, mods))
}

fn modifier_run(run: &str) -> Option<Modifiers> {
    run.chars().try_fold(Modifiers::NONE, |acc, c| {
        let modifier = match c.to_ascii_uppercase() {
            'A' | 'M' => Modifier::Alt,
            'C' => Modifier::Control,
            'D' => Modifier::Meta,
            'S' => Modifier::Shift,
            _ => return None,
        };
        Some(acc | Modifiers::from(modifier))
    })
}

/// Host key label for the key part of a `<...>` group
fn key_label(name: &str) -> Option<String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c.to_string());
    }

    if let Some((label, _)) = NON_LITERAL_KEYS
        .iter()
        .find(|(_, notation)| notation.eq_ignore_ascii_case(name))
    {
        return Some(label.to_string());
    }

    NAME_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, label)| label.to_string())
}
