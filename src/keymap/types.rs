//! Core types for key translation: Modifiers, RawKeyEvent, Mode

use std::fmt;

/// A single modifier key as reported by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Alt,
    Control,
    /// The OS/"super" key (Windows key, Command on macOS)
    Os,
    Meta,
    Shift,
}

impl Modifier {
    /// Order in which modifiers are folded into a notation string.
    /// OS must come before Meta: both share the `D` slot.
    pub const COMPOSE_ORDER: [Modifier; 4] =
        [Modifier::Alt, Modifier::Control, Modifier::Os, Modifier::Meta];

    /// Host key label of the modifier itself
    pub const fn label(self) -> &'static str {
        match self {
            Modifier::Alt => "Alt",
            Modifier::Control => "Control",
            Modifier::Os => "OS",
            Modifier::Meta => "Meta",
            Modifier::Shift => "Shift",
        }
    }

    /// Letter used for this modifier inside a `<X-key>` notation
    pub const fn notation(self) -> char {
        match self {
            Modifier::Alt => 'A',
            Modifier::Control => 'C',
            Modifier::Os | Modifier::Meta => 'D',
            Modifier::Shift => 'S',
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Modifier::Control => 0b0_0001,
            Modifier::Shift => 0b0_0010,
            Modifier::Alt => 0b0_0100,
            Modifier::Meta => 0b0_1000,
            Modifier::Os => 0b1_0000,
        }
    }
}

/// Modifier keys held during an event, as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(Modifier::Control.bit());
    pub const SHIFT: Modifiers = Modifiers(Modifier::Shift.bit());
    pub const ALT: Modifiers = Modifiers(Modifier::Alt.bit());
    pub const META: Modifiers = Modifiers(Modifier::Meta.bit());
    pub const OS: Modifiers = Modifiers(Modifier::Os.bit());

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool, os: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= Modifier::Control.bit();
        }
        if shift {
            bits |= Modifier::Shift.bit();
        }
        if alt {
            bits |= Modifier::Alt.bit();
        }
        if meta {
            bits |= Modifier::Meta.bit();
        }
        if os {
            bits |= Modifier::Os.bit();
        }
        Modifiers(bits)
    }

    /// The per-modifier "is currently held" query
    #[inline]
    pub const fn held(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.held(Modifier::Control)
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.held(Modifier::Shift)
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.held(Modifier::Alt)
    }

    /// Meta or OS held; both map to the same notation slot
    #[inline]
    pub const fn meta(self) -> bool {
        self.held(Modifier::Meta) || self.held(Modifier::Os)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Any modifier other than Shift is held
    #[inline]
    pub const fn has_command_modifier(self) -> bool {
        self.0 & !Modifier::Shift.bit() != 0
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        Modifiers(modifier.bit())
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [
            Modifier::Control,
            Modifier::Shift,
            Modifier::Alt,
            Modifier::Meta,
            Modifier::Os,
        ]
        .into_iter()
        .filter(|m| self.held(*m))
        .map(Modifier::label)
        .collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// Key labels that name a modifier key. A bare modifier press never translates.
pub const MODIFIER_KEY_LABELS: &[&str] = &[
    "Alt", "AltGraph", "Control", "Shift", "OS", "Meta", "Super", "Hyper", "Fn",
];

/// Whether a raw key label is itself a modifier key
pub fn is_modifier_label(key: &str) -> bool {
    MODIFIER_KEY_LABELS.contains(&key)
}

/// A keyboard event as delivered by the host platform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Key label (`"a"`, `"@"`, `"ArrowLeft"`, `"Escape"`, ...)
    pub key: String,
    /// Originates from genuine user interaction
    pub trusted: bool,
    pub modifiers: Modifiers,
}

impl RawKeyEvent {
    /// A trusted event
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            trusted: true,
            modifiers,
        }
    }

    /// A trusted event with no modifiers
    pub fn key(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// An event synthesized by a script rather than the user
    pub fn synthetic(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            trusted: false,
            modifiers,
        }
    }

    /// The key label as a single character, if it is one
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for RawKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{:?}", self.key)
        } else {
            write!(f, "{}+{:?}", self.modifiers, self.key)
        }
    }
}

/// A key press reconstructed from notation, in host vocabulary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

/// Opaque token naming the remote editor's current input mode
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mode(String);

impl Mode {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self("normal".to_string())
    }
}

impl From<&str> for Mode {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Mode {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
