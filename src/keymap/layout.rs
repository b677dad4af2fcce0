//! Keyboard layouts: which unshifted key produces which shifted character
//!
//! A configured layout either validates completely or is discarded in favour
//! of the built-in US layout. There is no partial repair.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::settings::{Diagnostic, LayoutViolation};

/// Built-in layout (US), as `(unshifted, shifted)` pairs
pub const DEFAULT_LAYOUT: &[(char, char)] = &[
    ('`', '~'),
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
    ('9', '('),
    ('0', ')'),
    ('-', '_'),
    ('=', '+'),
    ('[', '{'),
    (']', '}'),
    ('\\', '|'),
    (';', ':'),
    ('\'', '"'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
];

/// A printable, shift-sensitive character that layouts may map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappableKey(char);

impl MappableKey {
    /// `Some` when `c` belongs to the fixed set
    pub fn new(c: char) -> Option<Self> {
        Self::contains(c).then_some(Self(c))
    }

    pub fn contains(c: char) -> bool {
        DEFAULT_LAYOUT
            .iter()
            .any(|&(unshifted, shifted)| unshifted == c || shifted == c)
    }

    /// Every member of the set
    pub fn all() -> impl Iterator<Item = MappableKey> {
        DEFAULT_LAYOUT
            .iter()
            .flat_map(|&(unshifted, shifted)| [Self(unshifted), Self(shifted)])
    }

    pub const fn as_char(self) -> char {
        self.0
    }

    fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => None,
        }
    }
}

impl fmt::Display for MappableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated mapping: pressing Shift with the key produces the value
pub type LayoutMap = IndexMap<MappableKey, MappableKey>;

/// Validate a configured layout object.
///
/// Every key and value must be a single [`MappableKey`], and no shifted
/// value may be claimed twice.
pub fn validate_layout(layout: &Value) -> Result<LayoutMap, LayoutViolation> {
    let Value::Object(entries) = layout else {
        return Err(LayoutViolation::NotAMapping);
    };

    let mut map = LayoutMap::with_capacity(entries.len());
    let mut claimed: HashMap<MappableKey, MappableKey> = HashMap::new();

    for (key, value) in entries {
        let unshifted =
            MappableKey::parse(key).ok_or_else(|| LayoutViolation::UnknownKey(key.clone()))?;
        let Value::String(value) = value else {
            return Err(LayoutViolation::NonStringValue(key.clone()));
        };
        let shifted = MappableKey::parse(value).ok_or_else(|| LayoutViolation::UnknownShifted {
            key: key.clone(),
            value: value.clone(),
        })?;
        if let Some(previous) = claimed.insert(shifted, unshifted) {
            return Err(LayoutViolation::DuplicateShifted {
                value: shifted.as_char(),
                first: previous.as_char(),
                second: unshifted.as_char(),
            });
        }
        map.insert(unshifted, shifted);
    }

    Ok(map)
}

/// Bidirectional shifted/unshifted lookup for the active layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMapper {
    to_shifted: HashMap<char, char>,
    to_unshifted: HashMap<char, char>,
    custom: bool,
}

impl LayoutMapper {
    /// The built-in US layout
    pub fn builtin() -> Self {
        let map = DEFAULT_LAYOUT
            .iter()
            .map(|&(unshifted, shifted)| (MappableKey(unshifted), MappableKey(shifted)))
            .collect();
        Self::from_map(&map, false)
    }

    fn from_map(map: &LayoutMap, custom: bool) -> Self {
        let to_shifted = map
            .iter()
            .map(|(unshifted, shifted)| (unshifted.as_char(), shifted.as_char()))
            .collect();
        let to_unshifted = map
            .iter()
            .map(|(unshifted, shifted)| (shifted.as_char(), unshifted.as_char()))
            .collect();
        Self {
            to_shifted,
            to_unshifted,
            custom,
        }
    }

    /// Build the mapper for a configured layout.
    ///
    /// `None` selects the built-in layout silently. An invalid layout also
    /// selects the built-in one and reports why.
    pub fn from_config(name: &str, layout: Option<&Value>) -> (Self, Vec<Diagnostic>) {
        let Some(layout) = layout else {
            return (Self::builtin(), Vec::new());
        };

        match validate_layout(layout) {
            Ok(map) => (Self::from_map(&map, true), Vec::new()),
            Err(reason) => (
                Self::builtin(),
                vec![Diagnostic::InvalidLayout {
                    layout: name.to_string(),
                    reason,
                }],
            ),
        }
    }

    /// Whether `shifted` is produced by Shift plus some other key
    pub fn has_unshifted(&self, shifted: char) -> bool {
        self.to_unshifted.contains_key(&shifted)
    }

    /// The key that produces `shifted`, or `shifted` itself when unmapped
    pub fn unshifted_of(&self, shifted: char) -> char {
        self.to_unshifted.get(&shifted).copied().unwrap_or(shifted)
    }

    /// The character Shift plus `unshifted` produces
    pub fn shifted_of(&self, unshifted: char) -> Option<char> {
        self.to_shifted.get(&unshifted).copied()
    }

    /// Whether a configured layout is in use
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn len(&self) -> usize {
        self.to_shifted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_shifted.is_empty()
    }
}

impl Default for LayoutMapper {
    fn default() -> Self {
        Self::builtin()
    }
}
