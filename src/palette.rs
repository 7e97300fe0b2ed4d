//! Color palettes.

use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Named colors used when a palette is created with [`Palette::default_colors`].
pub const DEFAULT_COLORS: [&str; 10] = [
    "red", "blue", "yellow", "green", "orange", "purple", "cyan", "magenta", "brown", "gray",
];

/// `K` ordered color slots, indexed `0..K`, optionally named.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    size: usize,
    names: Option<Vec<String>>,
}

/// What a vertex is colored with: the palette name if there is one,
/// the slot index otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorLabel {
    Named(String),
    Slot(usize),
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Slot(i) => write!(f, "{}", i),
        }
    }
}

impl Palette {
    /// Palette of `k` anonymous slots.
    pub fn new(k: usize) -> Self {
        Self {
            size: k,
            names: None,
        }
    }

    /// Palette with one slot per name.
    pub fn named<S: ToString>(names: &[S]) -> Self {
        Self {
            size: names.len(),
            names: Some(names.iter().map(ToString::to_string).collect()),
        }
    }

    /// `k` slots named after [`DEFAULT_COLORS`]; slots past the tenth are anonymous.
    pub fn default_colors(k: usize) -> Self {
        Self::named(&DEFAULT_COLORS[..]).with_len(k)
    }

    /// Same names, `k` slots. Names beyond `k` are dropped, missing ones
    /// give anonymous slots.
    pub fn with_len(mut self, k: usize) -> Self {
        if let Some(names) = &mut self.names {
            names.truncate(k);
        }
        self.size = k;
        self
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn name(&self, slot: usize) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(slot))
            .map(String::as_str)
    }

    pub fn label(&self, slot: usize) -> ColorLabel {
        match self.name(slot) {
            Some(name) => ColorLabel::Named(name.to_string()),
            None => ColorLabel::Slot(slot),
        }
    }

    /// Fill color used when drawing `slot`.
    pub(crate) fn fill(&self, slot: usize) -> String {
        match self.name(slot) {
            Some(name) => name.to_string(),
            // Spread anonymous slots around the hue circle.
            None => {
                let hue = (slot * 360) / self.size.max(1);
                format!("hsl({}, 70%, 60%)", hue)
            }
        }
    }
}
