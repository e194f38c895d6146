//! Identity caches: string keys mapped to palette colors for the lifetime
//! of a session.
//!
//! Resources are rebuilt on every refresh, so a user's color has to live
//! somewhere that outlives them. Assignments only ever grow: a key that
//! disappears from the data keeps its color, and its palette slot is not
//! handed to anyone else until the cursor wraps around.

use std::collections::HashMap;

use clusterart_core::Color;

/// Key → color map with a monotonically increasing palette cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityCache {
    assigned: HashMap<String, Color>,
    cursor: usize,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `key`, assigning the next palette entry if it is new.
    pub fn assign(&mut self, key: &str, palette: &[Color]) -> Color {
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }
        let color = palette[self.cursor % palette.len()];
        self.cursor += 1;
        self.assigned.insert(key.to_string(), color);
        color
    }

    pub fn get(&self, key: &str) -> Option<Color> {
        self.assigned.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Number of palette entries handed out so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.assigned.clear();
        self.cursor = 0;
    }
}

/// The caches shared by every color strategy instance in a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorCaches {
    /// occupant → color
    pub occupants: IdentityCache,
    /// unrecognized host status → color
    pub statuses: IdentityCache,
}

impl ColorCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.occupants.clear();
        self.statuses.clear();
    }
}
