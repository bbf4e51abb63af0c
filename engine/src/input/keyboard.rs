//! Keyboard Input Module
//!
//! Tracks which keys are held, independent of the windowing system.

use std::collections::HashSet;

/// Key codes the navigation scene reacts to.
///
/// Not tied to `winit::keyboard::KeyCode`; see [`super::bindings`] for the
/// translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Space,
    ShiftLeft,
    ShiftRight,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Escape,
    F11,

    /// Catch-all for unhandled keys
    Unknown,
}

/// Set of currently held keys.
///
/// A real set rather than per-direction booleans, so releasing one of two
/// keys bound to the same direction (W and ArrowUp) keeps the other held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    keys: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release. Returns true if the set changed.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if key == KeyCode::Unknown {
            return false;
        }
        if pressed {
            self.keys.insert(key)
        } else {
            self.keys.remove(&key)
        }
    }

    #[inline]
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().copied()
    }

    /// Release everything (focus or capture lost).
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
