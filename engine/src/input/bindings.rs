//! Input Bindings Module
//!
//! Maps physical keys to logical navigation actions and translates winit key
//! codes into the scene's own [`KeyCode`].

use std::collections::HashMap;

use glam::Vec3;

use super::keyboard::{HeldKeys, KeyCode};

/// Logical actions the navigation scene understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Fly along the view direction (default: W, ArrowUp)
    MoveForward,
    /// Fly backwards (default: S, ArrowDown)
    MoveBack,
    /// Strafe left (default: A, ArrowLeft)
    MoveLeft,
    /// Strafe right (default: D, ArrowRight)
    MoveRight,
    /// Rise along the local up axis (default: Space)
    MoveUp,
    /// Sink along the local up axis (default: Shift)
    MoveDown,
    /// Give the pointer back to the host (default: Escape)
    ReleaseCapture,
    /// Toggle fullscreen presentation (default: F11)
    ToggleFullscreen,
}

/// Key to action table. Several keys may drive the same action.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    key_to_action: HashMap<KeyCode, InputAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    /// Default flight layout: WASD and arrows, Space/Shift for vertical.
    pub fn new() -> Self {
        let mut bindings = Self {
            key_to_action: HashMap::new(),
        };

        bindings.bind(KeyCode::W, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::S, InputAction::MoveBack);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBack);
        bindings.bind(KeyCode::A, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::D, InputAction::MoveRight);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);
        bindings.bind(KeyCode::Space, InputAction::MoveUp);
        bindings.bind(KeyCode::ShiftLeft, InputAction::MoveDown);
        bindings.bind(KeyCode::ShiftRight, InputAction::MoveDown);
        bindings.bind(KeyCode::Escape, InputAction::ReleaseCapture);
        bindings.bind(KeyCode::F11, InputAction::ToggleFullscreen);

        bindings
    }

    /// Bind a key to an action, replacing any previous action for that key.
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.key_to_action.insert(key, action);
    }

    pub fn unbind_key(&mut self, key: KeyCode) {
        self.key_to_action.remove(&key);
    }

    pub fn get_action(&self, key: KeyCode) -> Option<InputAction> {
        self.key_to_action.get(&key).copied()
    }

    /// True if any held key maps to `action`.
    pub fn is_action_held(&self, action: InputAction, held: &HeldKeys) -> bool {
        held.iter().any(|key| self.get_action(key) == Some(action))
    }

    /// Movement intent in camera-local axes: x = right, y = up, z = forward.
    /// Each component is -1, 0 or 1; opposing keys cancel.
    pub fn movement_axes(&self, held: &HeldKeys) -> Vec3 {
        let axis = |positive, negative| {
            let p = self.is_action_held(positive, held) as i32;
            let n = self.is_action_held(negative, held) as i32;
            (p - n) as f32
        };
        Vec3::new(
            axis(InputAction::MoveRight, InputAction::MoveLeft),
            axis(InputAction::MoveUp, InputAction::MoveDown),
            axis(InputAction::MoveForward, InputAction::MoveBack),
        )
    }
}

impl From<winit::keyboard::KeyCode> for KeyCode {
    fn from(code: winit::keyboard::KeyCode) -> Self {
        use winit::keyboard::KeyCode as W;
        match code {
            W::KeyW => KeyCode::W,
            W::KeyA => KeyCode::A,
            W::KeyS => KeyCode::S,
            W::KeyD => KeyCode::D,
            W::Space => KeyCode::Space,
            W::ShiftLeft => KeyCode::ShiftLeft,
            W::ShiftRight => KeyCode::ShiftRight,
            W::ArrowUp => KeyCode::ArrowUp,
            W::ArrowDown => KeyCode::ArrowDown,
            W::ArrowLeft => KeyCode::ArrowLeft,
            W::ArrowRight => KeyCode::ArrowRight,
            W::Escape => KeyCode::Escape,
            W::F11 => KeyCode::F11,
            _ => KeyCode::Unknown,
        }
    }
}
