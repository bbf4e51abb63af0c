//! Input Module
//!
//! Platform-agnostic input for the navigation scene: pointer capture, held
//! keys and the per-tick [`InputSnapshot`] the camera consumes. Window
//! events are translated by the host; only [`bindings`] knows about winit.
//!
//! # Example
//!
//! ```rust,ignore
//! use planetary_nav::input::{CaptureAction, InputCapture, KeyCode};
//!
//! let mut input = InputCapture::new();
//! if input.request_capture() == CaptureAction::Grab {
//!     // host grabs the cursor, then reports back
//!     input.on_capture_changed(true);
//! }
//! input.accumulate_motion(12.0, -3.0);
//! input.handle_key(KeyCode::W, true);
//!
//! let snapshot = input.snapshot(); // pointer delta is consumed here
//! ```

pub mod bindings;
pub mod capture;
pub mod keyboard;

use glam::{Vec2, Vec3};

pub use bindings::{InputAction, KeyBindings};
pub use capture::{CaptureAction, CaptureStatus, InputCapture};
pub use keyboard::{HeldKeys, KeyCode};

/// Input gathered for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Pointer motion since the previous snapshot, in pixels
    pub pointer_delta: Vec2,
    /// Held movement in camera-local axes (x = right, y = up, z = forward)
    pub movement: Vec3,
}

impl InputSnapshot {
    /// True if the snapshot would move or turn the camera.
    pub fn is_active(&self) -> bool {
        self.pointer_delta != Vec2::ZERO || self.movement != Vec3::ZERO
    }
}
