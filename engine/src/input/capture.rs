//! Pointer Capture
//!
//! Owns the pointer capture lifecycle and the raw look input that flows while
//! capture is held. The scene never grabs the cursor itself: it returns a
//! [`CaptureAction`] for the host to perform and learns the outcome through
//! [`InputCapture::on_capture_changed`].

use glam::{Vec2, Vec3};

use super::bindings::KeyBindings;
use super::keyboard::{HeldKeys, KeyCode};
use super::InputSnapshot;

/// Where the capture lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureStatus {
    /// Pointer belongs to the host
    #[default]
    Released,
    /// Capture requested, waiting for the host to answer
    Pending,
    /// Raw pointer motion is routed to the scene
    Captured,
    /// The last request was refused; try again on the next click
    Denied,
}

/// What the host should do to the window after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    /// Nothing to do
    None,
    /// Grab and hide the cursor, then report back via `on_capture_changed`
    Grab,
    /// Ungrab and show the cursor
    Release,
}

/// Capture state, held keys and the pointer-delta accumulator.
#[derive(Debug, Clone, Default)]
pub struct InputCapture {
    status: CaptureStatus,
    delta: Vec2,
    held: HeldKeys,
    bindings: KeyBindings,
}

impl InputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for pointer capture. Idempotent: returns [`CaptureAction::None`]
    /// while a request is pending or capture is already held.
    pub fn request_capture(&mut self) -> CaptureAction {
        match self.status {
            CaptureStatus::Captured | CaptureStatus::Pending => CaptureAction::None,
            CaptureStatus::Released | CaptureStatus::Denied => {
                log::debug!("[InputCapture] Requesting pointer capture");
                self.status = CaptureStatus::Pending;
                CaptureAction::Grab
            }
        }
    }

    /// Host callback: capture was granted or lost (or the request refused).
    pub fn on_capture_changed(&mut self, captured: bool) {
        let previous = self.status;
        self.status = match (captured, previous) {
            (true, _) => CaptureStatus::Captured,
            (false, CaptureStatus::Pending) => CaptureStatus::Denied,
            (false, CaptureStatus::Denied) => CaptureStatus::Denied,
            (false, _) => CaptureStatus::Released,
        };
        if !captured {
            // Motion buffered before the loss must not leak into a later capture
            self.delta = Vec2::ZERO;
            self.held.clear();
        }
        if previous != self.status {
            log::info!("[InputCapture] {:?} -> {:?}", previous, self.status);
        }
    }

    /// Give the pointer back (Escape). The host should ungrab on `Release`.
    pub fn release(&mut self) -> CaptureAction {
        match self.status {
            CaptureStatus::Captured | CaptureStatus::Pending => {
                self.on_capture_changed(false);
                self.status = CaptureStatus::Released;
                CaptureAction::Release
            }
            CaptureStatus::Released | CaptureStatus::Denied => CaptureAction::None,
        }
    }

    #[inline]
    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.status == CaptureStatus::Captured
    }

    /// Raw pointer motion from the host. Discarded unless captured.
    pub fn accumulate_motion(&mut self, dx: f32, dy: f32) {
        if !self.is_captured() || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.delta += Vec2::new(dx, dy);
    }

    /// Return the accumulated pointer delta and reset it to zero.
    #[inline]
    pub fn poll_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.delta)
    }

    /// Record a key transition. Movement keys only count while captured.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed && !self.is_captured() {
            return;
        }
        self.held.handle_key(key, pressed);
    }

    pub fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Build this tick's input snapshot, consuming the pointer delta.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let movement = if self.is_captured() {
            self.bindings.movement_axes(&self.held)
        } else {
            Vec3::ZERO
        };
        InputSnapshot {
            pointer_delta: self.poll_delta(),
            movement,
        }
    }
}
