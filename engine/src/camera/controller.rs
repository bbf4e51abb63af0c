//! Navigation Camera Controller
//!
//! Two-mode camera for the planetary scene:
//!
//! - **IdleOrbit**: slow scripted orbit around the origin, always looking at
//!   it. Used whenever the pointer is not captured. Consumes no input.
//! - **FreeFly**: pointer motion rotates the view directly (no smoothing),
//!   held keys translate along the camera's local axes.
//!
//! The mode is not a toggle. It is recomputed from capture state at the start
//! of every tick, so losing capture drops back to the orbit on the next tick.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::config::SceneConfig;
use crate::input::InputSnapshot;

/// Pitch limit: straight up / straight down
pub const PITCH_LIMIT: f32 = FRAC_PI_2;

/// Camera operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Scripted orbit around the origin (no capture)
    #[default]
    IdleOrbit,
    /// Pointer-look flight (capture held)
    FreeFly,
}

/// Camera position and orientation.
///
/// # Coordinate System
/// - +X = right, +Y = up, -Z = forward at yaw = 0, pitch = 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Horizontal angle (radians), unrestricted
    pub yaw: f32,
    /// Vertical angle (radians), clamped to ±[`PITCH_LIMIT`]
    pub pitch: f32,
    pub mode: CameraMode,
}

impl CameraState {
    /// Unit view direction.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Unit right vector. Derived from yaw alone so it stays well defined
    /// when looking straight up or down.
    #[inline]
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    /// Unit up vector, perpendicular to forward and right.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// World-to-view transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up())
    }
}

/// Parameters of the idle orbit path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPath {
    pub radius: f32,
    pub speed: f32,
    pub height: f32,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
}

impl OrbitPath {
    /// Position on the orbit after `time` seconds.
    pub fn position_at(&self, time: f32) -> Vec3 {
        let angle = time * self.speed;
        Vec3::new(
            angle.sin() * self.radius,
            self.height + (time * self.bob_speed).sin() * self.bob_amplitude,
            angle.cos() * self.radius,
        )
    }
}

/// Drives [`CameraState`] from capture state and input snapshots.
#[derive(Debug, Clone)]
pub struct CameraController {
    state: CameraState,
    orbit: OrbitPath,
    /// Radians per pixel of pointer motion
    sensitivity: f32,
    /// Units per tick per movement axis
    move_speed: f32,
}

impl CameraController {
    pub fn new(config: &SceneConfig) -> Self {
        let mut controller = Self {
            state: CameraState {
                position: Vec3::from_array(config.initial_position),
                yaw: 0.0,
                pitch: 0.0,
                mode: CameraMode::IdleOrbit,
            },
            orbit: OrbitPath {
                radius: config.orbit_radius,
                speed: config.orbit_speed,
                height: config.orbit_height,
                bob_amplitude: config.orbit_bob_amplitude,
                bob_speed: config.orbit_bob_speed,
            },
            sensitivity: config.look_sensitivity,
            move_speed: config.move_speed,
        };
        controller.look_at(Vec3::ZERO);
        controller
    }

    #[inline]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.state.forward()
    }

    pub fn orbit(&self) -> &OrbitPath {
        &self.orbit
    }

    /// Advance one tick.
    ///
    /// `captured` is the capture state polled at the start of the tick and
    /// alone decides the mode. `time` is elapsed scene time in seconds.
    pub fn update(&mut self, captured: bool, input: &InputSnapshot, time: f32) {
        let mode = if captured {
            CameraMode::FreeFly
        } else {
            CameraMode::IdleOrbit
        };
        if mode != self.state.mode {
            log::debug!("[Camera] {:?} -> {:?}", self.state.mode, mode);
            self.state.mode = mode;
        }

        match mode {
            CameraMode::IdleOrbit => {
                self.state.position = self.orbit.position_at(time);
                self.look_at(Vec3::ZERO);
            }
            CameraMode::FreeFly => {
                self.apply_pointer_delta(input.pointer_delta.x, input.pointer_delta.y);
                self.translate_local(input.movement * self.move_speed);
            }
        }
    }

    /// Rotate by a pointer delta in pixels. Positive dx looks right,
    /// positive dy looks down.
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.state.yaw += dx * self.sensitivity;
        self.state.pitch = (self.state.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move by `local` (x = right, y = up, z = forward) in camera space.
    pub fn translate_local(&mut self, local: Vec3) {
        let delta = self.state.right() * local.x + self.state.up() * local.y + self.state.forward() * local.z;
        if delta.is_finite() {
            self.state.position += delta;
        }
    }

    /// Point the camera at a world position. No-op when already there.
    pub fn look_at(&mut self, target: Vec3) {
        let to_target = target - self.state.position;
        let distance = to_target.length();
        if distance > 0.001 && distance.is_finite() {
            self.state.yaw = to_target.x.atan2(-to_target.z);
            self.state.pitch = (to_target.y / distance)
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn controller() -> CameraController {
        CameraController::new(&SceneConfig::default())
    }

    fn look(dx: f32, dy: f32) -> InputSnapshot {
        InputSnapshot {
            pointer_delta: Vec2::new(dx, dy),
            movement: Vec3::ZERO,
        }
    }

    #[test]
    fn test_starts_idle_at_initial_position() {
        let camera = controller();
        assert_eq!(camera.mode(), CameraMode::IdleOrbit);
        assert_eq!(camera.position(), Vec3::new(0.0, 5.0, 35.0));
        // Looking roughly toward the origin
        assert!(camera.forward().z < -0.9);
    }

    #[test]
    fn test_orbit_formula() {
        let mut camera = controller();
        camera.update(false, &InputSnapshot::default(), 10.0);
        let expected = Vec3::new(
            (1.0f32).sin() * 40.0,
            5.0 + (1.5f32).sin() * 2.0,
            (1.0f32).cos() * 40.0,
        );
        assert!((camera.position() - expected).length() < 1e-4);
    }

    #[test]
    fn test_orbit_ignores_input() {
        let mut camera = controller();
        camera.update(false, &look(500.0, 0.0), 0.0);
        let expected_yaw = {
            let to_origin = -camera.position();
            to_origin.x.atan2(-to_origin.z)
        };
        assert!((camera.state().yaw - expected_yaw).abs() < 1e-5);
    }

    #[test]
    fn test_free_fly_look() {
        let mut camera = controller();
        camera.update(true, &InputSnapshot::default(), 0.0);
        let yaw = camera.state().yaw;
        camera.update(true, &look(100.0, 0.0), 0.0);
        assert!((camera.state().yaw - (yaw + 0.2)).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_clamped_both_ways() {
        let mut camera = controller();
        camera.update(true, &look(0.0, -1.0e6), 0.0);
        assert_eq!(camera.state().pitch, PITCH_LIMIT);
        camera.update(true, &look(0.0, 1.0e6), 0.0);
        assert_eq!(camera.state().pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_vectors_finite_at_pitch_limit() {
        let mut camera = controller();
        camera.apply_pointer_delta(0.0, -1.0e6);
        let state = camera.state();
        assert!(state.forward().is_finite());
        assert!(state.right().is_finite());
        assert!(state.up().is_finite());
        assert!(state.view_matrix().is_finite());
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let mut camera = controller();
        camera.apply_pointer_delta(123.0, 45.0);
        let s = camera.state();
        assert!((s.forward().length() - 1.0).abs() < 1e-4);
        assert!((s.right().length() - 1.0).abs() < 1e-4);
        assert!((s.up().length() - 1.0).abs() < 1e-4);
        assert!(s.forward().dot(s.right()).abs() < 1e-4);
        assert!(s.forward().dot(s.up()).abs() < 1e-4);
    }

    #[test]
    fn test_forward_moves_along_view() {
        let mut camera = controller();
        camera.update(true, &InputSnapshot::default(), 0.0);
        let start = camera.position();
        let forward = camera.forward();
        let input = InputSnapshot {
            pointer_delta: Vec2::ZERO,
            movement: Vec3::new(0.0, 0.0, 1.0),
        };
        camera.update(true, &input, 0.0);
        assert!((camera.position() - (start + forward * 0.3)).length() < 1e-4);
    }

    #[test]
    fn test_capture_loss_returns_to_orbit() {
        let mut camera = controller();
        camera.update(true, &InputSnapshot::default(), 0.0);
        camera.translate_local(Vec3::new(5.0, 0.0, 0.0));
        camera.update(false, &InputSnapshot::default(), 3.0);
        assert_eq!(camera.mode(), CameraMode::IdleOrbit);
        assert!((camera.position() - camera.orbit().position_at(3.0)).length() < 1e-5);
    }

    #[test]
    fn test_nan_delta_ignored() {
        let mut camera = controller();
        let before = *camera.state();
        camera.apply_pointer_delta(f32::NAN, 0.0);
        assert_eq!(*camera.state(), before);
    }
}
