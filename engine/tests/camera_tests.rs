//! Camera Tests - Orbit, Free Fly and Projection
//!
//! Tests for CameraController mode switching, look and movement, and the
//! perspective projection.

use std::f32::consts::FRAC_PI_2;

use approx::{abs_diff_eq, assert_relative_eq};
use glam::{Vec2, Vec3};
use planetary_nav::camera::OrbitPath;
use planetary_nav::{CameraController, CameraMode, InputSnapshot, Projection, SceneConfig};

fn controller() -> CameraController {
    CameraController::new(&SceneConfig::default())
}

fn pointer(dx: f32, dy: f32) -> InputSnapshot {
    InputSnapshot {
        pointer_delta: Vec2::new(dx, dy),
        movement: Vec3::ZERO,
    }
}

fn movement(axes: Vec3) -> InputSnapshot {
    InputSnapshot {
        pointer_delta: Vec2::ZERO,
        movement: axes,
    }
}

// ============================================================================
// CameraController Tests
// ============================================================================

#[test]
fn test_camera_starts_in_idle_orbit_facing_origin() {
    let camera = controller();

    assert_eq!(camera.mode(), CameraMode::IdleOrbit);
    assert_eq!(camera.position(), Vec3::new(0.0, 5.0, 35.0));

    let to_origin = (-camera.position()).normalize();
    assert!(camera.forward().dot(to_origin) > 0.9999);
}

#[test]
fn test_idle_orbit_follows_path() {
    let mut camera = controller();
    let orbit = *camera.orbit();

    for step in 0..10 {
        let time = step as f32 * 0.7;
        camera.update(false, &InputSnapshot::default(), time);
        let expected = orbit.position_at(time);
        assert_relative_eq!(camera.position().x, expected.x, epsilon = 1e-4);
        assert_relative_eq!(camera.position().y, expected.y, epsilon = 1e-4);
        assert_relative_eq!(camera.position().z, expected.z, epsilon = 1e-4);
    }
}

#[test]
fn test_orbit_path_radius() {
    let orbit = OrbitPath {
        radius: 40.0,
        speed: 0.1,
        height: 5.0,
        bob_amplitude: 2.0,
        bob_speed: 0.15,
    };

    for step in 0..20 {
        let position = orbit.position_at(step as f32 * 3.1);
        let horizontal = Vec3::new(position.x, 0.0, position.z).length();
        assert_relative_eq!(horizontal, 40.0, epsilon = 1e-3);
        assert!((3.0..=7.0).contains(&position.y));
    }
}

#[test]
fn test_idle_orbit_ignores_input() {
    let mut camera = controller();
    camera.update(false, &pointer(300.0, 300.0), 1.0);
    let reference = {
        let mut fresh = controller();
        fresh.update(false, &InputSnapshot::default(), 1.0);
        *fresh.state()
    };

    assert_eq!(*camera.state(), reference);
}

#[test]
fn test_free_fly_keeps_orientation_on_entry() {
    let mut camera = controller();
    camera.update(false, &InputSnapshot::default(), 2.0);
    let forward = camera.forward();
    let position = camera.position();

    camera.update(true, &InputSnapshot::default(), 2.1);

    assert_eq!(camera.mode(), CameraMode::FreeFly);
    assert_eq!(camera.position(), position);
    assert!(abs_diff_eq!(camera.forward().dot(forward), 1.0, epsilon = 1e-5));
}

#[test]
fn test_free_fly_look() {
    let mut camera = controller();
    camera.update(true, &InputSnapshot::default(), 0.0);
    let yaw = camera.state().yaw;
    let pitch = camera.state().pitch;
    let sensitivity = SceneConfig::default().look_sensitivity;

    camera.update(true, &pointer(50.0, -20.0), 0.0);

    assert_relative_eq!(camera.state().yaw, yaw + 50.0 * sensitivity, epsilon = 1e-6);
    // Pointer up looks up
    assert_relative_eq!(camera.state().pitch, pitch + 20.0 * sensitivity, epsilon = 1e-6);
}

#[test]
fn test_pitch_is_clamped() {
    let mut camera = controller();
    camera.update(true, &pointer(0.0, -1.0e6), 0.0);
    assert!(camera.state().pitch <= FRAC_PI_2);

    camera.update(true, &pointer(0.0, 1.0e6), 0.0);
    assert!(camera.state().pitch >= -FRAC_PI_2);
}

#[test]
fn test_non_finite_pointer_ignored() {
    let mut camera = controller();
    camera.update(true, &InputSnapshot::default(), 0.0);
    let before = *camera.state();

    camera.apply_pointer_delta(f32::NAN, 1.0);
    camera.apply_pointer_delta(1.0, f32::INFINITY);

    assert_eq!(*camera.state(), before);
}

#[test]
fn test_free_fly_moves_along_local_axes() {
    let mut camera = controller();
    camera.update(true, &InputSnapshot::default(), 0.0);
    let speed = SceneConfig::default().move_speed;
    let start = camera.position();
    let right = camera.state().right();

    camera.update(true, &movement(Vec3::X), 0.0);

    let delta = camera.position() - start;
    assert_relative_eq!(delta.length(), speed, epsilon = 1e-5);
    assert!(delta.normalize().dot(right) > 0.9999);
}

#[test]
fn test_camera_basis_is_orthonormal() {
    let mut camera = controller();
    camera.update(true, &pointer(123.0, 45.0), 0.0);
    let state = camera.state();

    let (forward, right, up) = (state.forward(), state.right(), state.up());
    assert_relative_eq!(forward.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(right.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(forward.dot(right), 0.0, epsilon = 1e-5);
    assert_relative_eq!(forward.dot(up), 0.0, epsilon = 1e-5);
    assert!(up.y > 0.0);
}

#[test]
fn test_loss_of_capture_returns_to_orbit() {
    let mut camera = controller();
    camera.update(true, &movement(Vec3::Z), 0.0);
    camera.update(false, &InputSnapshot::default(), 0.5);

    assert_eq!(camera.mode(), CameraMode::IdleOrbit);
    let expected = camera.orbit().position_at(0.5);
    assert_relative_eq!(camera.position().distance(expected), 0.0, epsilon = 1e-4);
}

// ============================================================================
// Projection Tests
// ============================================================================

#[test]
fn test_projection_from_config() {
    let projection = Projection::new(&SceneConfig::default(), 1280, 720);

    assert_relative_eq!(projection.fov_y, 75.0_f32.to_radians());
    assert_relative_eq!(projection.aspect, 1280.0 / 720.0);
    assert_relative_eq!(projection.near, 0.1);
    assert_relative_eq!(projection.far, 1000.0);
}

#[test]
fn test_view_projection_centers_forward_point() {
    let camera = controller();
    let projection = Projection::new(&SceneConfig::default(), 1280, 720);
    let view_proj = projection.matrix() * camera.state().view_matrix();

    let ahead = camera.position() + camera.forward() * 10.0;
    let clip = view_proj * ahead.extend(1.0);
    let ndc = clip.truncate() / clip.w;

    assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-4);
    assert!((0.0..=1.0).contains(&ndc.z));
}
