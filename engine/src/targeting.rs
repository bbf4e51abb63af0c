//! Targeting & Intersection
//!
//! Casts a ray from the camera along its view direction every tick and picks
//! the nearest target whose bounding sphere it hits. The winner is highlighted
//! in the scene graph; everything else is cleared.
//!
//! Targeting only runs in FreeFly with no transit in flight. In every other
//! case the result is empty and all highlights are off.

use glam::Vec3;

use crate::camera::{CameraMode, CameraState};
use crate::config::SceneConfig;
use crate::registry::{Destination, TargetId, TargetRegistry};
use crate::scene::{NodeId, SceneGraph};

/// Smallest accepted hit distance, avoids self-hits at the ray origin
const MIN_HIT_DISTANCE: f32 = 0.001;

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; the direction is normalized. `None` for a zero or
    /// non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        origin.is_finite().then_some(Self { origin, direction })
    }

    pub fn from_camera(camera: &CameraState) -> Option<Self> {
        Self::new(camera.position, camera.forward())
    }

    /// Distance to the first intersection with a sphere, or `None` on a miss.
    ///
    /// With a unit direction the quadratic reduces to
    /// `t² + 2t(oc·d) + (oc·oc - r²) = 0`. If the origin is inside the sphere
    /// the exit point is returned.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;

        let discriminant = b * b - c;
        if discriminant.is_nan() || discriminant < 0.0 {
            // Miss, or NaN from a degenerate sphere
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = -b - sqrt_disc;
        let t2 = -b + sqrt_disc;

        let t = if t1 > MIN_HIT_DISTANCE {
            t1
        } else if t2 > MIN_HIT_DISTANCE {
            t2
        } else {
            return None;
        };
        t.is_finite().then_some(t)
    }
}

/// The target under the crosshair and how far along the ray it was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHit {
    pub target: TargetId,
    pub distance: f32,
}

/// Outcome of the latest targeting pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetingResult {
    pub hit: Option<TargetHit>,
}

impl TargetingResult {
    #[inline]
    pub fn target(&self) -> Option<TargetId> {
        self.hit.map(|hit| hit.target)
    }

    #[inline]
    pub fn distance(&self) -> Option<f32> {
        self.hit.map(|hit| hit.distance)
    }
}

/// Nearest target hit by `ray` within `max_distance`.
///
/// Exact ties go to the target listed first. Targets whose test produces a
/// non-finite value are skipped.
pub fn cast(registry: &TargetRegistry, ray: &Ray, max_distance: f32) -> Option<TargetHit> {
    let mut best: Option<TargetHit> = None;
    for target in registry.all() {
        let Some(distance) = ray.intersect_sphere(target.position, target.radius) else {
            continue;
        };
        if distance > max_distance {
            continue;
        }
        // Strict comparison keeps the earlier target on a tie
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(TargetHit {
                target: target.id,
                distance,
            });
        }
    }
    best
}

/// What activating the current target should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Nothing targeted
    Ignored,
    /// Close enough already: navigate without a transit
    Immediate(Destination),
    /// Fly the vehicle to `end`, then navigate
    Launch {
        target: TargetId,
        end: Vec3,
        destination: Destination,
    },
}

/// Per-tick targeting state.
#[derive(Debug, Clone)]
pub struct TargetingEngine {
    max_distance: f32,
    arrival_distance: f32,
    pulse_speed: f32,
    result: TargetingResult,
}

impl TargetingEngine {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            max_distance: config.max_ray_distance,
            arrival_distance: config.arrival_distance,
            pulse_speed: config.highlight_pulse_speed,
            result: TargetingResult::default(),
        }
    }

    /// Result of the latest [`update`](Self::update).
    #[inline]
    pub fn result(&self) -> TargetingResult {
        self.result
    }

    /// Recompute the target for this tick.
    pub fn update(
        &mut self,
        registry: &TargetRegistry,
        camera: &CameraState,
        transit_idle: bool,
    ) -> TargetingResult {
        let previous = self.result.target();

        self.result = if camera.mode == CameraMode::FreeFly && transit_idle {
            TargetingResult {
                hit: Ray::from_camera(camera).and_then(|ray| cast(registry, &ray, self.max_distance)),
            }
        } else {
            TargetingResult::default()
        };

        let current = self.result.target();
        if current != previous {
            match current.and_then(|id| registry.get(id)) {
                Some(target) => log::debug!("[Targeting] Acquired {}", target.name),
                None => log::debug!("[Targeting] Target lost"),
            }
        }
        self.result
    }

    /// Write highlight values: a pulse on the targeted node, zero elsewhere.
    pub fn apply_highlights(
        &self,
        graph: &mut SceneGraph,
        nodes: impl IntoIterator<Item = (TargetId, NodeId)>,
        time: f32,
    ) {
        let targeted = self.result.target();
        for (target, node) in nodes {
            let intensity = if Some(target) == targeted {
                highlight_pulse(time, self.pulse_speed)
            } else {
                0.0
            };
            let _ = graph.set_highlight(node, intensity);
        }
    }

    /// Decide what committing to the current target does.
    pub fn activate(&self, registry: &TargetRegistry, camera_position: Vec3) -> Activation {
        let Some(target) = self.result.target().and_then(|id| registry.get(id)) else {
            return Activation::Ignored;
        };
        if camera_position.distance(target.position) < self.arrival_distance {
            Activation::Immediate(target.destination.clone())
        } else {
            Activation::Launch {
                target: target.id,
                end: target.position,
                destination: target.destination.clone(),
            }
        }
    }

    /// Forget the current target (capture lost, scene stopped).
    pub fn clear(&mut self) {
        self.result = TargetingResult::default();
    }
}

/// Highlight intensity on the targeted node: a gentle pulse in [0.6, 1.0].
pub fn highlight_pulse(time: f32, speed: f32) -> f32 {
    0.8 + (time * speed).sin() * 0.2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TargetNode;

    fn target(name: &str, position: Vec3, radius: f32) -> TargetNode {
        TargetNode {
            id: TargetId(0),
            name: name.to_string(),
            position,
            radius,
            color: 0xffffff,
            emissive: 0xffffff,
            destination: Destination(format!("/{name}")),
        }
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z).unwrap()
    }

    #[test]
    fn test_sphere_hit_front() {
        let t = forward_ray().intersect_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_behind_is_miss() {
        assert!(forward_ray().intersect_sphere(Vec3::new(0.0, 0.0, 10.0), 2.0).is_none());
    }

    #[test]
    fn test_sphere_off_axis_miss() {
        assert!(forward_ray().intersect_sphere(Vec3::new(5.0, 0.0, -10.0), 2.0).is_none());
    }

    #[test]
    fn test_inside_sphere_hits_exit() {
        let t = forward_ray().intersect_sphere(Vec3::ZERO, 3.0).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_nan_sphere_is_skipped() {
        assert!(forward_ray().intersect_sphere(Vec3::new(f32::NAN, 0.0, -5.0), 1.0).is_none());
    }

    #[test]
    fn test_zero_direction_is_no_ray() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_nearest_wins() {
        let registry = TargetRegistry::new([
            target("far", Vec3::new(0.0, 0.0, -30.0), 1.0),
            target("near", Vec3::new(0.0, 0.0, -10.0), 1.0),
        ]);
        let hit = cast(&registry, &forward_ray(), 100.0).unwrap();
        assert_eq!(hit.target, TargetId(1));
    }

    #[test]
    fn test_exact_tie_goes_to_first_listed() {
        let registry = TargetRegistry::new([
            target("a", Vec3::new(0.0, 0.0, -6.0), 1.0),
            target("b", Vec3::new(0.0, 0.0, -6.0), 1.0),
        ]);
        let hit = cast(&registry, &forward_ray(), 100.0).unwrap();
        assert_eq!(hit.target, TargetId(0));
    }

    #[test]
    fn test_beyond_max_distance_ignored() {
        let registry = TargetRegistry::new([target("far", Vec3::new(0.0, 0.0, -150.0), 1.0)]);
        assert!(cast(&registry, &forward_ray(), 100.0).is_none());
    }

    #[test]
    fn test_empty_registry_has_no_target() {
        assert!(cast(&TargetRegistry::default(), &forward_ray(), 100.0).is_none());
    }

    #[test]
    fn test_pulse_range() {
        for i in 0..100 {
            let v = highlight_pulse(i as f32 * 0.1, 3.0);
            assert!((0.6..=1.0).contains(&v));
        }
    }
}
