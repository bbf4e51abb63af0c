//! Transit Animator
//!
//! Flies the vehicle from the camera to an activated target and reports the
//! target's destination exactly once when it lands.
//!
//! State machine:
//!
//! ```text
//! Idle --launch--> InFlight --elapsed >= 1--> Arrived --(same tick)--> Idle
//! ```
//!
//! Progress advances by a fixed step per tick, not per second, so a transit
//! always takes the same number of ticks.

use glam::{Quat, Vec3};

use crate::config::SceneConfig;
use crate::registry::{Destination, TargetId, unpack_rgb};
use crate::scene::{NodeId, NodeKind, NodeShape, SceneGraph, SceneNode};

use super::trail::Trail;

const VEHICLE_RADIUS: f32 = 0.6;
const VEHICLE_COLOR: u32 = 0xff4444;
const VEHICLE_GLOW: u32 = 0xff6600;
/// Seed offset so trail spawns differ from the decoration stream
const TRAIL_SEED_SALT: u32 = 0x9E37_79B9;

/// Cubic ease-out: fast start, gentle landing.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Where the vehicle is and how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

/// An active transit.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub target: TargetId,
    pub start: Vec3,
    pub end: Vec3,
    /// Linear progress in [0, 1]
    pub elapsed: f32,
    pub pose: VehiclePose,
    pub destination: Destination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitState {
    Idle,
    InFlight(Flight),
    /// Landed this tick; the destination has not been handed out yet
    Arrived(Destination),
}

#[derive(Debug)]
pub struct TransitAnimator {
    state: TransitState,
    vehicle: NodeId,
    step: f32,
    roll_speed: f32,
    roll_amplitude: f32,
    trail: Trail,
    /// Pose of the most recent flight, kept after landing
    last_pose: Option<VehiclePose>,
}

impl TransitAnimator {
    /// Create the animator and its (hidden) vehicle node.
    pub fn new(graph: &mut SceneGraph, config: &SceneConfig) -> Self {
        let vehicle = graph.add_node(
            SceneNode::new(NodeKind::Vehicle, NodeShape::Sphere { radius: VEHICLE_RADIUS })
                .with_colors(unpack_rgb(VEHICLE_COLOR), unpack_rgb(VEHICLE_GLOW))
                .hidden(),
        );
        Self {
            state: TransitState::Idle,
            vehicle,
            step: config.transit_step,
            roll_speed: config.roll_speed,
            roll_amplitude: config.roll_amplitude,
            trail: Trail::new(
                config.trail_lifetime,
                config.trail_spawn_chance,
                config.seed ^ TRAIL_SEED_SALT,
            ),
            last_pose: None,
        }
    }

    #[inline]
    pub fn state(&self) -> &TransitState {
        &self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, TransitState::Idle)
    }

    #[inline]
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, TransitState::InFlight(_))
    }

    pub fn flight(&self) -> Option<&Flight> {
        match &self.state {
            TransitState::InFlight(flight) => Some(flight),
            _ => None,
        }
    }

    /// Pose of the current or most recent flight.
    pub fn last_pose(&self) -> Option<VehiclePose> {
        self.flight().map(|flight| flight.pose).or(self.last_pose)
    }

    pub fn vehicle(&self) -> NodeId {
        self.vehicle
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Start a transit. Ignored (returns false) while one is already in
    /// flight or when either endpoint is not finite.
    pub fn launch(
        &mut self,
        graph: &mut SceneGraph,
        target: TargetId,
        start: Vec3,
        end: Vec3,
        destination: Destination,
    ) -> bool {
        if !self.is_idle() {
            log::debug!("[Transit] Launch ignored, transit already active");
            return false;
        }
        if !start.is_finite() || !end.is_finite() {
            log::warn!("[Transit] Launch ignored, degenerate endpoints {start} -> {end}");
            return false;
        }

        let pose = VehiclePose {
            position: start,
            rotation: heading(start, end),
            scale: 0.8,
        };
        self.apply_pose(graph, &pose);
        let _ = graph.set_visible(self.vehicle, true);

        log::info!("[Transit] Launching to {destination}");
        self.state = TransitState::InFlight(Flight {
            target,
            start,
            end,
            elapsed: 0.0,
            pose,
            destination,
        });
        true
    }

    /// Advance one tick. Returns the destination on the tick the vehicle lands.
    pub fn tick(&mut self, graph: &mut SceneGraph, time: f32) -> Option<Destination> {
        let mut landed = None;

        if let TransitState::InFlight(flight) = &mut self.state {
            flight.elapsed += self.step;

            if flight.elapsed >= 1.0 {
                flight.elapsed = 1.0;
                flight.pose = VehiclePose {
                    position: flight.end,
                    rotation: heading(flight.start, flight.end),
                    scale: 1.2,
                };
                landed = Some(flight.pose);
            } else {
                let eased = ease_out_cubic(flight.elapsed);
                let roll = (time * self.roll_speed).sin() * self.roll_amplitude;
                flight.pose = VehiclePose {
                    position: flight.start.lerp(flight.end, eased),
                    rotation: heading(flight.start, flight.end) * Quat::from_rotation_z(roll),
                    scale: 0.8 + eased * 0.4,
                };
            }
        }

        let mut arrived = None;
        if let Some(pose) = landed {
            self.apply_pose(graph, &pose);
            let _ = graph.set_visible(self.vehicle, false);
            self.last_pose = Some(pose);

            self.state = match std::mem::replace(&mut self.state, TransitState::Idle) {
                TransitState::InFlight(flight) => TransitState::Arrived(flight.destination),
                other => other,
            };
            arrived = self.take_arrival();
        } else if let Some(pose) = self.flight().map(|flight| flight.pose) {
            self.apply_pose(graph, &pose);
            self.trail.maybe_spawn(graph, pose.position, time);
        }

        self.trail.update(graph, time);
        arrived
    }

    /// Abort any flight and drop the trail. Used on teardown.
    pub fn reset(&mut self, graph: &mut SceneGraph) {
        self.trail.clear(graph);
        let _ = graph.set_visible(self.vehicle, false);
        self.state = TransitState::Idle;
    }

    /// Hand out the destination of a landed flight and return to Idle.
    fn take_arrival(&mut self) -> Option<Destination> {
        match std::mem::replace(&mut self.state, TransitState::Idle) {
            TransitState::Arrived(destination) => {
                log::info!("[Transit] Arrived at {destination}");
                Some(destination)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    fn apply_pose(&self, graph: &mut SceneGraph, pose: &VehiclePose) {
        let _ = graph.set_transform(
            self.vehicle,
            pose.position,
            pose.rotation,
            Vec3::splat(pose.scale),
        );
    }
}

/// Rotation taking the vehicle's nose (-Z) onto the travel direction.
fn heading(start: Vec3, end: Vec3) -> Quat {
    match (end - start).try_normalize() {
        Some(direction) => Quat::from_rotation_arc(Vec3::NEG_Z, direction),
        None => Quat::IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SceneGraph, TransitAnimator) {
        let mut graph = SceneGraph::new();
        let animator = TransitAnimator::new(&mut graph, &SceneConfig::default());
        (graph, animator)
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_vehicle_hidden_until_launch() {
        let (mut graph, mut animator) = setup();
        assert!(!graph.get(animator.vehicle()).unwrap().visible);
        animator.launch(&mut graph, TargetId(0), Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), "/x".into());
        assert!(graph.get(animator.vehicle()).unwrap().visible);
    }

    #[test]
    fn test_relaunch_ignored_in_flight() {
        let (mut graph, mut animator) = setup();
        let end = Vec3::new(0.0, 0.0, -10.0);
        assert!(animator.launch(&mut graph, TargetId(0), Vec3::ZERO, end, "/a".into()));
        animator.tick(&mut graph, 0.0);
        assert!(!animator.launch(&mut graph, TargetId(1), Vec3::ONE, Vec3::X, "/b".into()));

        let flight = animator.flight().unwrap();
        assert_eq!(flight.start, Vec3::ZERO);
        assert_eq!(flight.end, end);
        assert_eq!(flight.destination, Destination::from("/a"));
    }

    #[test]
    fn test_flight_completes_once() {
        let (mut graph, mut animator) = setup();
        let end = Vec3::new(-15.0, 5.0, -10.0);
        animator.launch(&mut graph, TargetId(0), Vec3::new(0.0, 0.0, 35.0), end, "/topics/math".into());

        let mut arrivals = Vec::new();
        for i in 0..200 {
            if let Some(destination) = animator.tick(&mut graph, i as f32 / 60.0) {
                arrivals.push(destination);
            }
        }
        assert_eq!(arrivals, vec![Destination::from("/topics/math")]);
        assert!(animator.is_idle());
        assert_eq!(animator.last_pose().unwrap().position, end);
        assert!(!graph.get(animator.vehicle()).unwrap().visible);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (mut graph, mut animator) = setup();
        let start = Vec3::ZERO;
        let end = Vec3::new(0.0, 0.0, -50.0);
        animator.launch(&mut graph, TargetId(0), start, end, "/x".into());

        let mut last = 0.0;
        while let Some(flight) = animator.flight() {
            let travelled = flight.pose.position.distance(start);
            assert!(travelled >= last);
            last = travelled;
            animator.tick(&mut graph, 0.0);
        }
    }

    #[test]
    fn test_non_finite_launch_rejected() {
        let (mut graph, mut animator) = setup();
        assert!(!animator.launch(&mut graph, TargetId(0), Vec3::NAN, Vec3::ZERO, "/x".into()));
        assert!(animator.is_idle());
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let (mut graph, mut animator) = setup();
        assert!(animator.tick(&mut graph, 1.0).is_none());
        assert!(animator.is_idle());
    }

    #[test]
    fn test_reset_clears_trail() {
        let (mut graph, mut animator) = setup();
        animator.launch(&mut graph, TargetId(0), Vec3::ZERO, Vec3::new(0.0, 0.0, -80.0), "/x".into());
        for _ in 0..30 {
            animator.tick(&mut graph, 0.0);
        }
        animator.reset(&mut graph);
        assert!(animator.is_idle());
        assert!(animator.trail().is_empty());
        // Only the vehicle node is left
        assert_eq!(graph.len(), 1);
    }
}
