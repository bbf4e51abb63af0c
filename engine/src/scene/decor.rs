//! Scene Decoration
//!
//! Builds the target bodies and the decorative content around them (star
//! cloud, support ship, tether) and animates them. Animation is split into a
//! per-tick part that must track the camera and a cosmetic part the scheduler
//! is free to run on alternating ticks only.

use std::f32::consts::{FRAC_PI_6, PI};

use glam::{EulerRot, Quat, Vec3};

use super::graph::{NodeId, NodeKind, NodeShape, SceneGraph, SceneNode};
use crate::config::SceneConfig;
use crate::registry::{TargetId, TargetRegistry, unpack_rgb};
use crate::rng::SimpleRng;

/// Number of segments in the tether polyline (points = segments + 1)
pub const TETHER_SEGMENTS: usize = 50;
/// Peak vertical sag of the tether
const TETHER_SAG: f32 = 1.5;
/// Vertical float amplitude of target bodies
const FLOAT_AMPLITUDE: f32 = 0.5;
/// Starfield rotation per cosmetic tick (x, y) in radians
const STAR_DRIFT: (f32, f32) = (0.0001, 0.0002);

const SHIP_COLOR: u32 = 0xcccccc;
const SHIP_GLOW: u32 = 0xff6600;
const TETHER_COLOR: u32 = 0xffaa00;

/// Per-body cosmetic motion state.
#[derive(Debug, Clone)]
struct Body {
    target: TargetId,
    node: NodeId,
    base: Vec3,
    /// Euler spin per tick (radians)
    spin: Vec3,
    angles: Vec3,
    float_speed: f32,
    float_offset: f32,
}

/// Handles to every node created for the scene, plus their animation state.
#[derive(Debug)]
pub struct Decorations {
    bodies: Vec<Body>,
    starfield: NodeId,
    star_angles: (f32, f32),
    ship: NodeId,
    ship_position: Vec3,
    tether: NodeId,
}

impl Decorations {
    /// Populate the scene graph with targets and background content.
    pub fn build(
        graph: &mut SceneGraph,
        registry: &TargetRegistry,
        config: &SceneConfig,
        rng: &mut SimpleRng,
    ) -> Self {
        let half = config.star_spread * 0.5;
        let points = (0..config.star_count)
            .map(|_| {
                Vec3::new(
                    rng.range(-half, half),
                    rng.range(-half, half),
                    rng.range(-half, half),
                )
            })
            .collect();
        let starfield = graph.add_node(SceneNode::new(
            NodeKind::Starfield,
            NodeShape::PointCloud {
                points,
                point_radius: 0.15,
            },
        ));

        let bodies = registry
            .all()
            .iter()
            .map(|target| {
                let node = graph.add_node(
                    SceneNode::new(
                        NodeKind::Target(target.id),
                        NodeShape::Sphere {
                            radius: target.radius,
                        },
                    )
                    .with_position(target.position)
                    .with_colors(unpack_rgb(target.color), unpack_rgb(target.emissive)),
                );
                Body {
                    target: target.id,
                    node,
                    base: target.position,
                    spin: Vec3::new(
                        rng.range(-0.005, 0.005),
                        rng.range(-0.005, 0.005),
                        rng.range(-0.005, 0.005),
                    ),
                    angles: Vec3::ZERO,
                    float_speed: rng.range(0.0005, 0.0015),
                    float_offset: rng.range(0.0, PI * 2.0),
                }
            })
            .collect();

        let ship_position = Vec3::from_array(config.ship_position);
        let ship = graph.add_node(
            SceneNode::new(NodeKind::Ship, NodeShape::Sphere { radius: 2.5 })
                .with_position(ship_position)
                .with_rotation(Quat::from_rotation_y(FRAC_PI_6))
                .with_colors(unpack_rgb(SHIP_COLOR), unpack_rgb(SHIP_GLOW)),
        );

        let initial = Vec3::from_array(config.initial_position);
        let tether = graph.add_node(
            SceneNode::new(
                NodeKind::Tether,
                NodeShape::Polyline {
                    points: tether_points(initial, ship_position, 0.0),
                    thickness: 0.04,
                },
            )
            .with_colors(unpack_rgb(TETHER_COLOR), unpack_rgb(TETHER_COLOR)),
        );

        log::debug!(
            "[Decorations] Built {} bodies, {} stars",
            registry.len(),
            config.star_count
        );

        Self {
            bodies,
            starfield,
            star_angles: (0.0, 0.0),
            ship,
            ship_position,
            tether,
        }
    }

    /// Scene node showing the given target.
    pub fn node_for(&self, target: TargetId) -> Option<NodeId> {
        self.bodies
            .iter()
            .find(|body| body.target == target)
            .map(|body| body.node)
    }

    /// (target, node) pairs in registry order.
    pub fn target_nodes(&self) -> impl Iterator<Item = (TargetId, NodeId)> + '_ {
        self.bodies.iter().map(|body| (body.target, body.node))
    }

    /// Work that has to follow the camera every tick.
    pub fn update_tracking(&mut self, graph: &mut SceneGraph, camera: Vec3, time: f32) {
        let shape = NodeShape::Polyline {
            points: tether_points(camera, self.ship_position, time),
            thickness: 0.04,
        };
        let _ = graph.set_shape(self.tether, shape);
    }

    /// Ambient motion that may be throttled. `ticks` is how many ticks have
    /// passed since the previous call so rates stay constant under throttling.
    pub fn update_cosmetic(
        &mut self,
        graph: &mut SceneGraph,
        time: f32,
        ticks: u32,
        targeted: Option<TargetId>,
    ) {
        let ticks = ticks as f32;

        self.star_angles.0 += STAR_DRIFT.0 * ticks;
        self.star_angles.1 += STAR_DRIFT.1 * ticks;
        let star_rotation =
            Quat::from_euler(EulerRot::YXZ, self.star_angles.1, self.star_angles.0, 0.0);
        let _ = graph.set_transform(self.starfield, Vec3::ZERO, star_rotation, Vec3::ONE);

        let ship_rotation = Quat::from_euler(
            EulerRot::YXZ,
            FRAC_PI_6 + (time * 0.2).cos() * 0.1,
            (time * 0.3).sin() * 0.05,
            0.0,
        );
        let _ = graph.set_transform(self.ship, self.ship_position, ship_rotation, Vec3::ONE);

        for body in &mut self.bodies {
            // The acquired body holds still while it pulses
            if Some(body.target) == targeted {
                continue;
            }
            body.angles += body.spin * ticks;
            let rotation = Quat::from_euler(EulerRot::XYZ, body.angles.x, body.angles.y, body.angles.z);
            let bob = (time * body.float_speed + body.float_offset).sin() * FLOAT_AMPLITUDE;
            let _ = graph.set_transform(
                body.node,
                body.base + Vec3::Y * bob,
                rotation,
                Vec3::ONE,
            );
        }
    }
}

/// Sagging cable from `from` to `to`, swaying over time.
pub fn tether_points(from: Vec3, to: Vec3, time: f32) -> Vec<Vec3> {
    (0..=TETHER_SEGMENTS)
        .map(|i| {
            let t = i as f32 / TETHER_SEGMENTS as f32;
            from.lerp(to, t) + Vec3::Y * ((t * PI + time).sin() * TETHER_SAG)
        })
        .collect()
}
