//! Exhaust trail behind the transit vehicle.
//!
//! Each particle is a tiny sphere node in the scene graph with a fixed
//! lifetime. Spawning is random per in-flight tick; expiry runs every tick
//! and releases the node. The pool is bounded.

use glam::{Quat, Vec3};

use crate::registry::unpack_rgb;
use crate::rng::SimpleRng;
use crate::scene::{NodeId, NodeKind, NodeShape, SceneGraph, SceneNode};

/// Upper bound on live trail particles
pub const MAX_TRAIL_PARTICLES: usize = 64;

const TRAIL_RADIUS: f32 = 0.1;
const TRAIL_COLOR: u32 = 0xff6600;

/// A live trail particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailParticle {
    pub node: NodeId,
    pub position: Vec3,
    /// Scene time at spawn (seconds)
    pub spawned_at: f32,
    /// Seconds the particle lives
    pub lifetime: f32,
}

impl TrailParticle {
    #[inline]
    pub fn age(&self, now: f32) -> f32 {
        now - self.spawned_at
    }

    #[inline]
    pub fn is_expired(&self, now: f32) -> bool {
        self.age(now) >= self.lifetime
    }
}

/// Bounded pool of trail particles.
#[derive(Debug, Clone)]
pub struct Trail {
    particles: Vec<TrailParticle>,
    lifetime: f32,
    spawn_chance: f32,
    rng: SimpleRng,
}

impl Trail {
    pub fn new(lifetime: f32, spawn_chance: f32, seed: u32) -> Self {
        Self {
            particles: Vec::with_capacity(MAX_TRAIL_PARTICLES),
            lifetime,
            spawn_chance,
            rng: SimpleRng::new(seed),
        }
    }

    /// Roll the spawn chance and, on success, drop a particle at `position`.
    pub fn maybe_spawn(&mut self, graph: &mut SceneGraph, position: Vec3, now: f32) -> Option<NodeId> {
        if self.rng.chance(self.spawn_chance) {
            self.spawn(graph, position, now)
        } else {
            None
        }
    }

    /// Drop a particle at `position`. Skipped when the pool is full.
    pub fn spawn(&mut self, graph: &mut SceneGraph, position: Vec3, now: f32) -> Option<NodeId> {
        if self.particles.len() >= MAX_TRAIL_PARTICLES || !position.is_finite() {
            return None;
        }
        let color = unpack_rgb(TRAIL_COLOR);
        let node = graph.add_node(
            SceneNode::new(NodeKind::Trail, NodeShape::Sphere { radius: TRAIL_RADIUS })
                .with_position(position)
                .with_colors(color, color),
        );
        self.particles.push(TrailParticle {
            node,
            position,
            spawned_at: now,
            lifetime: self.lifetime,
        });
        Some(node)
    }

    /// Release expired particles and shrink the rest as they age.
    /// Returns how many were released.
    pub fn update(&mut self, graph: &mut SceneGraph, now: f32) -> usize {
        let before = self.particles.len();
        self.particles.retain(|particle| {
            if particle.is_expired(now) {
                let _ = graph.remove_node(particle.node);
                false
            } else {
                true
            }
        });

        for particle in &self.particles {
            let fade = 1.0 - (particle.age(now) / particle.lifetime).clamp(0.0, 1.0);
            let _ = graph.set_transform(
                particle.node,
                particle.position,
                Quat::IDENTITY,
                Vec3::splat(fade.max(0.05)),
            );
        }
        before - self.particles.len()
    }

    /// Release every particle.
    pub fn clear(&mut self, graph: &mut SceneGraph) -> usize {
        let count = self.particles.len();
        for particle in self.particles.drain(..) {
            let _ = graph.remove_node(particle.node);
        }
        count
    }

    pub fn particles(&self) -> &[TrailParticle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_adds_node() {
        let mut graph = SceneGraph::new();
        let mut trail = Trail::new(0.5, 1.0, 1);
        let node = trail.spawn(&mut graph, Vec3::ONE, 0.0).unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(graph.get(node).unwrap().kind, NodeKind::Trail);
    }

    #[test]
    fn test_expiry_releases_node() {
        let mut graph = SceneGraph::new();
        let mut trail = Trail::new(0.5, 1.0, 1);
        let node = trail.spawn(&mut graph, Vec3::ZERO, 1.0).unwrap();

        assert_eq!(trail.update(&mut graph, 1.25), 0);
        assert!(graph.get(node).is_some());

        assert_eq!(trail.update(&mut graph, 1.5), 1);
        assert!(trail.is_empty());
        assert!(graph.get(node).is_none());
    }

    #[test]
    fn test_pool_is_bounded() {
        let mut graph = SceneGraph::new();
        let mut trail = Trail::new(10.0, 1.0, 1);
        for _ in 0..(MAX_TRAIL_PARTICLES + 10) {
            trail.spawn(&mut graph, Vec3::ZERO, 0.0);
        }
        assert_eq!(trail.len(), MAX_TRAIL_PARTICLES);
        assert_eq!(graph.len(), MAX_TRAIL_PARTICLES);
    }

    #[test]
    fn test_zero_chance_never_spawns() {
        let mut graph = SceneGraph::new();
        let mut trail = Trail::new(0.5, 0.0, 9);
        for i in 0..100 {
            assert!(trail.maybe_spawn(&mut graph, Vec3::ZERO, i as f32).is_none());
        }
    }

    #[test]
    fn test_clear() {
        let mut graph = SceneGraph::new();
        let mut trail = Trail::new(0.5, 1.0, 1);
        trail.spawn(&mut graph, Vec3::ZERO, 0.0);
        trail.spawn(&mut graph, Vec3::ONE, 0.0);
        assert_eq!(trail.clear(&mut graph), 2);
        assert!(graph.is_empty());
    }
}
