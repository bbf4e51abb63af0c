//! Frame View Extraction
//!
//! Turns the scene graph into GPU instance data. This is the only place that
//! interprets highlight values: the scene stores a declarative intensity, the
//! view derives glow strength and scale from it.
//!
//! Every visible node becomes one or more sphere impostor instances:
//! spheres map 1:1, point clouds and polylines emit one small instance per
//! point.

use glam::{Mat4, Vec3};

use crate::camera::{CameraState, Projection};
use crate::scene::{NodeKind, NodeShape, SceneGraph, SceneNode};

/// Glow strength of an untargeted body
const BASE_GLOW: f32 = 0.3;
/// Extra glow at full highlight
const HIGHLIGHT_GLOW: f32 = 0.5;
/// Extra scale at full highlight
const HIGHLIGHT_SCALE: f32 = 0.05;

/// GPU instance for one sphere impostor.
///
/// Layout (48 bytes, three vec4 vertex attributes):
/// - position + radius
/// - base colour + glow strength
/// - emissive colour + padding
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub glow: f32,
    pub emissive: [f32; 3],
    pub _pad: f32,
}

static_assertions::assert_eq_size!(NodeInstance, [u8; 48]);

/// Per-frame uniforms.
///
/// Layout (112 bytes):
/// - view_proj: mat4x4<f32>
/// - camera_right: vec4<f32> (w unused)
/// - camera_up: vec4<f32> (w unused)
/// - light_dir_time: vec4<f32> (xyz = view-space light direction, w = time)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub light_dir_time: [f32; 4],
}

static_assertions::assert_eq_size!(SceneUniforms, [u8; 112]);

/// Camera-side inputs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub camera_right: Vec3,
    pub camera_up: Vec3,
    /// Scene time in seconds
    pub time: f32,
}

impl FrameView {
    pub fn new(camera: &CameraState, projection: &Projection, time: f32) -> Self {
        Self {
            view_proj: projection.matrix() * camera.view_matrix(),
            camera_position: camera.position,
            camera_right: camera.right(),
            camera_up: camera.up(),
            time,
        }
    }

    pub fn uniforms(&self) -> SceneUniforms {
        let light = Vec3::new(0.4, 0.6, 0.7).normalize();
        SceneUniforms {
            view_proj: self.view_proj.to_cols_array_2d(),
            camera_right: self.camera_right.extend(0.0).to_array(),
            camera_up: self.camera_up.extend(0.0).to_array(),
            light_dir_time: light.extend(self.time).to_array(),
        }
    }
}

/// Glow strength and scale multiplier for a node.
pub fn highlight_response(node: &SceneNode) -> (f32, f32) {
    match node.kind {
        NodeKind::Target(_) => (
            BASE_GLOW + HIGHLIGHT_GLOW * node.highlight,
            1.0 + HIGHLIGHT_SCALE * node.highlight,
        ),
        // Trail and vehicle are self-lit
        NodeKind::Trail | NodeKind::Vehicle => (1.0, 1.0),
        NodeKind::Starfield | NodeKind::Ship | NodeKind::Tether => (BASE_GLOW, 1.0),
    }
}

/// Flatten the scene graph into instances. Invisible nodes and points with
/// non-finite coordinates are skipped.
pub fn extract_instances(graph: &SceneGraph) -> Vec<NodeInstance> {
    let mut instances = Vec::with_capacity(graph.len());

    for node in graph.nodes().iter().filter(|node| node.visible) {
        let (glow, scale) = highlight_response(node);
        let mut push = |position: Vec3, radius: f32| {
            if position.is_finite() && radius.is_finite() && radius > 0.0 {
                instances.push(NodeInstance {
                    position: position.to_array(),
                    radius,
                    color: node.color,
                    glow,
                    emissive: node.emissive,
                    _pad: 0.0,
                });
            }
        };

        match &node.shape {
            NodeShape::Sphere { radius } => {
                let size = node.transform.scale.max_element() * scale;
                push(node.transform.position, radius * size);
            }
            NodeShape::PointCloud {
                points,
                point_radius,
            } => {
                for point in points {
                    push(node.transform.apply(*point), *point_radius);
                }
            }
            NodeShape::Polyline { points, thickness } => {
                for point in points {
                    push(*point, *thickness);
                }
            }
        }
    }

    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TargetId;

    fn target_node(highlight: f32) -> SceneNode {
        let mut node = SceneNode::new(
            NodeKind::Target(TargetId(0)),
            NodeShape::Sphere { radius: 2.0 },
        );
        node.highlight = highlight;
        node
    }

    #[test]
    fn test_highlight_raises_glow_and_scale() {
        let (glow_off, scale_off) = highlight_response(&target_node(0.0));
        let (glow_on, scale_on) = highlight_response(&target_node(1.0));
        assert!((glow_off - 0.3).abs() < 1e-6);
        assert!((glow_on - 0.8).abs() < 1e-6);
        assert_eq!(scale_off, 1.0);
        assert!((scale_on - 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_hidden_nodes_skipped() {
        let mut graph = SceneGraph::new();
        graph.add_node(target_node(0.0));
        graph.add_node(target_node(0.0).hidden());
        assert_eq!(extract_instances(&graph).len(), 1);
    }

    #[test]
    fn test_point_cloud_expands() {
        let mut graph = SceneGraph::new();
        graph.add_node(
            SceneNode::new(
                NodeKind::Starfield,
                NodeShape::PointCloud {
                    points: vec![Vec3::X, Vec3::Y, Vec3::new(f32::NAN, 0.0, 0.0)],
                    point_radius: 0.1,
                },
            )
            .with_position(Vec3::new(0.0, 0.0, 10.0)),
        );
        let instances = extract_instances(&graph);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].position, [1.0, 0.0, 10.0]);
    }

    #[test]
    fn test_sphere_uses_transform_scale() {
        let mut graph = SceneGraph::new();
        let id = graph.add_node(target_node(0.0));
        graph
            .set_transform(id, Vec3::ZERO, glam::Quat::IDENTITY, Vec3::splat(2.0))
            .unwrap();
        let instances = extract_instances(&graph);
        assert!((instances[0].radius - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniforms_bytes() {
        let view = FrameView {
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            camera_right: Vec3::X,
            camera_up: Vec3::Y,
            time: 2.5,
        };
        let uniforms = view.uniforms();
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 112);
        assert_eq!(uniforms.light_dir_time[3], 2.5);
    }
}
