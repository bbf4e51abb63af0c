//! Scene Graph Store
//!
//! Owns every renderable node of the navigation scene and its transform.
//! There is no behavior here: systems mutate nodes through the API below and
//! the render step reads the latest state synchronously each frame. Highlight
//! is a declarative value per node; it is up to the renderer to turn it into
//! emissive intensity or scale.

use std::fmt;

use glam::{Quat, Vec3};

use crate::error::{Result, SceneError};
use crate::registry::TargetId;

/// Handle to a node in the [`SceneGraph`]. Never reused within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node represents in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A navigation target body
    Target(TargetId),
    /// Decorative background star cloud
    Starfield,
    /// Support ship the viewer is tethered to
    Ship,
    /// Tether cable from the viewer to the ship
    Tether,
    /// Transit vehicle flown to the selected target
    Vehicle,
    /// Short-lived exhaust particle behind the vehicle
    Trail,
}

/// Geometry of a node, in node-local space.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeShape {
    Sphere { radius: f32 },
    /// Many small points sharing one transform
    PointCloud { points: Vec<Vec3>, point_radius: f32 },
    /// Connected points in world space (transform is ignored)
    Polyline { points: Vec<Vec3>, thickness: f32 },
}

/// Position, rotation and scale of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Map a node-local point to world space.
    #[inline]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }
}

/// A renderable node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub shape: NodeShape,
    pub transform: Transform,
    /// Base colour (RGB)
    pub color: [f32; 3],
    /// Glow colour (RGB)
    pub emissive: [f32; 3],
    /// Highlight intensity, 0.0 = none
    pub highlight: f32,
    pub visible: bool,
}

impl SceneNode {
    /// Describe a node to be added. The id is assigned by [`SceneGraph::add_node`].
    pub fn new(kind: NodeKind, shape: NodeShape) -> Self {
        Self {
            id: NodeId(0),
            kind,
            shape,
            transform: Transform::default(),
            color: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            highlight: 0.0,
            visible: true,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_colors(mut self, color: [f32; 3], emissive: [f32; 3]) -> Self {
        self.color = color;
        self.emissive = emissive;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// The set of renderable nodes, kept in insertion order.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and return its freshly assigned id.
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        self.nodes.push(node);
        id
    }

    /// Remove a node, returning it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<SceneNode> {
        match self.index_of(id) {
            Some(index) => Ok(self.nodes.remove(index)),
            None => Err(not_found(id, "remove_node")),
        }
    }

    pub fn set_transform(
        &mut self,
        id: NodeId,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Result<()> {
        let node = self.node_mut(id, "set_transform")?;
        node.transform = Transform {
            position,
            rotation,
            scale,
        };
        Ok(())
    }

    pub fn set_highlight(&mut self, id: NodeId, intensity: f32) -> Result<()> {
        let node = self.node_mut(id, "set_highlight")?;
        // A NaN highlight would poison the render step for this node
        node.highlight = if intensity.is_finite() { intensity.max(0.0) } else { 0.0 };
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.node_mut(id, "set_visible")?.visible = visible;
        Ok(())
    }

    pub fn set_shape(&mut self, id: NodeId, shape: NodeShape) -> Result<()> {
        self.node_mut(id, "set_shape")?.shape = shape;
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node, returning how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.nodes.len();
        self.nodes.clear();
        released
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        // Ids are handed out in increasing order and removal preserves order
        self.nodes.binary_search_by_key(&id, |node| node.id).ok()
    }

    fn node_mut(&mut self, id: NodeId, op: &str) -> Result<&mut SceneNode> {
        match self.index_of(id) {
            Some(index) => Ok(&mut self.nodes[index]),
            None => Err(not_found(id, op)),
        }
    }
}

fn not_found(id: NodeId, op: &str) -> SceneError {
    log::warn!("[SceneGraph] {op}: node {id} not found, ignoring");
    SceneError::NotFound(id)
}
