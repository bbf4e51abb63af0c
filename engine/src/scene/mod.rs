//! Scene Module
//!
//! The scene graph store and the decorative content placed in it.

pub mod decor;
pub mod graph;

pub use decor::{Decorations, tether_points};
pub use graph::{NodeId, NodeKind, NodeShape, SceneGraph, SceneNode, Transform};
