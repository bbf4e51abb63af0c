//! Render Module
//!
//! Data/view separation for the navigation scene: [`view`] flattens the scene
//! graph into instances each frame, a [`RenderBackend`] draws them. The wgpu
//! backend lives in [`gpu`]; [`HeadlessBackend`] draws nothing.

pub mod backend;
pub mod gpu;
pub mod view;

pub use backend::{BackendStats, HeadlessBackend, RenderBackend};
pub use gpu::{GpuBackend, GpuBackendConfig};
pub use view::{FrameView, NodeInstance, SceneUniforms, extract_instances, highlight_response};
