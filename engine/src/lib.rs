//! Planetary Navigation Library
//!
//! An embeddable real-time 3D navigation scene. The user flies a first-person
//! camera between "planet" targets; looking at one acquires it, clicking
//! launches an animated transit, and landing hands the target's destination
//! back to the host application.
//!
//! # Modules
//!
//! - [`planetary`] - The owned scene: tick loop, host callbacks, teardown
//! - [`scheduler`] - Tick counting, cosmetic throttling and the mount point
//! - [`scene`] - Scene graph store and decorative content
//! - [`registry`] - Catalog of navigation targets
//! - [`camera`] - Idle-orbit / free-fly camera and projection
//! - [`input`] - Pointer capture, held keys, per-tick input snapshots
//! - [`targeting`] - Ray casting and target activation
//! - [`transit`] - Vehicle flight and exhaust trail
//! - [`render`] - Instance extraction and render backends (wgpu, headless)
//! - [`config`] - Tunable constants, loadable from JSON
//!
//! # Example
//!
//! ```ignore
//! use planetary_nav::{FrameScheduler, HeadlessBackend, SceneConfig, TargetRegistry};
//!
//! let mut scene = FrameScheduler::start(
//!     HeadlessBackend::new(),
//!     TargetRegistry::reference(),
//!     SceneConfig::default(),
//!     (1280, 720),
//! )?;
//! scene.set_on_navigate(|destination| println!("go to {destination}"));
//!
//! // Host loop
//! scene.tick(1.0 / 60.0);
//!
//! scene.stop();
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod planetary;
pub mod registry;
pub mod render;
pub mod rng;
pub mod scene;
pub mod scheduler;
pub mod targeting;
pub mod transit;

pub use camera::{CameraController, CameraMode, CameraState, Projection};
pub use config::SceneConfig;
pub use error::{Result, SceneError};
pub use input::{CaptureAction, CaptureStatus, InputCapture, InputSnapshot, KeyCode};
pub use planetary::{
    HostRequest, NavigateCallback, PlanetaryScene, ReleaseCursorCallback, SceneHandle, SceneStatus,
};
pub use registry::{Destination, TargetId, TargetNode, TargetRegistry};
pub use render::{GpuBackend, GpuBackendConfig, HeadlessBackend, RenderBackend};
pub use scene::{NodeId, SceneGraph, SceneNode};
pub use scheduler::{FrameScheduler, TickPlan};
pub use targeting::{Activation, Ray, TargetingEngine, TargetingResult};
pub use transit::{TransitAnimator, TransitState};
