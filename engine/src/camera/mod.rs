//! Camera Module
//!
//! Camera state, the orbit/flight controller and the projection. Window-system
//! agnostic: it only deals with camera state and math.

pub mod controller;
pub mod projection;

pub use controller::{CameraController, CameraMode, CameraState, OrbitPath, PITCH_LIMIT};
pub use projection::Projection;
