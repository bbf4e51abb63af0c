//! Transit Module
//!
//! The vehicle flight from the camera to an activated target and its
//! exhaust trail.

pub mod animator;
pub mod trail;

pub use animator::{Flight, TransitAnimator, TransitState, VehiclePose, ease_out_cubic};
pub use trail::{MAX_TRAIL_PARTICLES, Trail, TrailParticle};
