//! Scene Configuration
//!
//! Single source of truth for every tunable constant of the navigation scene:
//! orbit path, look sensitivity, flight speed, targeting range, transit timing
//! and frame throttling. Hosts can override any subset from JSON; missing
//! fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Tunable parameters for the navigation scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // Idle orbit
    /// Horizontal radius of the idle orbit around the origin
    pub orbit_radius: f32,
    /// Angular speed of the idle orbit (radians per second)
    pub orbit_speed: f32,
    /// Base height of the idle orbit
    pub orbit_height: f32,
    /// Vertical bob amplitude while orbiting
    pub orbit_bob_amplitude: f32,
    /// Vertical bob speed (radians per second)
    pub orbit_bob_speed: f32,

    // Free flight
    /// Look sensitivity in radians per pixel of pointer motion
    pub look_sensitivity: f32,
    /// Distance travelled per tick while a movement key is held
    pub move_speed: f32,
    /// Camera position when the scene is first mounted
    pub initial_position: [f32; 3],

    // Targeting
    /// Maximum length of the targeting ray
    pub max_ray_distance: f32,
    /// Activating a target closer than this skips the transit animation
    pub arrival_distance: f32,
    /// Frequency of the highlight pulse on the targeted body (radians per second)
    pub highlight_pulse_speed: f32,

    // Transit
    /// Normalized progress added per tick while a transit is in flight
    pub transit_step: f32,
    /// Probability of spawning a trail particle on an in-flight tick
    pub trail_spawn_chance: f32,
    /// Lifetime of a trail particle in seconds
    pub trail_lifetime: f32,
    /// Frequency of the cosmetic vehicle roll (radians per second)
    pub roll_speed: f32,
    /// Amplitude of the cosmetic vehicle roll (radians)
    pub roll_amplitude: f32,

    // Frame scheduling
    /// Cosmetic updates run once every this many ticks
    pub cosmetic_interval: u32,

    // Projection
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,

    // Decoration
    /// Number of background stars
    pub star_count: u32,
    /// Edge length of the cube the stars are scattered in
    pub star_spread: f32,
    /// Position of the support ship the tether is attached to
    pub ship_position: [f32; 3],
    /// Seed for all cosmetic randomness (stars, trail spawns, planet spin)
    pub seed: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 40.0,
            orbit_speed: 0.1,
            orbit_height: 5.0,
            orbit_bob_amplitude: 2.0,
            orbit_bob_speed: 0.15,

            look_sensitivity: 0.002,
            move_speed: 0.3,
            initial_position: [0.0, 5.0, 35.0],

            max_ray_distance: 100.0,
            arrival_distance: 5.0,
            highlight_pulse_speed: 3.0,

            // ~67 ticks, a little over a second at 60 Hz
            transit_step: 0.015,
            trail_spawn_chance: 0.3,
            trail_lifetime: 0.5,
            roll_speed: 20.0,
            roll_amplitude: 0.1,

            cosmetic_interval: 2,

            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,

            star_count: 1000,
            star_spread: 300.0,
            ship_position: [-8.0, 3.0, 25.0],
            seed: 0x5EED_1234,
        }
    }
}

impl SceneConfig {
    /// Parse a configuration from JSON. Unspecified fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Vertical field of view in radians.
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Clamp values that would stall or break the tick loop.
    fn sanitized(mut self) -> Self {
        self.cosmetic_interval = self.cosmetic_interval.max(1);
        if self.transit_step.is_nan() || self.transit_step <= 0.0 {
            log::warn!(
                "[SceneConfig] transit_step {} would never finish, using default",
                self.transit_step
            );
            self.transit_step = Self::default().transit_step;
        }
        self.trail_spawn_chance = self.trail_spawn_chance.clamp(0.0, 1.0);
        self
    }
}
