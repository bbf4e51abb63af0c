//! Frame Scheduler
//!
//! Counts ticks, accumulates scene time and decides which ticks run the
//! cosmetic updates. Camera, targeting, transit, tether and highlight work
//! runs every tick; background rotation and untargeted body animation run
//! once every `cosmetic_interval` ticks.
//!
//! [`FrameScheduler::start`] is also the mount point for a whole scene.

use crate::config::SceneConfig;
use crate::error::Result;
use crate::planetary::{PlanetaryScene, SceneHandle};
use crate::registry::TargetRegistry;
use crate::render::RenderBackend;

/// Largest `dt` accepted per tick. A stalled host (debugger, minimized
/// window) would otherwise jump the orbit and expire every trail particle.
pub const MAX_TICK_DT: f32 = 0.25;

/// What to run this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPlan {
    /// Zero-based tick number
    pub index: u64,
    /// Scene time after this tick (seconds)
    pub time: f32,
    /// Run cosmetic updates this tick
    pub run_cosmetic: bool,
    /// Ticks covered by this cosmetic update (since the previous one)
    pub cosmetic_ticks: u32,
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: u32,
    ticks: u64,
    last_cosmetic: Option<u64>,
    time: f32,
}

impl FrameScheduler {
    pub fn new(cosmetic_interval: u32) -> Self {
        Self {
            interval: cosmetic_interval.max(1),
            ticks: 0,
            last_cosmetic: None,
            time: 0.0,
        }
    }

    /// Mount a scene on `backend`.
    ///
    /// The backend is acquired first; if that fails the error is returned
    /// and no scene state is built. On success the returned handle owns the
    /// scene and releases everything on [`SceneHandle::stop`] or drop.
    pub fn start<B: RenderBackend>(
        backend: B,
        registry: TargetRegistry,
        config: SceneConfig,
        size: (u32, u32),
    ) -> Result<SceneHandle<B>> {
        PlanetaryScene::mount(backend, registry, config, size).map(SceneHandle::new)
    }

    /// Begin a tick of `dt` seconds.
    pub fn begin_tick(&mut self, dt: f32) -> TickPlan {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_TICK_DT)
        } else {
            0.0
        };
        self.time += dt;

        let index = self.ticks;
        self.ticks += 1;

        let run_cosmetic = index % self.interval as u64 == 0;
        let cosmetic_ticks = if run_cosmetic {
            let covered = match self.last_cosmetic {
                Some(last) => (index - last) as u32,
                None => 1,
            };
            self.last_cosmetic = Some(index);
            covered
        } else {
            0
        };

        TickPlan {
            index,
            time: self.time,
            run_cosmetic,
            cosmetic_ticks,
        }
    }

    /// Ticks run so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Scene time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval
    }
}
