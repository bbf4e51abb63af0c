//! Planetary Navigation Scene
//!
//! [`PlanetaryScene`] owns every piece of the navigation subsystem: scene
//! graph, camera, input capture, targeting, transit and the render backend.
//! It is passive. The host drives it with [`PlanetaryScene::tick`] and feeds
//! it window events; everything it needs back from the host (cursor grab,
//! fullscreen) is returned as a [`HostRequest`].
//!
//! Per tick:
//!
//! 1. poll capture state, which decides the camera mode
//! 2. camera consumes the input snapshot
//! 3. targeting casts against the registry (FreeFly and no transit only)
//! 4. transit advances, a landing emits `on_navigate`
//! 5. tether follows the camera, cosmetic updates run if scheduled
//! 6. the backend draws the graph

use std::ops::{Deref, DerefMut};

use crate::camera::{CameraController, CameraMode, Projection};
use crate::config::SceneConfig;
use crate::error::Result;
use crate::input::{CaptureAction, CaptureStatus, InputAction, InputCapture, KeyCode};
use crate::registry::{Destination, TargetId, TargetRegistry};
use crate::render::{FrameView, RenderBackend, extract_instances};
use crate::rng::SimpleRng;
use crate::scene::{Decorations, SceneGraph};
use crate::scheduler::FrameScheduler;
use crate::targeting::{Activation, TargetingEngine, TargetingResult};
use crate::transit::TransitAnimator;

/// Listener for completed navigations.
pub type NavigateCallback = Box<dyn FnMut(&Destination)>;

/// Host hook that ungrabs and shows the cursor.
pub type ReleaseCursorCallback = Box<dyn FnMut()>;

/// Something the host has to do to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    None,
    /// Grab and hide the cursor, then call `on_capture_changed`
    GrabCursor,
    /// Ungrab and show the cursor
    ReleaseCursor,
    /// Flip fullscreen, then call `on_fullscreen_changed`
    ToggleFullscreen,
}

impl From<CaptureAction> for HostRequest {
    fn from(action: CaptureAction) -> Self {
        match action {
            CaptureAction::None => HostRequest::None,
            CaptureAction::Grab => HostRequest::GrabCursor,
            CaptureAction::Release => HostRequest::ReleaseCursor,
        }
    }
}

/// Snapshot of scene state for host UI (hints, crosshair label).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStatus {
    pub capture: CaptureStatus,
    pub camera_mode: CameraMode,
    pub fullscreen: bool,
    /// Display name of the targeted body
    pub targeted: Option<String>,
    pub transit_active: bool,
}

impl SceneStatus {
    #[inline]
    pub fn is_captured(&self) -> bool {
        self.capture == CaptureStatus::Captured
    }

    /// The last capture request was refused; show the "click to fly" hint.
    #[inline]
    pub fn capture_denied(&self) -> bool {
        self.capture == CaptureStatus::Denied
    }
}

pub struct PlanetaryScene<B: RenderBackend> {
    config: SceneConfig,
    registry: TargetRegistry,
    graph: SceneGraph,
    decor: Decorations,
    camera: CameraController,
    projection: Projection,
    input: InputCapture,
    targeting: TargetingEngine,
    transit: TransitAnimator,
    scheduler: FrameScheduler,
    backend: B,
    on_navigate: Option<NavigateCallback>,
    on_release_cursor: Option<ReleaseCursorCallback>,
    fullscreen: bool,
    stopped: bool,
}

impl<B: RenderBackend> PlanetaryScene<B> {
    /// Acquire the backend, then build the scene. Nothing is built if the
    /// backend cannot be acquired.
    pub fn mount(
        mut backend: B,
        registry: TargetRegistry,
        config: SceneConfig,
        size: (u32, u32),
    ) -> Result<Self> {
        let (width, height) = size;
        backend.acquire(width, height)?;

        let mut graph = SceneGraph::new();
        let mut rng = SimpleRng::new(config.seed);
        let decor = Decorations::build(&mut graph, &registry, &config, &mut rng);
        let transit = TransitAnimator::new(&mut graph, &config);

        log::info!(
            "[PlanetaryScene] Mounted {} targets, {} nodes at {}x{}",
            registry.len(),
            graph.len(),
            width,
            height
        );

        Ok(Self {
            camera: CameraController::new(&config),
            projection: Projection::new(&config, width, height),
            input: InputCapture::new(),
            targeting: TargetingEngine::new(&config),
            scheduler: FrameScheduler::new(config.cosmetic_interval),
            config,
            registry,
            graph,
            decor,
            transit,
            backend,
            on_navigate: None,
            on_release_cursor: None,
            fullscreen: false,
            stopped: false,
        })
    }

    /// Register the navigation listener, replacing any previous one.
    pub fn set_on_navigate(&mut self, callback: impl FnMut(&Destination) + 'static) {
        self.on_navigate = Some(Box::new(callback));
    }

    /// Register the hook run by [`stop`](Self::stop) when capture is still
    /// held or pending at teardown. Outside teardown, cursor release is
    /// requested through [`HostRequest::ReleaseCursor`].
    pub fn set_on_release_cursor(&mut self, callback: impl FnMut() + 'static) {
        self.on_release_cursor = Some(Box::new(callback));
    }

    /// Advance the scene by `dt` seconds and draw a frame.
    pub fn tick(&mut self, dt: f32) {
        if self.stopped {
            return;
        }
        let plan = self.scheduler.begin_tick(dt);
        let time = plan.time;

        let captured = self.input.is_captured();
        let snapshot = self.input.snapshot();
        self.camera.update(captured, &snapshot, time);

        self.targeting
            .update(&self.registry, self.camera.state(), self.transit.is_idle());
        self.targeting
            .apply_highlights(&mut self.graph, self.decor.target_nodes(), time);

        if let Some(destination) = self.transit.tick(&mut self.graph, time) {
            self.emit_navigate(&destination);
        }

        self.decor
            .update_tracking(&mut self.graph, self.camera.position(), time);
        if plan.run_cosmetic {
            let targeted = self.targeting.result().target();
            self.decor
                .update_cosmetic(&mut self.graph, time, plan.cosmetic_ticks, targeted);
        }

        self.render_frame(time);
    }

    fn render_frame(&mut self, time: f32) {
        let view = FrameView::new(self.camera.state(), &self.projection, time);
        let instances = extract_instances(&self.graph);
        if let Err(e) = self.backend.render(&view, &instances) {
            log::warn!("[PlanetaryScene] Frame skipped: {e}");
        }
    }

    /// Pointer click on the scene. Requests capture when not captured,
    /// otherwise activates the current target.
    pub fn click(&mut self) -> HostRequest {
        if self.stopped {
            return HostRequest::None;
        }
        if self.input.is_captured() {
            self.activate();
            HostRequest::None
        } else {
            self.input.request_capture().into()
        }
    }

    /// Commit to the current target.
    pub fn activate(&mut self) {
        if self.stopped || !self.transit.is_idle() {
            return;
        }
        let camera_position = self.camera.position();
        match self.targeting.activate(&self.registry, camera_position) {
            Activation::Ignored => {}
            Activation::Immediate(destination) => {
                log::info!("[PlanetaryScene] Already at {destination}, skipping transit");
                self.targeting.clear();
                self.emit_navigate(&destination);
            }
            Activation::Launch {
                target,
                end,
                destination,
            } => {
                if self
                    .transit
                    .launch(&mut self.graph, target, camera_position, end, destination)
                {
                    self.targeting.clear();
                }
            }
        }
    }

    /// Key press or release.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> HostRequest {
        if self.stopped {
            return HostRequest::None;
        }
        let action = self.input.bindings().get_action(key);
        match (action, pressed) {
            (Some(InputAction::ReleaseCapture), true) => {
                self.targeting.clear();
                self.input.release().into()
            }
            (Some(InputAction::ToggleFullscreen), true) => HostRequest::ToggleFullscreen,
            _ => {
                self.input.handle_key(key, pressed);
                HostRequest::None
            }
        }
    }

    /// Raw pointer motion in pixels. Ignored unless captured.
    pub fn pointer_motion(&mut self, dx: f32, dy: f32) {
        self.input.accumulate_motion(dx, dy);
    }

    /// Host callback: capture granted, refused or lost.
    pub fn on_capture_changed(&mut self, captured: bool) {
        if self.stopped {
            return;
        }
        self.input.on_capture_changed(captured);
        if !captured {
            self.targeting.clear();
        }
    }

    /// Host callback: fullscreen state changed.
    pub fn on_fullscreen_changed(&mut self, fullscreen: bool) {
        if self.fullscreen != fullscreen {
            log::debug!("[PlanetaryScene] Fullscreen: {fullscreen}");
        }
        self.fullscreen = fullscreen;
    }

    /// Surface resized. The scene keeps running.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.stopped || width == 0 || height == 0 {
            return;
        }
        self.projection.resize(width, height);
        self.backend.resize(width, height);
    }

    pub fn status(&self) -> SceneStatus {
        SceneStatus {
            capture: self.input.status(),
            camera_mode: self.camera.mode(),
            fullscreen: self.fullscreen,
            targeted: self
                .targeting
                .result()
                .target()
                .and_then(|id| self.registry.get(id))
                .map(|target| target.name.clone()),
            transit_active: self.transit.is_in_flight(),
        }
    }

    /// Tear down: release capture, then scene nodes, then render resources.
    /// Returns false if the scene was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;

        let release = self.input.release();
        if let Some(mut callback) = self.on_release_cursor.take() {
            if release == CaptureAction::Release {
                callback();
            }
        }
        self.on_navigate = None;
        self.targeting.clear();
        self.transit.reset(&mut self.graph);
        let released = self.graph.clear();
        self.backend.release();

        log::info!("[PlanetaryScene] Stopped, released {released} nodes");
        true
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn targeting_result(&self) -> TargetingResult {
        self.targeting.result()
    }

    /// Scene node id of a target body.
    pub fn target_node(&self, target: TargetId) -> Option<crate::scene::NodeId> {
        self.decor.node_for(target)
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn input(&self) -> &InputCapture {
        &self.input
    }

    pub fn transit(&self) -> &TransitAnimator {
        &self.transit
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn emit_navigate(&mut self, destination: &Destination) {
        log::info!("[PlanetaryScene] Navigate -> {destination}");
        if let Some(callback) = self.on_navigate.as_mut() {
            callback(destination);
        }
    }
}

/// Owner of a mounted scene. Stopping is idempotent and also happens on drop.
pub struct SceneHandle<B: RenderBackend> {
    scene: PlanetaryScene<B>,
}

impl<B: RenderBackend> SceneHandle<B> {
    pub(crate) fn new(scene: PlanetaryScene<B>) -> Self {
        Self { scene }
    }

    /// Release capture, scene nodes and render resources. A second call does
    /// nothing and returns false.
    pub fn stop(&mut self) -> bool {
        self.scene.stop()
    }
}

impl<B: RenderBackend> Deref for SceneHandle<B> {
    type Target = PlanetaryScene<B>;

    fn deref(&self) -> &Self::Target {
        &self.scene
    }
}

impl<B: RenderBackend> DerefMut for SceneHandle<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scene
    }
}

impl<B: RenderBackend> Drop for SceneHandle<B> {
    fn drop(&mut self) {
        self.scene.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    fn mount() -> SceneHandle<HeadlessBackend> {
        let config = SceneConfig {
            star_count: 16,
            ..Default::default()
        };
        FrameScheduler::start(HeadlessBackend::new(), TargetRegistry::reference(), config, (800, 600))
            .unwrap()
    }

    #[test]
    fn test_click_requests_capture_first() {
        let mut scene = mount();
        assert_eq!(scene.click(), HostRequest::GrabCursor);
        assert_eq!(scene.click(), HostRequest::None);
        scene.on_capture_changed(true);
        assert!(scene.status().is_captured());
    }

    #[test]
    fn test_escape_releases_capture() {
        let mut scene = mount();
        scene.click();
        scene.on_capture_changed(true);
        assert_eq!(scene.handle_key(KeyCode::Escape, true), HostRequest::ReleaseCursor);
        assert_eq!(scene.status().capture, CaptureStatus::Released);
    }

    #[test]
    fn test_f11_requests_fullscreen() {
        let mut scene = mount();
        assert_eq!(scene.handle_key(KeyCode::F11, true), HostRequest::ToggleFullscreen);
        scene.on_fullscreen_changed(true);
        assert!(scene.status().fullscreen);
    }

    #[test]
    fn test_denied_capture_surfaces_in_status() {
        let mut scene = mount();
        scene.click();
        scene.on_capture_changed(false);
        scene.tick(1.0 / 60.0);
        let status = scene.status();
        assert!(status.capture_denied());
        assert_eq!(status.camera_mode, CameraMode::IdleOrbit);
    }

    #[test]
    fn test_tick_renders_frames() {
        let mut scene = mount();
        let stats = scene.backend().stats();
        scene.tick(1.0 / 60.0);
        scene.tick(1.0 / 60.0);
        assert_eq!(stats.borrow().frames, 2);
        assert!(stats.borrow().last_instance_count > 18);
    }

    #[test]
    fn test_resize_reaches_backend_and_projection() {
        let mut scene = mount();
        scene.resize(1600, 900);
        assert!((scene.projection().aspect - 16.0 / 9.0).abs() < 1e-5);
        assert_eq!(scene.backend().stats().borrow().size, (1600, 900));
    }

    #[test]
    fn test_drop_stops_scene() {
        let scene = mount();
        let stats = scene.backend().stats();
        drop(scene);
        assert_eq!(stats.borrow().releases, 1);
    }
}
