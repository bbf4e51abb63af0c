//! Planetary Scene Viewer
//!
//! Run with: `cargo run --bin planetary-scene -- [targets.json] [config.json]`
//!
//! Hosts the planetary navigation scene in a desktop window.
//!
//! Controls:
//! - Click: Capture the pointer (first click), then launch to the targeted planet
//! - Mouse: Look around while captured
//! - WASD / Arrows: Fly
//! - Space / Shift: Up / down
//! - ESC: Release the pointer
//! - F11: Toggle fullscreen

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use planetary_nav::{
    FrameScheduler, GpuBackend, GpuBackendConfig, HostRequest, KeyCode, SceneConfig, SceneHandle,
    TargetRegistry,
};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowAttributes, WindowId};

// ============================================================================
// APPLICATION
// ============================================================================

struct App {
    registry: Option<TargetRegistry>,
    config: Option<SceneConfig>,
    window: Option<Arc<Window>>,
    scene: Option<SceneHandle<GpuBackend>>,
    last_frame: Instant,
}

impl App {
    fn new(registry: TargetRegistry, config: SceneConfig) -> Self {
        Self {
            registry: Some(registry),
            config: Some(config),
            window: None,
            scene: None,
            last_frame: Instant::now(),
        }
    }

    fn apply_request(&mut self, request: HostRequest) {
        let (Some(window), Some(scene)) = (&self.window, &mut self.scene) else {
            return;
        };

        match request {
            HostRequest::None => {}
            HostRequest::GrabCursor => {
                let grabbed = window.set_cursor_grab(CursorGrabMode::Locked).is_ok()
                    || window.set_cursor_grab(CursorGrabMode::Confined).is_ok();
                if grabbed {
                    window.set_cursor_visible(false);
                } else {
                    log::warn!("[Planetary] Pointer capture refused by the platform");
                }
                scene.on_capture_changed(grabbed);
            }
            HostRequest::ReleaseCursor => {
                let _ = window.set_cursor_grab(CursorGrabMode::None);
                window.set_cursor_visible(true);
            }
            HostRequest::ToggleFullscreen => {
                let fullscreen = window.fullscreen().is_none();
                window.set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
                scene.on_fullscreen_changed(fullscreen);
            }
        }
    }

    fn release_pointer(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("Planetary Navigation")
            .with_inner_size(PhysicalSize::new(1280, 720));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("[Planetary] Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let (Some(registry), Some(config)) = (self.registry.take(), self.config.take()) else {
            return;
        };

        let size = window.inner_size();
        let backend = GpuBackend::new(Arc::clone(&window), GpuBackendConfig::default());
        match FrameScheduler::start(backend, registry, config, (size.width, size.height)) {
            Ok(mut scene) => {
                scene.set_on_navigate(|destination| {
                    log::info!("[Planetary] Navigate to {destination}");
                });
                let cursor_window = Arc::clone(&window);
                scene.set_on_release_cursor(move || {
                    let _ = cursor_window.set_cursor_grab(CursorGrabMode::None);
                    cursor_window.set_cursor_visible(true);
                });
                log::info!(
                    "[Planetary] Scene mounted with {} targets, click to fly",
                    scene.registry().len()
                );
                self.scene = Some(scene);
            }
            Err(e) => {
                log::error!("[Planetary] Failed to start scene: {e}");
                event_loop.exit();
                return;
            }
        }

        self.last_frame = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(mut scene) = self.scene.take() {
                    scene.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(scene) = &mut self.scene {
                    scene.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                let request = match &mut self.scene {
                    Some(scene) => scene.handle_key(KeyCode::from(key), pressed),
                    None => HostRequest::None,
                };
                self.apply_request(request);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let request = match &mut self.scene {
                    Some(scene) => scene.click(),
                    None => HostRequest::None,
                };
                self.apply_request(request);
            }
            WindowEvent::Focused(false) => {
                if let Some(scene) = &mut self.scene {
                    scene.on_capture_changed(false);
                }
                self.release_pointer();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                if let Some(scene) = &mut self.scene {
                    scene.tick(dt);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let (Some(scene), DeviceEvent::MouseMotion { delta }) = (&mut self.scene, event) {
            scene.pointer_motion(delta.0 as f32, delta.1 as f32);
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let registry = match args.next() {
        Some(path) => TargetRegistry::load(&path)?,
        None => TargetRegistry::reference(),
    };
    let config = match args.next() {
        Some(path) => SceneConfig::load(&path)?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(registry, config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
