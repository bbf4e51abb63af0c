//! Render Backend Seam
//!
//! The scene talks to the GPU (or to nothing at all) through
//! [`RenderBackend`]. Acquisition is separate from construction so that
//! mounting the scene can fail cleanly before any scene state exists.

use std::cell::RefCell;
use std::rc::Rc;

use super::view::{FrameView, NodeInstance};
use crate::error::{Result, SceneError};

/// Something that can draw a frame of node instances.
pub trait RenderBackend {
    /// Acquire every GPU resource needed for drawing. Either all of them are
    /// acquired or the call fails and nothing is held.
    fn acquire(&mut self, width: u32, height: u32) -> Result<()>;

    /// The presentation surface changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame.
    fn render(&mut self, view: &FrameView, instances: &[NodeInstance]) -> Result<()>;

    /// Release everything acquired. Called once per successful acquire.
    fn release(&mut self);
}

/// Call counts recorded by [`HeadlessBackend`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub acquires: u32,
    pub resizes: u32,
    pub frames: u32,
    pub releases: u32,
    pub last_instance_count: usize,
    pub size: (u32, u32),
}

/// Backend that draws nothing and records what it was asked to do.
///
/// Used for tests and for running the scene without a display. The stats
/// handle is shared so it stays readable after the scene is dropped.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    stats: Rc<RefCell<BackendStats>>,
    fail_acquire: bool,
    fail_render: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `acquire` always fails.
    pub fn failing() -> Self {
        Self {
            fail_acquire: true,
            ..Default::default()
        }
    }

    /// A backend whose frames always fail to render.
    pub fn with_render_errors() -> Self {
        Self {
            fail_render: true,
            ..Default::default()
        }
    }

    pub fn stats(&self) -> Rc<RefCell<BackendStats>> {
        Rc::clone(&self.stats)
    }
}

impl RenderBackend for HeadlessBackend {
    fn acquire(&mut self, width: u32, height: u32) -> Result<()> {
        if self.fail_acquire {
            return Err(SceneError::SurfaceUnavailable(
                "headless backend configured to fail".to_string(),
            ));
        }
        let mut stats = self.stats.borrow_mut();
        stats.acquires += 1;
        stats.size = (width, height);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let mut stats = self.stats.borrow_mut();
        stats.resizes += 1;
        stats.size = (width, height);
    }

    fn render(&mut self, _view: &FrameView, instances: &[NodeInstance]) -> Result<()> {
        if self.fail_render {
            return Err(SceneError::Render("headless frame dropped".to_string()));
        }
        let mut stats = self.stats.borrow_mut();
        stats.frames += 1;
        stats.last_instance_count = instances.len();
        Ok(())
    }

    fn release(&mut self) {
        self.stats.borrow_mut().releases += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn view() -> FrameView {
        FrameView {
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            camera_right: Vec3::X,
            camera_up: Vec3::Y,
            time: 0.0,
        }
    }

    #[test]
    fn test_headless_records_calls() {
        let mut backend = HeadlessBackend::new();
        let stats = backend.stats();
        backend.acquire(640, 480).unwrap();
        backend.render(&view(), &[]).unwrap();
        backend.resize(800, 600);
        backend.release();

        let stats = stats.borrow();
        assert_eq!(stats.acquires, 1);
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.resizes, 1);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.size, (800, 600));
    }

    #[test]
    fn test_failing_acquire() {
        let mut backend = HeadlessBackend::failing();
        assert!(matches!(
            backend.acquire(1, 1),
            Err(SceneError::SurfaceUnavailable(_))
        ));
        assert_eq!(backend.stats().borrow().acquires, 0);
    }

    #[test]
    fn test_render_errors_are_recoverable() {
        let mut backend = HeadlessBackend::with_render_errors();
        let err = backend.render(&view(), &[]).unwrap_err();
        assert!(err.is_recoverable());
    }
}
