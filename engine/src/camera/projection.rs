//! Perspective projection that follows the surface size.

use glam::Mat4;

use crate::config::SceneConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(config: &SceneConfig, width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y: config.fov_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        projection.resize(width, height);
        projection
    }

    /// Update the aspect ratio. Zero-sized surfaces (minimized windows) keep
    /// the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}
