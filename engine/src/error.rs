//! Scene Errors
//!
//! Error taxonomy for the navigation scene. Only start-up acquisition
//! failures reach the host as hard errors; everything raised during a tick is
//! logged and skipped.

use thiserror::Error;

use crate::scene::NodeId;

/// Errors produced by the navigation scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A scene graph mutation named a node that does not exist.
    #[error("scene node {0} not found")]
    NotFound(NodeId),

    /// The drawable surface could not be created for the host window.
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// No GPU adapter is compatible with the surface.
    #[error("no compatible GPU adapter: {0}")]
    AdapterUnavailable(String),

    /// The adapter refused to hand out a device.
    #[error("GPU device request failed: {0}")]
    DeviceRequest(String),

    /// A frame could not be drawn.
    #[error("render failed: {0}")]
    Render(String),

    /// A configuration or target catalog failed to parse.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SceneError {
    /// Whether the error is a per-frame condition the loop may skip over.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SceneError::NotFound(_) | SceneError::Render(_))
    }
}

/// Result alias for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_recoverable() {
        assert!(SceneError::NotFound(NodeId(7)).is_recoverable());
        assert!(!SceneError::SurfaceUnavailable("gone".into()).is_recoverable());
    }

    #[test]
    fn test_display_names_node() {
        let err = SceneError::NotFound(NodeId(42));
        assert_eq!(err.to_string(), "scene node #42 not found");
    }
}
