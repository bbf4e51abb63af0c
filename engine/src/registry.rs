//! Target Registry
//!
//! Static catalog of navigation targets ("planets"). Each target carries a
//! world position, a visual radius and colour identity, and an opaque
//! destination the host application interprets when the user arrives.
//!
//! The catalog is fixed once built. [`TargetRegistry::reference`] returns the
//! 18 topic planets of the learning dashboard; hosts can supply their own list
//! as JSON.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Index of a target in its registry (stable listing order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub usize);

/// Opaque navigation payload handed to the host on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(pub String);

impl Destination {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Unpack a 0xRRGGBB colour into RGB floats in [0, 1].
pub fn unpack_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

/// A navigable point of interest. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetNode {
    pub id: TargetId,
    /// Display name shown while the target is acquired
    pub name: String,
    /// Center of the target's bounding sphere
    pub position: Vec3,
    /// Radius of the bounding sphere and rendered body
    pub radius: f32,
    /// Base body colour (0xRRGGBB)
    pub color: u32,
    /// Glow / atmosphere colour (0xRRGGBB)
    pub emissive: u32,
    pub destination: Destination,
}

/// On-disk form of a target; ids are assigned from listing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TargetEntry {
    name: String,
    destination: String,
    position: [f32; 3],
    radius: f32,
    #[serde(default = "default_color")]
    color: u32,
    #[serde(default = "default_color")]
    emissive: u32,
}

fn default_color() -> u32 {
    0xFFFFFF
}

/// The fixed catalog of targets.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<TargetNode>,
}

/// (name, slug, color, emissive, radius, x, y, z)
type ReferenceRow = (&'static str, &'static str, u32, u32, f32, f32, f32, f32);

const REFERENCE_TARGETS: [ReferenceRow; 18] = [
    ("Mathematics", "math", 0x3b82f6, 0x60a5fa, 1.8, -15.0, 5.0, -10.0),
    ("Physics", "physics", 0x8b5cf6, 0xa78bfa, 1.5, 10.0, -3.0, -15.0),
    ("Chemistry", "chemistry", 0xec4899, 0xf472b6, 2.0, -8.0, -5.0, 5.0),
    ("Biology", "biology", 0x10b981, 0x34d399, 1.3, 18.0, 3.0, -5.0),
    ("History", "history", 0xf59e0b, 0xfbbf24, 1.6, -12.0, 8.0, 8.0),
    ("Literature", "literature", 0xef4444, 0xf87171, 1.4, 5.0, -8.0, 12.0),
    ("Computer Science", "cs", 0x06b6d4, 0x22d3ee, 1.7, -20.0, -2.0, -8.0),
    ("Philosophy", "philosophy", 0x84cc16, 0xa3e635, 1.2, 15.0, 7.0, 10.0),
    ("Psychology", "psychology", 0x6366f1, 0x818cf8, 1.5, -5.0, 2.0, -20.0),
    ("Economics", "economics", 0xf97316, 0xfb923c, 1.9, 8.0, -6.0, -12.0),
    ("Art", "art", 0xd946ef, 0xe879f9, 1.3, -18.0, -4.0, 15.0),
    ("Engineering", "engineering", 0x14b8a6, 0x2dd4bf, 1.6, 12.0, 5.0, 8.0),
    ("Music", "music", 0xfbbf24, 0xfcd34d, 1.1, -10.0, -7.0, -18.0),
    ("Astronomy", "astronomy", 0xa855f7, 0xc084fc, 1.8, 20.0, 0.0, 5.0),
    ("Geography", "geography", 0x0ea5e9, 0x38bdf8, 1.4, -15.0, 6.0, -15.0),
    ("Language", "language", 0xfb7185, 0xfda4af, 1.5, 6.0, 8.0, -8.0),
    ("Sociology", "sociology", 0x22c55e, 0x4ade80, 1.2, -8.0, -9.0, 18.0),
    ("Anthropology", "anthropology", 0xeab308, 0xfacc15, 1.7, 16.0, -5.0, 15.0),
];

impl TargetRegistry {
    /// Build a registry from a list of targets. Ids are reassigned to match
    /// listing order so `all()[i].id == TargetId(i)`.
    pub fn new(targets: impl IntoIterator<Item = TargetNode>) -> Self {
        let targets = targets
            .into_iter()
            .enumerate()
            .map(|(i, mut target)| {
                target.id = TargetId(i);
                target
            })
            .collect();
        Self { targets }
    }

    /// The 18 topic planets of the reference deployment.
    pub fn reference() -> Self {
        Self::new(REFERENCE_TARGETS.iter().enumerate().map(
            |(i, &(name, slug, color, emissive, radius, x, y, z))| TargetNode {
                id: TargetId(i),
                name: name.to_string(),
                position: Vec3::new(x, y, z),
                radius,
                color,
                emissive,
                destination: Destination(format!("/topics/{slug}")),
            },
        ))
    }

    /// Parse a catalog from a JSON array of targets.
    ///
    /// Entries with a non-finite position or a non-positive radius are
    /// dropped with a warning rather than failing the whole catalog.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<TargetEntry> = serde_json::from_str(json)?;
        let targets = entries.into_iter().filter_map(|entry| {
            let position = Vec3::from_array(entry.position);
            if !position.is_finite() || !(entry.radius.is_finite() && entry.radius > 0.0) {
                log::warn!(
                    "[TargetRegistry] Skipping '{}': degenerate position or radius",
                    entry.name
                );
                return None;
            }
            Some(TargetNode {
                id: TargetId(0),
                name: entry.name,
                position,
                radius: entry.radius,
                color: entry.color,
                emissive: entry.emissive,
                destination: Destination(entry.destination),
            })
        });
        Ok(Self::new(targets))
    }

    /// Load a JSON catalog from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&json)?;
        log::info!(
            "[TargetRegistry] Loaded {} targets from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// All targets in stable listing order.
    pub fn all(&self) -> &[TargetNode] {
        &self.targets
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetNode> {
        self.targets.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_has_18_targets() {
        let registry = TargetRegistry::reference();
        assert_eq!(registry.len(), 18);
        assert_eq!(registry.all()[0].name, "Mathematics");
        assert_eq!(registry.all()[0].destination.as_str(), "/topics/math");
        assert_eq!(registry.all()[0].position, Vec3::new(-15.0, 5.0, -10.0));
    }

    #[test]
    fn test_ids_follow_listing_order() {
        let registry = TargetRegistry::reference();
        for (i, target) in registry.all().iter().enumerate() {
            assert_eq!(target.id, TargetId(i));
            assert_eq!(registry.get(target.id), Some(target));
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            { "name": "Home", "destination": "/", "position": [1.0, 2.0, 3.0], "radius": 1.5 },
            { "name": "Bad", "destination": "/bad", "position": [0.0, 0.0, 0.0], "radius": -1.0 }
        ]"#;
        let registry = TargetRegistry::from_json_str(json).unwrap();
        assert_eq!(registry.len(), 1);
        let home = &registry.all()[0];
        assert_eq!(home.destination, Destination::from("/"));
        assert_eq!(home.color, 0xFFFFFF);
    }

    #[test]
    fn test_empty_registry() {
        let registry = TargetRegistry::from_json_str("[]").unwrap();
        assert!(registry.is_empty());
        assert!(registry.get(TargetId(0)).is_none());
    }

    #[test]
    fn test_unpack_rgb() {
        assert_eq!(unpack_rgb(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(unpack_rgb(0x00FF00), [0.0, 1.0, 0.0]);
    }
}
