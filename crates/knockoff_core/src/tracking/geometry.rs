//! Geometry shared by the tracker: positions, boxes and the platform report.

use nalgebra::Vector2;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// World-space position. The vertical axis is `y`.
pub type Point3 = nalgebra::Point3<f64>;

/// Build a [`Point3`] from a `[x, y, z]` triple (the config/scenario wire form).
#[inline]
pub fn point(xyz: [f64; 3]) -> Point3 {
    Point3::new(xyz[0], xyz[1], xyz[2])
}

/// Distance between two points ignoring the vertical axis.
#[inline]
pub fn horizontal_distance(a: &Point3, b: &Point3) -> f64 {
    Vector2::new(a.x - b.x, a.z - b.z).norm()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    /// Build a box from any two opposite corners.
    pub fn from_corners(a: [f64; 3], b: [f64; 3]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
            max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        }
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        self.size()[0]
    }

    /// Extent along z.
    pub fn depth(&self) -> f64 {
        self.size()[2]
    }

    pub fn min_y(&self) -> f64 {
        self.min[1]
    }
}

/// What the host reports about the designated platform object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlatformGeometry {
    pub position: [f64; 3],
    #[serde(default)]
    pub bounding_box: Option<Aabb>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Point3::new(3.0, 100.0, 4.0);
        let b = Point3::new(0.0, -50.0, 0.0);
        assert!((horizontal_distance(&a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_aabb_from_corners_normalizes() {
        let bb = Aabb::from_corners([5.0, 1.0, -2.0], [-5.0, -1.0, 2.0]);
        assert_eq!(bb.min, [-5.0, -1.0, -2.0]);
        assert_eq!(bb.max, [5.0, 1.0, 2.0]);
        assert_eq!(bb.width(), 10.0);
        assert_eq!(bb.depth(), 4.0);
        assert_eq!(bb.min_y(), -1.0);
    }
}
