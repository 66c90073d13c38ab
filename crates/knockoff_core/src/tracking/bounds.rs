//! Platform bounds and position classification.
//!
//! The platform is a vertical cylinder: a position is on it iff it is at or
//! above the fall threshold and its horizontal (x/z) distance from the center
//! is within the radius.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::{horizontal_distance, point, PlatformGeometry, Point3};
use crate::error::{Result, TrackerError};

/// Margin below the platform box used by auto-detection.
pub const DEFAULT_AUTO_DETECT_MARGIN: f64 = 2.0;

/// Whether an entity is on or off the platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Membership {
    OnPlatform,
    OffPlatform,
}

impl Membership {
    pub fn is_on(self) -> bool {
        matches!(self, Membership::OnPlatform)
    }

    fn from_on(on: bool) -> Self {
        if on {
            Membership::OnPlatform
        } else {
            Membership::OffPlatform
        }
    }
}

/// Validated platform description. `radius > 0` and all values are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlatformBounds {
    center: Point3,
    radius: f64,
    fall_threshold: f64,
}

impl PlatformBounds {
    pub fn new(center: Point3, radius: f64, fall_threshold: f64) -> Result<Self> {
        if !(center.x.is_finite()
            && center.y.is_finite()
            && center.z.is_finite()
            && radius.is_finite()
            && fall_threshold.is_finite())
        {
            return Err(TrackerError::NonFiniteBounds);
        }
        if radius <= 0.0 {
            return Err(TrackerError::InvalidBounds { radius });
        }
        Ok(Self {
            center,
            radius,
            fall_threshold,
        })
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn fall_threshold(&self) -> f64 {
        self.fall_threshold
    }

    /// Classify a position against these bounds. Pure.
    pub fn classify(&self, position: &Point3) -> Membership {
        let vertical_ok = position.y >= self.fall_threshold;
        let within_radius = horizontal_distance(position, &self.center) <= self.radius;
        Membership::from_on(vertical_ok & within_radius)
    }

    pub fn contains(&self, position: &Point3) -> bool {
        self.classify(position).is_on()
    }

    /// Derive bounds from a detected platform object.
    ///
    /// The center always follows the object. Radius and fall threshold are
    /// only replaced when the object reports a bounding box:
    /// `radius = max(width, depth) / 2`, `fall_threshold = min.y - margin`.
    pub fn derive_from(&self, geometry: &PlatformGeometry, margin: f64) -> Result<Self> {
        let center = point(geometry.position);
        match geometry.bounding_box {
            Some(bb) => {
                let radius = bb.width().max(bb.depth()) / 2.0;
                Self::new(center, radius, bb.min_y() - margin)
            }
            None => Self::new(center, self.radius, self.fall_threshold),
        }
    }
}

/// Free-function form of [`PlatformBounds::classify`].
#[inline]
pub fn classify(position: &Point3, bounds: &PlatformBounds) -> Membership {
    bounds.classify(position)
}

/// Host collaborator that can locate the designated platform object.
pub trait PlatformProbe {
    fn find_platform(&self) -> Option<PlatformGeometry>;
}

impl PlatformProbe for PlatformGeometry {
    fn find_platform(&self) -> Option<PlatformGeometry> {
        Some(*self)
    }
}

impl PlatformProbe for Option<PlatformGeometry> {
    fn find_platform(&self) -> Option<PlatformGeometry> {
        *self
    }
}

/// Apply auto-detection to manually configured bounds.
///
/// No platform found leaves `manual` untouched.
pub fn detect_bounds(
    manual: PlatformBounds,
    probe: &dyn PlatformProbe,
    margin: f64,
) -> Result<PlatformBounds> {
    match probe.find_platform() {
        Some(geometry) => {
            let derived = manual.derive_from(&geometry, margin)?;
            log::info!(
                "Detected platform: center=({:.2}, {:.2}, {:.2}), radius={:.2}, threshold={:.2}",
                derived.center.x,
                derived.center.y,
                derived.center.z,
                derived.radius,
                derived.fall_threshold
            );
            Ok(derived)
        }
        None => {
            log::debug!("No platform object found, keeping configured bounds");
            Ok(manual)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::geometry::Aabb;

    fn default_bounds() -> PlatformBounds {
        PlatformBounds::new(Point3::origin(), 10.0, -5.0).unwrap()
    }

    #[test]
    fn test_below_threshold_is_off_even_at_center() {
        let b = default_bounds();
        let m = b.classify(&Point3::new(0.0, -6.0, 0.0));
        assert_eq!(m, Membership::OffPlatform);
    }

    #[test]
    fn test_outside_radius_is_off() {
        let b = default_bounds();
        let m = b.classify(&Point3::new(15.0, 0.0, 0.0));
        assert_eq!(m, Membership::OffPlatform);
    }

    #[test]
    fn test_inside_is_on() {
        let b = default_bounds();
        let m = b.classify(&Point3::new(5.0, 0.0, 0.0));
        assert_eq!(m, Membership::OnPlatform);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let b = default_bounds();
        assert!(b.contains(&Point3::new(10.0, -5.0, 0.0)));
        assert!(b.contains(&Point3::new(6.0, 0.0, 8.0)));
        assert!(!b.contains(&Point3::new(10.0001, 0.0, 0.0)));
        assert!(!b.contains(&Point3::new(0.0, -5.0001, 0.0)));
    }

    #[test]
    fn test_height_above_platform_does_not_matter() {
        let b = default_bounds();
        assert!(b.contains(&Point3::new(1.0, 500.0, 1.0)));
    }

    #[test]
    fn test_off_center_platform() {
        let b = PlatformBounds::new(Point3::new(100.0, 3.0, -20.0), 2.0, 0.0).unwrap();
        assert!(b.contains(&Point3::new(101.0, 0.0, -21.0)));
        assert!(!b.contains(&Point3::origin()));
    }

    #[test]
    fn test_classify_is_repeatable() {
        let b = default_bounds();
        let p = Point3::new(7.0, -4.0, 7.0);
        assert_eq!(classify(&p, &b), classify(&p, &b));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let err = PlatformBounds::new(Point3::origin(), 0.0, -5.0).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidBounds { .. }));
        assert!(PlatformBounds::new(Point3::origin(), -1.0, -5.0).is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let err = PlatformBounds::new(Point3::origin(), f64::NAN, -5.0).unwrap_err();
        assert!(matches!(err, TrackerError::NonFiniteBounds));
        let center = Point3::new(f64::INFINITY, 0.0, 0.0);
        assert!(PlatformBounds::new(center, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_nan_position_is_off() {
        let b = default_bounds();
        let m = b.classify(&Point3::new(0.0, f64::NAN, 0.0));
        assert_eq!(m, Membership::OffPlatform);
    }

    #[test]
    fn test_detect_from_bounding_box() {
        let geometry = PlatformGeometry {
            position: [1.0, 0.0, 2.0],
            bounding_box: Some(Aabb::from_corners([-5.0, -0.25, -3.0], [7.0, 0.25, 7.0])),
        };
        let b = detect_bounds(default_bounds(), &geometry, DEFAULT_AUTO_DETECT_MARGIN).unwrap();
        assert_eq!(b.center(), Point3::new(1.0, 0.0, 2.0));
        assert_eq!(b.radius(), 6.0);
        assert_eq!(b.fall_threshold(), -2.25);
    }

    #[test]
    fn test_detect_without_box_moves_center_only() {
        let geometry = PlatformGeometry {
            position: [3.0, 1.0, 3.0],
            bounding_box: None,
        };
        let b = detect_bounds(default_bounds(), &geometry, DEFAULT_AUTO_DETECT_MARGIN).unwrap();
        assert_eq!(b.center(), Point3::new(3.0, 1.0, 3.0));
        assert_eq!(b.radius(), 10.0);
        assert_eq!(b.fall_threshold(), -5.0);
    }

    #[test]
    fn test_detect_nothing_keeps_manual_bounds() {
        let manual = default_bounds();
        let nothing: Option<PlatformGeometry> = None;
        let b = detect_bounds(manual, &nothing, DEFAULT_AUTO_DETECT_MARGIN).unwrap();
        assert_eq!(b, manual);
    }

    #[test]
    fn test_detect_degenerate_box_is_fatal() {
        let geometry = PlatformGeometry {
            position: [0.0, 0.0, 0.0],
            bounding_box: Some(Aabb::from_corners([0.0, 0.0, 0.0], [0.0, 1.0, 0.0])),
        };
        let err = detect_bounds(default_bounds(), &geometry, 2.0).unwrap_err();
        match err {
            TrackerError::InvalidBounds { radius } => assert_eq!(radius, 0.0),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Classification is deterministic for identical inputs.
            #[test]
            fn prop_classify_deterministic(
                x in -50.0f64..50.0, y in -50.0f64..50.0, z in -50.0f64..50.0,
                radius in 0.1f64..40.0, threshold in -20.0f64..5.0
            ) {
                let b = PlatformBounds::new(Point3::origin(), radius, threshold).unwrap();
                let p = Point3::new(x, y, z);
                prop_assert_eq!(b.classify(&p), b.classify(&p));
            }

            /// On-platform implies both checks pass.
            #[test]
            fn prop_on_implies_both_checks(
                x in -50.0f64..50.0, y in -50.0f64..50.0, z in -50.0f64..50.0,
                radius in 0.1f64..40.0, threshold in -20.0f64..5.0
            ) {
                let b = PlatformBounds::new(Point3::origin(), radius, threshold).unwrap();
                let p = Point3::new(x, y, z);
                if b.contains(&p) {
                    prop_assert!(y >= threshold);
                    prop_assert!((x * x + z * z).sqrt() <= radius);
                }
            }
        }
    }
}
