// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named construction planes

use std::fmt;

use crate::{Point2, Point3, Vector3};

/// The three standard planes a sketch can be placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneName {
    /// Local x = world X, normal = world Z
    XY,
    /// Local x = world Y, normal = world X
    YZ,
    /// Local x = world X, normal = -world Y
    XZ,
}

impl fmt::Display for PlaneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaneName::XY => "XY",
            PlaneName::YZ => "YZ",
            PlaneName::XZ => "XZ",
        };
        f.write_str(name)
    }
}

/// A placed, right-handed 2D frame in world space
///
/// `x_dir × y_dir == normal`, so a counter-clockwise sketch faces `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Point3<f64>,
    pub x_dir: Vector3<f64>,
    pub y_dir: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Standard plane through the world origin
    pub fn named(name: PlaneName) -> Self {
        let (x_dir, normal) = match name {
            PlaneName::XY => (Vector3::x(), Vector3::z()),
            PlaneName::YZ => (Vector3::y(), Vector3::x()),
            PlaneName::XZ => (Vector3::x(), -Vector3::y()),
        };
        Self {
            origin: Point3::origin(),
            x_dir,
            y_dir: normal.cross(&x_dir),
            normal,
        }
    }

    /// Standard plane shifted by `offset` along its normal
    pub fn offset(name: PlaneName, offset: f64) -> Self {
        let plane = Self::named(name);
        plane.with_origin(Point3::origin() + plane.normal * offset)
    }

    #[inline]
    pub fn with_origin(self, origin: Point3<f64>) -> Self {
        Self { origin, ..self }
    }

    /// Map local sketch coordinates to world space
    #[inline]
    pub fn to_world(&self, p: &Point2<f64>) -> Point3<f64> {
        self.origin + self.x_dir * p.x + self.y_dir * p.y
    }

    /// Signed distance of `p` from the plane along its normal
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(&self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_named_planes_are_right_handed() {
        for name in [PlaneName::XY, PlaneName::YZ, PlaneName::XZ] {
            let plane = Plane::named(name);
            assert_relative_eq!(plane.x_dir.cross(&plane.y_dir), plane.normal);
        }
    }

    #[test]
    fn test_sketch_up_axis_is_world_z_on_side_planes() {
        assert_eq!(Plane::named(PlaneName::YZ).y_dir, Vector3::z());
        assert_eq!(Plane::named(PlaneName::XZ).y_dir, Vector3::z());
    }

    #[test]
    fn test_offset_moves_along_normal() {
        let plane = Plane::offset(PlaneName::XY, 8.0);
        let p = plane.to_world(&Point2::new(1.0, 2.0));
        assert_eq!(p, Point3::new(1.0, 2.0, 8.0));
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, 10.0)), 2.0);

        let back = Plane::offset(PlaneName::XZ, 0.0);
        assert_relative_eq!(back.signed_distance(&Point3::new(0.0, -3.0, 0.0)), 3.0);
    }
}
