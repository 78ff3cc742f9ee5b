// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge selection by geometric predicates
//!
//! An [`EdgeFinder`] is a conjunction of filters; an edge is selected when
//! every filter accepts it.

use crate::plane::{Plane, PlaneName};
use crate::topology::{TopoEdge, Topology};
use crate::{Point3, Vector3};

/// Distance under which a point counts as lying on a plane or in a box (mm)
const SELECT_TOLERANCE: f64 = 1e-6;

/// Segments whose direction cosine with the axis is below this are not parallel
const DIRECTION_COS: f64 = 1.0 - 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeFilter {
    /// Every point lies on the plane
    InPlane(Plane),
    /// Some point of the edge is within `distance` of `point`
    WithinDistance { distance: f64, point: Point3<f64> },
    /// Every segment is parallel to the direction
    InDirection(Vector3<f64>),
    /// Some part of the edge touches the box
    InBox { min: Point3<f64>, max: Point3<f64> },
}

impl EdgeFilter {
    pub fn accepts(&self, edge: &TopoEdge) -> bool {
        match self {
            EdgeFilter::InPlane(plane) => edge
                .points
                .iter()
                .all(|p| plane.signed_distance(p).abs() <= SELECT_TOLERANCE),
            EdgeFilter::WithinDistance { distance, point } => edge
                .segments()
                .any(|(a, b)| point_segment_distance(point, &a, &b) <= *distance + SELECT_TOLERANCE),
            EdgeFilter::InDirection(direction) => {
                let dir = direction.normalize();
                edge.segments().all(|(a, b)| {
                    let d = b - a;
                    let len = d.norm();
                    len > 0.0 && (d.dot(&dir) / len).abs() >= DIRECTION_COS
                })
            }
            EdgeFilter::InBox { min, max } => {
                let tol = Vector3::repeat(SELECT_TOLERANCE);
                let (lo, hi) = (min - tol, max + tol);
                edge.segments().any(|(a, b)| segment_hits_box(&a, &b, &lo, &hi))
            }
        }
    }
}

/// Conjunction of edge filters, built fluently
///
/// ```
/// use lightholder_geometry::{Axis, EdgeFinder, PlaneName};
///
/// let finder = EdgeFinder::new()
///     .in_plane(PlaneName::XY, 8.0)
///     .in_direction(Axis::Y);
/// assert_eq!(finder.filters().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeFinder {
    filters: Vec<EdgeFilter>,
}

impl EdgeFinder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn filters(&self) -> &[EdgeFilter] {
        &self.filters
    }

    pub fn with(mut self, filter: EdgeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Edges lying in the standard plane offset by `offset` along its normal
    pub fn in_plane(self, plane: PlaneName, offset: f64) -> Self {
        self.with(EdgeFilter::InPlane(Plane::offset(plane, offset)))
    }

    pub fn within_distance(self, distance: f64, point: [f64; 3]) -> Self {
        self.with(EdgeFilter::WithinDistance {
            distance,
            point: Point3::from(point),
        })
    }

    pub fn in_direction(self, axis: Axis) -> Self {
        self.with(EdgeFilter::InDirection(axis.direction()))
    }

    pub fn in_box(self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.with(EdgeFilter::InBox {
            min: Point3::from(min),
            max: Point3::from(max),
        })
    }

    #[inline]
    pub fn matches(&self, edge: &TopoEdge) -> bool {
        self.filters.iter().all(|f| f.accepts(edge))
    }

    /// Selected edges, in topology order
    pub fn find<'a>(&self, topology: &'a Topology) -> Vec<&'a TopoEdge> {
        topology.edges.iter().filter(|e| self.matches(e)).collect()
    }
}

fn point_segment_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (a + d * t - p).norm()
}

/// Slab test of segment `a-b` against the box `[lo, hi]`
fn segment_hits_box(a: &Point3<f64>, b: &Point3<f64>, lo: &Point3<f64>, hi: &Point3<f64>) -> bool {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for axis in 0..3 {
        if d[axis].abs() < 1e-15 {
            if a[axis] < lo[axis] || a[axis] > hi[axis] {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut near = (lo[axis] - a[axis]) * inv;
        let mut far = (hi[axis] - a[axis]) * inv;
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }
        t0 = t0.max(near);
        t1 = t1.min(far);
        if t0 > t1 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::tests::tagged_box;

    fn box_topology() -> Topology {
        Topology::build(&tagged_box(Point3::origin(), Point3::new(2.0, 3.0, 4.0), 1))
    }

    #[test]
    fn test_in_plane() {
        let topology = box_topology();
        // The top face boundary
        assert_eq!(EdgeFinder::new().in_plane(PlaneName::XY, 4.0).find(&topology).len(), 4);
        // y = 0 is the XZ plane
        assert_eq!(EdgeFinder::new().in_plane(PlaneName::XZ, 0.0).find(&topology).len(), 4);
        assert!(EdgeFinder::new().in_plane(PlaneName::XY, 2.0).find(&topology).is_empty());
    }

    #[test]
    fn test_in_direction() {
        let topology = box_topology();
        let along_y = EdgeFinder::new().in_direction(Axis::Y).find(&topology);
        assert_eq!(along_y.len(), 4);
        let top_along_y = EdgeFinder::new()
            .in_plane(PlaneName::XY, 4.0)
            .in_direction(Axis::Y)
            .find(&topology);
        assert_eq!(top_along_y.len(), 2);
    }

    #[test]
    fn test_within_distance() {
        let topology = box_topology();
        let near_origin = EdgeFinder::new().within_distance(0.5, [0.0, 0.0, 0.0]).find(&topology);
        assert_eq!(near_origin.len(), 3);
        assert_eq!(EdgeFinder::new().within_distance(100.0, [0.0; 3]).find(&topology).len(), 12);
    }

    #[test]
    fn test_in_box_touching() {
        let topology = box_topology();
        // A thin slab over the bottom: the 4 bottom edges plus the 4 verticals touch it
        let low = EdgeFinder::new().in_box([-1.0, -1.0, -1.0], [3.0, 4.0, 1.0]).find(&topology);
        assert_eq!(low.len(), 8);
    }

    #[test]
    fn test_empty_finder_matches_everything() {
        assert_eq!(EdgeFinder::new().find(&box_topology()).len(), 12);
    }

    #[test]
    fn test_segment_box_miss() {
        let lo = Point3::new(0.0, 0.0, 0.0);
        let hi = Point3::new(1.0, 1.0, 1.0);
        assert!(!segment_hits_box(&Point3::new(2.0, 0.0, 0.0), &Point3::new(2.0, 1.0, 0.0), &lo, &hi));
        assert!(segment_hits_box(&Point3::new(-1.0, 0.5, 0.5), &Point3::new(2.0, 0.5, 0.5), &lo, &hi));
    }
}
