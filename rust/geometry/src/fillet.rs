// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constant-radius edge fillets
//!
//! Each selected edge becomes a tool swept along the edge chain. Its cross
//! section is the corner region between the two faces bounded by a
//! circular arc tangent to both. Convex edges subtract their tools, concave
//! edges add theirs, so one pass rounds both kinds.

use crate::csg::{cut, fuse, fuse_all, FaceTag, TagAllocator};
use crate::error::{Error, Result};
use crate::profile::Tessellation;
use crate::selector::EdgeFinder;
use crate::solid::{Facet, Solid};
use crate::topology::{TopoEdge, Topology};
use crate::{Point3, Vector3};

/// Faces closer than this to parallel cannot be filleted
const MIN_OPENING: f64 = 1e-6;

/// Tools overlap the solid by this fraction of the radius
const OVERLAP_RATIO: f64 = 0.05;

/// Round every edge `finder` selects with the given radius.
///
/// Fails with [`Error::NoEdgesSelected`] when nothing matches and with
/// [`Error::FilletFailed`] when an edge cannot take the radius.
pub fn fillet(
    solid: &Solid,
    radius: f64,
    finder: &EdgeFinder,
    tags: &mut TagAllocator,
    tessellation: &Tessellation,
) -> Result<Solid> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::fillet(radius, "radius must be positive"));
    }

    let topology = Topology::build(solid);
    let selected = finder.find(&topology);
    if selected.is_empty() {
        return Err(Error::NoEdgesSelected);
    }

    let mut cutters = Vec::new();
    let mut fillers = Vec::new();
    for edge in selected {
        let convex = edge.convexity().ok_or_else(|| {
            Error::fillet(
                radius,
                format!("edge {} is convex in some places and concave in others", edge.id),
            )
        })?;

        check_fits(&topology, edge, radius, convex)?;
        let tool = sweep_tool(edge, radius, convex, tags, tessellation)?;
        if convex {
            cutters.push(tool);
        } else {
            fillers.push(tool);
        }
    }

    let boolean_failed = |e: Error| Error::fillet(radius, e.to_string());
    let mut result = solid.clone();
    if let Some(cutter) = fuse_all(&cutters).map_err(boolean_failed)? {
        result = cut(&result, &cutter).map_err(boolean_failed)?;
    }
    if let Some(filler) = fuse_all(&fillers).map_err(boolean_failed)? {
        result = fuse(&result, &filler).map_err(boolean_failed)?;
    }

    let volume = result.volume();
    if !volume.is_finite() || volume <= 0.0 {
        return Err(Error::fillet(radius, "result encloses no volume"));
    }
    Ok(result)
}

/// Circle center and tangent points of a fillet at corner `p`
struct Corner {
    center: Point3<f64>,
    tangent_a: Point3<f64>,
    tangent_b: Point3<f64>,
}

fn corner(p: &Point3<f64>, na: &Vector3<f64>, nb: &Vector3<f64>, radius: f64, convex: bool) -> Option<Corner> {
    let cos = na.dot(nb);
    if 1.0 + cos < MIN_OPENING || 1.0 - cos < MIN_OPENING {
        return None;
    }
    // Distance to the center along the bisector is r / cos(half angle)
    let offset = (na + nb) * (radius / (1.0 + cos));
    let (center, side) = if convex { (p - offset, 1.0) } else { (p + offset, -1.0) };
    Some(Corner {
        center,
        tangent_a: center + na * (radius * side),
        tangent_b: center + nb * (radius * side),
    })
}

/// Both tangent lines of the fillet have to land on their faces
fn check_fits(topology: &Topology, edge: &TopoEdge, radius: f64, convex: bool) -> Result<()> {
    let s = edge.segment_count() / 2;
    let (a, b) = (edge.points[s], edge.points[s + 1]);
    let mid = Point3::from((a.coords + b.coords) * 0.5);
    let (na, nb) = edge.normals[s];

    let fit = corner(&mid, &na, &nb, radius, convex).ok_or_else(|| {
        Error::fillet(radius, format!("faces at edge {} are parallel", edge.id))
    })?;

    let tolerance = OVERLAP_RATIO * radius;
    for (tag, point) in [(edge.tags.0, fit.tangent_a), (edge.tags.1, fit.tangent_b)] {
        if distance_to_face(topology, tag, &point) > tolerance {
            return Err(Error::fillet(
                radius,
                format!("radius does not fit on face {} at edge {}", tag.0, edge.id),
            ));
        }
    }
    Ok(())
}

/// Distance from `p` to the nearest polygon carrying `tag`
fn distance_to_face(topology: &Topology, tag: FaceTag, p: &Point3<f64>) -> f64 {
    topology
        .faces_with_tag(tag)
        .map(|face| {
            let points = topology.face_points(face);
            let n = face.normal;
            let height = (p - points[0]).dot(&n);
            let q = p - n * height;

            let count = points.len();
            let inside = (0..count).all(|i| {
                let (u, v) = (points[i], points[(i + 1) % count]);
                (v - u).cross(&(q - u)).dot(&n) >= -1e-9 * (v - u).norm()
            });
            if inside {
                return height.abs();
            }
            (0..count)
                .map(|i| point_segment_distance(p, &points[i], &points[(i + 1) % count]))
                .fold(f64::MAX, f64::min)
        })
        .fold(f64::MAX, f64::min)
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

/// Unit vector a fraction `t` of the way from `u` to `v` on the great circle
fn slerp(u: &Vector3<f64>, v: &Vector3<f64>, t: f64) -> Vector3<f64> {
    let angle = u.dot(v).clamp(-1.0, 1.0).acos();
    let sin = angle.sin();
    if sin.abs() < 1e-12 {
        return *u;
    }
    (u * ((1.0 - t) * angle).sin() + v * (t * angle).sin()) / sin
}

/// Averaged face normals at each chain point
fn point_normals(edge: &TopoEdge) -> Vec<(Vector3<f64>, Vector3<f64>)> {
    let segments = edge.segment_count();
    (0..edge.points.len())
        .map(|i| {
            let mut adjacent = Vec::with_capacity(2);
            if i > 0 {
                adjacent.push(i - 1);
            } else if edge.closed {
                adjacent.push(segments - 1);
            }
            if i < segments {
                adjacent.push(i);
            } else if edge.closed {
                adjacent.push(0);
            }
            let (mut na, mut nb) = (Vector3::zeros(), Vector3::zeros());
            for s in adjacent {
                na += edge.normals[s].0;
                nb += edge.normals[s].1;
            }
            (na.normalize(), nb.normalize())
        })
        .collect()
}

/// Cross-section loop at one chain point.
///
/// Order: tangent A, its overlap, the overlapped corner, tangent B's
/// overlap, tangent B, then the arc back towards tangent A.
fn cross_section(
    p: &Point3<f64>,
    na: &Vector3<f64>,
    nb: &Vector3<f64>,
    radius: f64,
    convex: bool,
    arc_segments: usize,
) -> Option<Vec<Point3<f64>>> {
    let fit = corner(p, na, nb, radius, convex)?;
    let overlap = OVERLAP_RATIO * radius * if convex { 1.0 } else { -1.0 };
    let side = if convex { 1.0 } else { -1.0 };

    let mut section = Vec::with_capacity(5 + arc_segments);
    section.push(fit.tangent_a);
    section.push(fit.tangent_a + na * overlap);
    section.push(p + (na + nb) * overlap);
    section.push(fit.tangent_b + nb * overlap);
    section.push(fit.tangent_b);
    for i in 1..arc_segments {
        let t = i as f64 / arc_segments as f64;
        section.push(fit.center + slerp(nb, na, t) * (radius * side));
    }

    section
        .iter()
        .all(|q| q.x.is_finite() && q.y.is_finite() && q.z.is_finite())
        .then_some(section)
}

/// Sweep the corner region along the edge chain
fn sweep_tool(
    edge: &TopoEdge,
    radius: f64,
    convex: bool,
    tags: &mut TagAllocator,
    tessellation: &Tessellation,
) -> Result<Solid> {
    let arc_segments = tessellation.fillet_segments.max(2) as usize;
    let normals = point_normals(edge);

    // A closed chain repeats its first point; sweep it once
    let count = if edge.closed { edge.points.len() - 1 } else { edge.points.len() };
    let sections = (0..count)
        .map(|i| {
            let (na, nb) = normals[i];
            cross_section(&edge.points[i], &na, &nb, radius, convex, arc_segments)
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Error::fillet(radius, format!("no fillet fits at edge {}", edge.id)))?;

    let surface_tag = tags.next_tag();
    let frame_tag = tags.next_tag();
    let k = sections[0].len();

    let mut facets = Vec::new();
    let bands = if edge.closed { count } else { count - 1 };
    for i in 0..bands {
        let (lower, upper) = (&sections[i], &sections[(i + 1) % count]);
        for j in 0..k {
            let jn = (j + 1) % k;
            // Edges 0..4 run along the overlap frame, the rest along the arc
            let tag = if j < 4 { frame_tag } else { surface_tag };
            facets.push(Facet::new(vec![lower[j], lower[jn], upper[jn]], tag));
            facets.push(Facet::new(vec![lower[j], upper[jn], upper[j]], tag));
        }
    }

    if !edge.closed {
        let first = &sections[0];
        facets.push(Facet::new(first.iter().rev().copied().collect(), frame_tag));
        facets.push(Facet::new(sections[count - 1].clone(), frame_tag));
    }

    Solid::from_facets(facets).map_err(|e| Error::fillet(radius, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::PlaneName;
    use crate::selector::Axis;
    use crate::solid::tests::tagged_box;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn slab() -> Solid {
        tagged_box(Point3::origin(), Point3::new(20.0, 10.0, 8.0), 1)
    }

    #[test]
    fn test_convex_edge_removes_corner() {
        let solid = slab();
        // Top edge along y at x = 20
        let finder = EdgeFinder::new()
            .in_plane(PlaneName::XY, 8.0)
            .in_direction(Axis::Y)
            .within_distance(0.1, [20.0, 5.0, 8.0]);
        let rounded = fillet(&solid, 3.0, &finder, &mut TagAllocator::new(), &Tessellation::default()).unwrap();

        // A square corner of r² minus a quarter disc, along 10 mm
        let removed = (9.0 - PI * 9.0 / 4.0) * 10.0;
        assert_relative_eq!(solid.volume() - rounded.volume(), removed, epsilon = 0.6);
        let (_, max) = rounded.bounds();
        assert_relative_eq!(max.x, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_concave_edge_adds_material() {
        let base = tagged_box(Point3::origin(), Point3::new(20.0, 10.0, 4.0), 1);
        let wall = tagged_box(Point3::new(0.0, 0.0, 4.0), Point3::new(5.0, 10.0, 20.0), 11);
        let solid = fuse(&base, &wall).unwrap();
        let finder = EdgeFinder::new()
            .in_plane(PlaneName::XY, 4.0)
            .in_direction(Axis::Y)
            .within_distance(0.1, [5.0, 5.0, 4.0]);

        let rounded = fillet(&solid, 2.0, &finder, &mut TagAllocator::new(), &Tessellation::default()).unwrap();
        let added = (4.0 - PI) * 10.0;
        assert_relative_eq!(rounded.volume() - solid.volume(), added, epsilon = 0.4);
    }

    #[test]
    fn test_no_match_is_an_error() {
        let finder = EdgeFinder::new().in_plane(PlaneName::XY, 100.0);
        let err = fillet(&slab(), 1.0, &finder, &mut TagAllocator::new(), &Tessellation::default()).unwrap_err();
        assert_eq!(err, Error::NoEdgesSelected);
    }

    #[test]
    fn test_radius_larger_than_face_fails() {
        let finder = EdgeFinder::new()
            .in_plane(PlaneName::XY, 8.0)
            .in_direction(Axis::Y)
            .within_distance(0.1, [20.0, 5.0, 8.0]);
        let err = fillet(&slab(), 12.0, &finder, &mut TagAllocator::new(), &Tessellation::default()).unwrap_err();
        assert!(matches!(err, Error::FilletFailed { .. }));
    }

    #[test]
    fn test_non_positive_radius_fails() {
        let finder = EdgeFinder::new();
        assert!(fillet(&slab(), 0.0, &finder, &mut TagAllocator::new(), &Tessellation::default()).is_err());
    }

    #[test]
    fn test_corner_geometry() {
        let p = Point3::new(1.0, 0.0, 1.0);
        let fit = corner(&p, &Vector3::z(), &Vector3::x(), 0.5, true).unwrap();
        assert_relative_eq!(fit.center, Point3::new(0.5, 0.0, 0.5));
        assert_relative_eq!(fit.tangent_a, Point3::new(0.5, 0.0, 1.0));
        assert_relative_eq!(fit.tangent_b, Point3::new(1.0, 0.0, 0.5));

        let inside = corner(&p, &Vector3::z(), &Vector3::x(), 0.5, false).unwrap();
        assert_relative_eq!(inside.center, Point3::new(1.5, 0.0, 1.5));
        assert_relative_eq!(inside.tangent_a, Point3::new(1.5, 0.0, 1.0));

        assert!(corner(&p, &Vector3::z(), &-Vector3::z(), 0.5, true).is_none());
    }
}
