// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion and loft - turning sketches and wires into tagged solids

use crate::csg::{FaceTag, TagAllocator};
use crate::error::{Error, Result};
use crate::sketch::{Sketch, Wire};
use crate::solid::{Facet, Solid};
use crate::{Point3, Vector3};

/// Quads further than this from planar are split in two (mm)
const PLANARITY_TOLERANCE: f64 = 1e-9;

/// Extrude a sketch along its normal by `distance`.
///
/// Negative distances extrude against the normal. Both caps get a tag of
/// their own, and so does the side face swept by each drawn segment.
pub fn extrude(sketch: &Sketch, distance: f64, tags: &mut TagAllocator) -> Result<Solid> {
    if !distance.is_finite() || distance.abs() < 1e-9 {
        return Err(Error::InvalidExtrusion(format!(
            "distance must be finite and non-zero, got {distance}"
        )));
    }

    let base = sketch.world_points();
    let offset = sketch.normal() * distance;
    let top: Vec<Point3<f64>> = base.iter().map(|p| p + offset).collect();

    let bottom_tag = tags.next_tag();
    let top_tag = tags.next_tag();
    let side_tags: Vec<FaceTag> = (0..sketch.profile().segment_count)
        .map(|_| tags.next_tag())
        .collect();

    let n = base.len();
    let mut facets = Vec::with_capacity(n + 2);
    facets.push(Facet::new(base.iter().rev().copied().collect(), bottom_tag));
    facets.push(Facet::new(top.clone(), top_tag));

    for i in 0..n {
        let j = (i + 1) % n;
        let tag = side_tags[sketch.profile().edge_segments[i] as usize];
        facets.push(Facet::new(vec![base[i], base[j], top[j], top[i]], tag));
    }

    Solid::from_facets(facets)
}

/// Ruled loft through closed wires, in order.
///
/// Wires must have the same number of points and the same segment layout;
/// point `i` of one wire is joined to point `i` of the next. Each band
/// between two wires gets one face per drawn segment.
pub fn loft(wires: &[Wire], tags: &mut TagAllocator) -> Result<Solid> {
    if wires.len() < 2 {
        return Err(Error::InvalidLoft(format!(
            "need at least 2 sections, got {}",
            wires.len()
        )));
    }

    let first = &wires[0];
    if first.len() < 3 {
        return Err(Error::InvalidLoft("sections need at least 3 points".to_string()));
    }
    for (index, wire) in wires.iter().enumerate().skip(1) {
        if wire.len() != first.len() {
            return Err(Error::InvalidLoft(format!(
                "section {index} has {} points, section 0 has {}",
                wire.len(),
                first.len()
            )));
        }
        if wire.edge_segments != first.edge_segments {
            return Err(Error::InvalidLoft(format!(
                "section {index} is drawn differently from section 0"
            )));
        }
    }

    let n = first.len();
    let bottom_tag = tags.next_tag();
    let top_tag = tags.next_tag();

    let mut facets = Vec::with_capacity(wires.len() * n + 2);
    facets.push(Facet::new(first.points.iter().rev().copied().collect(), bottom_tag));
    if let Some(last) = wires.last() {
        facets.push(Facet::new(last.points.clone(), top_tag));
    }

    for pair in wires.windows(2) {
        let (lower, upper) = (&pair[0].points, &pair[1].points);
        let band_tags: Vec<FaceTag> = (0..first.segment_count).map(|_| tags.next_tag()).collect();

        for i in 0..n {
            let j = (i + 1) % n;
            let tag = band_tags[first.edge_segments[i] as usize];
            let quad = [lower[i], lower[j], upper[j], upper[i]];
            if is_planar(&quad) {
                facets.push(Facet::new(quad.to_vec(), tag));
            } else {
                facets.push(Facet::new(vec![quad[0], quad[1], quad[2]], tag));
                facets.push(Facet::new(vec![quad[0], quad[2], quad[3]], tag));
            }
        }
    }

    Solid::from_facets(facets)
}

fn is_planar(quad: &[Point3<f64>; 4]) -> bool {
    let normal: Vector3<f64> = (quad[1] - quad[0]).cross(&(quad[2] - quad[0]));
    let len = normal.norm();
    if len < 1e-12 {
        // Degenerate first triangle, let the facet filter decide
        return true;
    }
    ((quad[3] - quad[0]).dot(&normal) / len).abs() < PLANARITY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::{Plane, PlaneName};
    use crate::profile::{draw, draw_circle, Tessellation};
    use crate::shape::{Shape, ShapeKind};
    use crate::sketch::build_u_sketch;
    use approx::assert_relative_eq;

    #[test]
    fn test_extrude_square() {
        let profile = draw(0.0, 0.0).h_line(2.0).v_line(3.0).h_line(-2.0).close().unwrap();
        let sketch = Sketch::new(profile, Plane::named(PlaneName::XY));
        let mut tags = TagAllocator::new();
        let solid = extrude(&sketch, 4.0, &mut tags).unwrap();

        assert_relative_eq!(solid.volume(), 24.0, epsilon = 1e-9);
        // Two caps and four sides
        assert_eq!(tags.issued(), 6);
        assert_eq!(solid.face_tags().len(), 6);
    }

    #[test]
    fn test_negative_extrusion_is_outward() {
        let circle = draw_circle(1.0, &Tessellation::default()).unwrap();
        let sketch = Sketch::new(
            circle,
            Plane::named(PlaneName::YZ).with_origin(Point3::new(2.0, 0.0, 0.0)),
        );
        let solid = extrude(&sketch, -4.0, &mut TagAllocator::new()).unwrap();
        assert!(solid.volume() > 0.0);
        let (min, max) = solid.bounds();
        assert_relative_eq!(min.x, -2.0);
        assert_relative_eq!(max.x, 2.0);
    }

    #[test]
    fn test_zero_extrusion_rejected() {
        let sketch = build_u_sketch(10.0, 0.0).unwrap();
        let err = extrude(&sketch, 0.0, &mut TagAllocator::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidExtrusion(_)));
    }

    #[test]
    fn test_u_plate_volume() {
        let sketch = build_u_sketch(10.0, 0.0).unwrap();
        let area = sketch.profile().area();
        let solid = extrude(&sketch, 8.0, &mut TagAllocator::new()).unwrap();
        assert_relative_eq!(solid.volume(), area * 8.0, epsilon = 1e-6);
        // Rectangle 20 x 5 plus a half disc of radius 10
        assert_relative_eq!(area, 100.0 + std::f64::consts::PI * 50.0, epsilon = 2.0);
    }

    #[test]
    fn test_loft_prism_matches_extrusion() {
        let lower = build_u_sketch(12.0, 8.0).unwrap();
        let upper = build_u_sketch(12.0, 20.0).unwrap();
        let mut tags = TagAllocator::new();
        let lofted = loft(&[lower.wire(), upper.wire()], &mut tags).unwrap();
        let extruded = extrude(&lower, 12.0, &mut tags).unwrap();
        assert_relative_eq!(lofted.volume(), extruded.volume(), epsilon = 1e-6);
    }

    #[test]
    fn test_loft_tapered_sections() {
        let wires: Vec<Wire> = [(12.0, 0.0), (12.0, 10.0), (14.0, 20.0), (14.0, 28.0)]
            .iter()
            .map(|&(w, z)| build_u_sketch(w, z).unwrap().wire())
            .collect();
        let solid = loft(&wires, &mut TagAllocator::new()).unwrap();
        let (min, max) = solid.bounds();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 28.0);
        assert_relative_eq!(max.x, 14.0);
        assert!(solid.volume() > 0.0);
    }

    #[test]
    fn test_loft_mismatched_sections() {
        let u = build_u_sketch(12.0, 0.0).unwrap().wire();
        let circle = Sketch::new(
            draw_circle(5.0, &Tessellation::default()).unwrap(),
            Plane::offset(PlaneName::XY, 10.0),
        )
        .wire();
        let err = loft(&[u.clone(), circle], &mut TagAllocator::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidLoft(_)));
        assert!(loft(&[u], &mut TagAllocator::new()).is_err());
    }

    #[test]
    fn test_wire_cannot_be_extruded() {
        let shape = Shape::from(build_u_sketch(12.0, 0.0).unwrap().wire());
        let err = shape
            .into_sketch()
            .and_then(|sketch| extrude(&sketch, 5.0, &mut TagAllocator::new()))
            .unwrap_err();
        assert_eq!(
            err,
            Error::ShapeKind {
                expected: ShapeKind::Sketch,
                actual: ShapeKind::Wire
            }
        );
    }
}
