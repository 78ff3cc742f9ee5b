// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for 2D polygon triangulation, plus the small
//! amount of plane math needed to feed it 3D faces.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
///
/// Collinear runs are allowed; they show up wherever an arc meets a
/// tangent line or a boolean split an edge.
#[inline]
pub fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    sign != 0
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    if indices.is_empty() {
        return Err(Error::TriangulationError(format!(
            "earcut produced no triangles for a {n}-gon"
        )));
    }

    Ok(indices)
}

/// Triangulate a planar 3D loop.
///
/// Every returned triangle is wound counter-clockwise around `normal`,
/// whatever order earcut chose.
pub fn triangulate_face(points: &[Point3<f64>], normal: &Vector3<f64>) -> Result<Vec<[usize; 3]>> {
    let (points_2d, _, _, _) = project_to_2d(points, normal);
    let indices = triangulate_polygon(&points_2d)?;

    Ok(indices
        .chunks_exact(3)
        .map(|tri| {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let winding = (points[b] - points[a]).cross(&(points[c] - points[a]));
            if winding.dot(normal) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect())
}

/// Project 3D points onto a 2D plane defined by a normal
/// Returns 2D points and the coordinate system (u_axis, v_axis, origin)
///
/// The basis is right-handed around `normal`, so winding is preserved.
#[inline]
pub fn project_to_2d(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, Vector3<f64>, Vector3<f64>, Point3<f64>) {
    if points_3d.is_empty() {
        return (
            Vec::new(),
            Vector3::zeros(),
            Vector3::zeros(),
            Point3::origin(),
        );
    }

    let origin = points_3d[0];

    // Find the axis least parallel to the normal for stable cross product
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    let points_2d = points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect();

    (points_2d, u_axis, v_axis, origin)
}

/// Unnormalised Newell vector of a loop; its length is twice the area.
#[inline]
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal
}

/// Unit normal of a loop by Newell's method, `None` when the loop has no area
#[inline]
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    let normal = newell_vector(points);
    let len = normal.norm();
    (len > 1e-12).then(|| normal / len)
}

/// Area of a planar 3D loop
#[inline]
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    newell_vector(points).norm() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_square() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_concave_l_shape() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(!is_convex(&points));

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
    }

    #[test]
    fn test_collinear_points_stay_convex() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(is_convex(&points));
    }

    #[test]
    fn test_triangulate_face_follows_normal() {
        // Clockwise seen from +z
        let points = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let up = Vector3::z();
        for [a, b, c] in triangulate_face(&points, &up).unwrap() {
            let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_calculate_polygon_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];

        let normal = calculate_polygon_normal(&points).unwrap();
        assert!((normal.z - 1.0).abs() < 1e-12);
        assert!((polygon_area(&points) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_polygon_has_no_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(calculate_polygon_normal(&points).is_none());
    }
}
