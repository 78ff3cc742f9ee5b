// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed polygonal solids whose faces carry a [`FaceTag`]

use std::collections::BTreeSet;

use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
use csgrs::traits::CSG;

use crate::csg::FaceTag;
use crate::error::{Error, Result};
use crate::triangulation::{calculate_polygon_normal, is_convex, polygon_area, project_to_2d, triangulate_face};
use crate::{Point3, Vector3};

/// Polygons below this area are dropped as boolean debris (mm²)
pub(crate) const MIN_POLYGON_AREA: f64 = 1e-10;

/// One planar face handed to [`Solid::from_facets`]
#[derive(Debug, Clone)]
pub struct Facet {
    pub points: Vec<Point3<f64>>,
    pub tag: FaceTag,
}

impl Facet {
    #[inline]
    pub fn new(points: Vec<Point3<f64>>, tag: FaceTag) -> Self {
        Self { points, tag }
    }
}

/// A closed, outward-oriented polygon soup
#[derive(Debug, Clone)]
pub struct Solid {
    mesh: CSGMesh<FaceTag>,
}

impl Solid {
    /// Build a solid from planar facets.
    ///
    /// Non-convex facets are triangulated, degenerate ones dropped, and the
    /// whole soup is flipped if it encloses negative volume.
    pub fn from_facets(facets: Vec<Facet>) -> Result<Self> {
        let mut polygons = Vec::with_capacity(facets.len());

        for facet in facets {
            let Some(normal) = calculate_polygon_normal(&facet.points) else {
                continue;
            };
            if polygon_area(&facet.points) < MIN_POLYGON_AREA {
                continue;
            }

            let (points_2d, _, _, _) = project_to_2d(&facet.points, &normal);
            if facet.points.len() == 3 || is_convex(&points_2d) {
                polygons.push(make_polygon(&facet.points, normal, facet.tag));
                continue;
            }

            for [a, b, c] in triangulate_face(&facet.points, &normal)? {
                let tri = [facet.points[a], facet.points[b], facet.points[c]];
                if polygon_area(&tri) >= MIN_POLYGON_AREA {
                    polygons.push(make_polygon(&tri, normal, facet.tag));
                }
            }
        }

        let mut solid = Self::from_polygons(polygons, "construction")?;
        if solid.volume() < 0.0 {
            solid = Self {
                mesh: solid.mesh.inverse(),
            };
        }
        Ok(solid)
    }

    /// Wrap kernel output, dropping degenerate polygons
    pub(crate) fn from_polygons(polygons: Vec<Polygon<FaceTag>>, operation: &'static str) -> Result<Self> {
        let polygons: Vec<Polygon<FaceTag>> = polygons
            .into_iter()
            .filter(|polygon| {
                polygon.vertices.len() >= 3
                    && polygon.vertices.iter().all(|v| {
                        v.pos.x.is_finite() && v.pos.y.is_finite() && v.pos.z.is_finite()
                    })
                    && polygon_area(&positions(polygon)) >= MIN_POLYGON_AREA
            })
            .collect();

        if polygons.is_empty() {
            return Err(Error::EmptyResult(operation));
        }

        Ok(Self {
            mesh: CSGMesh::from_polygons(&polygons, None),
        })
    }

    #[inline]
    pub(crate) fn csg(&self) -> &CSGMesh<FaceTag> {
        &self.mesh
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon<FaceTag>] {
        &self.mesh.polygons
    }

    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.mesh.polygons.len()
    }

    /// Copy moved by `offset`
    pub fn translate(&self, offset: Vector3<f64>) -> Solid {
        Solid {
            mesh: self.mesh.translate(offset.x, offset.y, offset.z),
        }
    }

    /// Enclosed volume by the divergence theorem (mm³)
    pub fn volume(&self) -> f64 {
        let mut six_volume = 0.0;
        for polygon in &self.mesh.polygons {
            let v = &polygon.vertices;
            let p0 = v[0].pos.coords;
            for i in 1..v.len() - 1 {
                six_volume += p0.dot(&v[i].pos.coords.cross(&v[i + 1].pos.coords));
            }
        }
        six_volume / 6.0
    }

    /// Axis-aligned bounds `(min, max)`
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for v in self.mesh.polygons.iter().flat_map(|p| &p.vertices) {
            min = min.inf(&v.pos);
            max = max.sup(&v.pos);
        }
        (min, max)
    }

    /// Distinct face tags, sorted
    pub fn face_tags(&self) -> Vec<FaceTag> {
        self.mesh
            .polygons
            .iter()
            .filter_map(|p| p.metadata)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Tag of a kernel polygon; untagged polygons read as the default tag
#[inline]
pub(crate) fn tag_of(polygon: &Polygon<FaceTag>) -> FaceTag {
    polygon.metadata.unwrap_or_default()
}

#[inline]
pub(crate) fn positions(polygon: &Polygon<FaceTag>) -> Vec<Point3<f64>> {
    polygon.vertices.iter().map(|v| v.pos).collect()
}

fn make_polygon(points: &[Point3<f64>], normal: Vector3<f64>, tag: FaceTag) -> Polygon<FaceTag> {
    let vertices = points.iter().map(|&p| Vertex::new(p, normal)).collect();
    Polygon::new(vertices, Some(tag))
}
