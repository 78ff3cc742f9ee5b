// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render mesh and edge polylines of a [`Solid`]

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::Result;
use crate::solid::Solid;
use crate::topology::{TopoFace, Topology};
use crate::triangulation::{is_convex, project_to_2d, triangulate_face};
use crate::{Point3, Vector3};

/// Normals of one face further apart than this are not smoothed together
const CREASE_COS: f64 = 0.7;

/// Corners with a turn below this are collinear
const COLLINEAR_SIN: f64 = 1e-9;

/// Contiguous triangle indices belonging to one logical face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGroup {
    /// First index into `Mesh::indices`
    pub start: u32,
    /// Number of indices, three per triangle
    pub count: u32,
    pub face_id: u32,
}

/// Contiguous line vertices belonging to one logical edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeGroup {
    /// First vertex in `EdgeLines::lines` (three floats each)
    pub start: u32,
    /// Number of vertices, two per segment
    pub count: u32,
    pub edge_id: u32,
}

/// Triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
    pub face_groups: Vec<FaceGroup>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when no position or normal is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.positions.iter().chain(&self.normals).all(|v| v.is_finite())
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Corner positions of triangle `i`
    pub fn triangle(&self, i: usize) -> [[f32; 3]; 3] {
        let corner = |k: usize| {
            let v = self.indices[i * 3 + k] as usize * 3;
            [self.positions[v], self.positions[v + 1], self.positions[v + 2]]
        };
        [corner(0), corner(1), corner(2)]
    }
}

/// Polylines of the logical edges, as line-segment vertex pairs
#[derive(Debug, Clone, Default)]
pub struct EdgeLines {
    pub lines: Vec<f32>,
    pub groups: Vec<EdgeGroup>,
}

impl EdgeLines {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.lines.len() / 3
    }
}

impl Solid {
    /// Triangulate the solid.
    ///
    /// Triangles are grouped by logical face. Normals are smooth inside a
    /// face and split along the edges between faces.
    pub fn mesh(&self) -> Result<Mesh> {
        mesh_topology(&Topology::build(self))
    }

    /// Polylines of every logical edge, one group per edge
    pub fn mesh_edges(&self) -> EdgeLines {
        edge_lines(&Topology::build(self))
    }
}

pub fn mesh_topology(topology: &Topology) -> Result<Mesh> {
    let mut by_tag: BTreeMap<u32, Vec<&TopoFace>> = BTreeMap::new();
    for face in &topology.faces {
        by_tag.entry(face.tag.0).or_default().push(face);
    }

    let mut mesh = Mesh::new();
    for (face_id, faces) in by_tag {
        let start = mesh.indices.len() as u32;
        let smooth = smooth_normals(&faces);
        let mut index_of: FxHashMap<(u32, usize), u32> = FxHashMap::default();

        for face in faces {
            let points = topology.face_points(face);
            let mut corner_index = |slot: usize, mesh: &mut Mesh| -> u32 {
                let vertex = face.vertices[slot];
                let group = smooth.group(vertex, &face.normal);
                *index_of.entry((vertex, group)).or_insert_with(|| {
                    let normal = smooth.normal(vertex, group).unwrap_or(face.normal);
                    mesh.add_vertex(topology.vertices[vertex as usize], normal)
                })
            };

            match fan_plan(&points, &face.normal) {
                FanPlan::FromFirst => {
                    let first = corner_index(0, &mut mesh);
                    for k in 1..points.len() - 1 {
                        let b = corner_index(k, &mut mesh);
                        let c = corner_index(k + 1, &mut mesh);
                        mesh.add_triangle(first, b, c);
                    }
                }
                FanPlan::FromCentroid => {
                    let centroid = Point3::from(
                        points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / points.len() as f64,
                    );
                    let center = mesh.add_vertex(centroid, face.normal);
                    for k in 0..points.len() {
                        let a = corner_index(k, &mut mesh);
                        let b = corner_index((k + 1) % points.len(), &mut mesh);
                        mesh.add_triangle(center, a, b);
                    }
                }
                FanPlan::Earcut => {
                    for [a, b, c] in triangulate_face(&points, &face.normal)? {
                        let a = corner_index(a, &mut mesh);
                        let b = corner_index(b, &mut mesh);
                        let c = corner_index(c, &mut mesh);
                        mesh.add_triangle(a, b, c);
                    }
                }
            }
        }

        let count = mesh.indices.len() as u32 - start;
        if count > 0 {
            mesh.face_groups.push(FaceGroup { start, count, face_id });
        }
    }

    Ok(mesh)
}

pub fn edge_lines(topology: &Topology) -> EdgeLines {
    let mut out = EdgeLines::default();
    for edge in &topology.edges {
        let start = out.vertex_count() as u32;
        for (a, b) in edge.segments() {
            out.lines.extend([a.x as f32, a.y as f32, a.z as f32]);
            out.lines.extend([b.x as f32, b.y as f32, b.z as f32]);
        }
        out.groups.push(EdgeGroup {
            start,
            count: out.vertex_count() as u32 - start,
            edge_id: edge.id,
        });
    }
    out
}

enum FanPlan {
    FromFirst,
    FromCentroid,
    Earcut,
}

/// Convex loops are fanned; loops with collinear corners (left by
/// T-junction repair) are fanned from their centroid to avoid slivers.
fn fan_plan(points: &[Point3<f64>], normal: &Vector3<f64>) -> FanPlan {
    let (points_2d, _, _, _) = project_to_2d(points, normal);
    if points.len() > 3 && !is_convex(&points_2d) {
        return FanPlan::Earcut;
    }
    let n = points.len();
    let collinear = (0..n).any(|i| {
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        let (u, v) = (points[i] - prev, next - points[i]);
        u.cross(&v).norm() <= COLLINEAR_SIN * u.norm() * v.norm()
    });
    if collinear {
        FanPlan::FromCentroid
    } else {
        FanPlan::FromFirst
    }
}

/// Per-vertex normal groups within one logical face
struct SmoothNormals {
    groups: FxHashMap<u32, SmallVec<[Vector3<f64>; 2]>>,
}

impl SmoothNormals {
    /// Group index of a face corner, by the face normal
    fn group(&self, vertex: u32, normal: &Vector3<f64>) -> usize {
        self.groups
            .get(&vertex)
            .and_then(|sums| {
                sums.iter()
                    .position(|sum| sum.try_normalize(1e-12).is_some_and(|n| n.dot(normal) >= CREASE_COS))
            })
            .unwrap_or(0)
    }

    fn normal(&self, vertex: u32, group: usize) -> Option<Vector3<f64>> {
        self.groups
            .get(&vertex)
            .and_then(|sums| sums.get(group))
            .and_then(|sum| sum.try_normalize(1e-12))
    }
}

fn smooth_normals(faces: &[&TopoFace]) -> SmoothNormals {
    let mut groups: FxHashMap<u32, SmallVec<[Vector3<f64>; 2]>> = FxHashMap::default();
    for face in faces {
        for &v in &face.vertices {
            let sums = groups.entry(v).or_default();
            let slot = sums.iter().position(|sum| {
                sum.try_normalize(1e-12)
                    .is_some_and(|n| n.dot(&face.normal) >= CREASE_COS)
            });
            match slot {
                Some(i) => sums[i] += face.normal,
                None => sums.push(face.normal),
            }
        }
    }
    SmoothNormals { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::TagAllocator;
    use crate::extrusion::extrude;
    use crate::plane::{Plane, PlaneName};
    use crate::profile::{draw_circle, Tessellation};
    use crate::sketch::Sketch;
    use crate::solid::tests::tagged_box;

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        let index = mesh.add_vertex(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(index, 0);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_box_mesh() {
        let solid = tagged_box(Point3::origin(), Point3::new(1.0, 2.0, 3.0), 1);
        let mesh = solid.mesh().unwrap();

        assert_eq!(mesh.triangle_count(), 12);
        // Flat faces keep their own corners: 6 faces x 4 corners
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.face_groups.len(), 6);
        assert!(mesh.is_finite());

        let grouped: u32 = mesh.face_groups.iter().map(|g| g.count).sum();
        assert_eq!(grouped as usize, mesh.indices.len());

        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cylinder_side_is_smooth() {
        let circle = draw_circle(2.0, &Tessellation::default()).unwrap();
        let sketch = Sketch::new(circle, Plane::named(PlaneName::XY));
        let solid = extrude(&sketch, 5.0, &mut TagAllocator::new()).unwrap();
        let mesh = solid.mesh().unwrap();

        // Caps and one side face
        assert_eq!(mesh.face_groups.len(), 3);
        // The side shares its 64 corners between neighbouring quads
        let side = mesh.face_groups.iter().max_by_key(|g| g.count).unwrap();
        let mut corners: Vec<u32> = mesh.indices[side.start as usize..(side.start + side.count) as usize].to_vec();
        corners.sort_unstable();
        corners.dedup();
        assert_eq!(corners.len(), 64);

        // Side normals point radially outwards
        for &v in &corners {
            let i = v as usize * 3;
            let (px, py) = (mesh.positions[i], mesh.positions[i + 1]);
            let (nx, ny, nz) = (mesh.normals[i], mesh.normals[i + 1], mesh.normals[i + 2]);
            assert!(nz.abs() < 1e-6);
            assert!(px * nx + py * ny > 0.0);
        }
    }

    #[test]
    fn test_edge_lines_of_box() {
        let solid = tagged_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0), 1);
        let edges = solid.mesh_edges();
        assert_eq!(edges.groups.len(), 12);
        assert_eq!(edges.vertex_count(), 24);
        for group in &edges.groups {
            assert_eq!(group.count, 2);
        }
        let ids: Vec<u32> = edges.groups.iter().map(|g| g.edge_id).collect();
        let mut sorted = ids.clone();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_collinear_loop_fans_from_centroid() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(matches!(fan_plan(&points, &Vector3::z()), FanPlan::FromCentroid));
        assert!(matches!(fan_plan(&points[1..], &Vector3::z()), FanPlan::FromFirst));
    }
}
