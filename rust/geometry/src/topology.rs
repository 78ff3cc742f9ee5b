// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face and edge recovery from a tagged polygon soup
//!
//! Booleans return independent polygons. To find edges again the
//! vertices are welded, T-junctions left by BSP splits are stitched into
//! the neighbouring loops, and every polygon edge shared by two faces
//! with different tags and different planes becomes a feature segment.
//! Segments between the same pair of faces are chained into logical
//! edges, which is what selectors and fillets work on.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::csg::FaceTag;
use crate::solid::{positions, tag_of, Solid};
use crate::triangulation::calculate_polygon_normal;
use crate::{Point3, Vector3};

/// Vertices closer than this are the same vertex (mm)
pub const WELD_TOLERANCE: f64 = 1e-5;

/// Cell size of the grid used to find T-junction vertices (mm)
const JUNCTION_CELL: f64 = 2.0;

/// Normals with a dot product above this lie in the same plane direction
const PARALLEL_COS: f64 = 1.0 - 1e-6;

/// Chains break where consecutive segments turn by more than 60 degrees
const SHARP_TURN_COS: f64 = 0.5;

/// Shells enclosing less than this are boolean debris (mm³)
const MIN_SHELL_VOLUME: f64 = 1e-3;

type Cell = (i64, i64, i64);

/// One welded polygon
#[derive(Debug, Clone)]
pub struct TopoFace {
    pub tag: FaceTag,
    pub normal: Vector3<f64>,
    /// Loop of vertex ids, T-junctions included
    pub vertices: Vec<u32>,
    /// Index of the source polygon in the solid
    pub polygon: usize,
}

/// A chain of feature segments between two faces
#[derive(Debug, Clone)]
pub struct TopoEdge {
    pub id: u32,
    /// The two faces, lower tag first
    pub tags: (FaceTag, FaceTag),
    /// Chain points; a closed chain repeats its first point at the end
    pub points: Vec<Point3<f64>>,
    /// Per segment: normals of the `tags.0` and `tags.1` faces
    pub normals: Vec<(Vector3<f64>, Vector3<f64>)>,
    /// Per segment: whether the solid is convex across it
    pub convex: Vec<bool>,
    pub closed: bool,
}

impl TopoEdge {
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// `Some(true)` if convex everywhere, `Some(false)` if concave everywhere
    pub fn convexity(&self) -> Option<bool> {
        let first = *self.convex.first()?;
        self.convex.iter().all(|&c| c == first).then_some(first)
    }

    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }
}

/// Welded faces and feature edges of one solid
#[derive(Debug, Clone)]
pub struct Topology {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<TopoFace>,
    pub edges: Vec<TopoEdge>,
}

impl Topology {
    pub fn build(solid: &Solid) -> Topology {
        let mut welder = Welder::new(WELD_TOLERANCE);
        let mut faces = Vec::with_capacity(solid.polygon_count());

        for (index, polygon) in solid.polygons().iter().enumerate() {
            let points = positions(polygon);
            let Some(normal) = calculate_polygon_normal(&points) else {
                continue;
            };

            let mut ids: Vec<u32> = Vec::with_capacity(points.len());
            for p in &points {
                let id = welder.insert(*p);
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            while ids.len() > 1 && ids.first() == ids.last() {
                ids.pop();
            }
            if ids.len() < 3 {
                continue;
            }

            faces.push(TopoFace {
                tag: tag_of(polygon),
                normal,
                vertices: ids,
                polygon: index,
            });
        }

        let vertices = welder.points;
        repair_t_junctions(&vertices, &mut faces);
        let incidence = edge_incidence(&faces);
        unify_coplanar_tags(&mut faces, &incidence);
        let edges = feature_edges(&vertices, &faces, &incidence);

        Topology {
            vertices,
            faces,
            edges,
        }
    }

    #[inline]
    pub fn face_points(&self, face: &TopoFace) -> Vec<Point3<f64>> {
        face.vertices
            .iter()
            .map(|&v| self.vertices[v as usize])
            .collect()
    }

    pub fn faces_with_tag(&self, tag: FaceTag) -> impl Iterator<Item = &TopoFace> + '_ {
        self.faces.iter().filter(move |f| f.tag == tag)
    }

    /// Groups of face indices connected through shared vertices
    pub fn shells(&self) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.faces.len()).collect();
        let mut owner: FxHashMap<u32, usize> = FxHashMap::default();

        for (index, face) in self.faces.iter().enumerate() {
            for &v in &face.vertices {
                match owner.get(&v) {
                    Some(&other) => union(&mut parent, index, other),
                    None => {
                        owner.insert(v, index);
                    }
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for index in 0..self.faces.len() {
            let root = find(&mut parent, index);
            groups.entry(root).or_default().push(index);
        }
        groups.into_values().collect()
    }
}

/// Split a solid into its connected shells, dropping zero-volume debris
pub fn split_shells(solid: &Solid) -> Vec<Solid> {
    let topology = Topology::build(solid);
    topology
        .shells()
        .into_iter()
        .filter_map(|shell| {
            let polygons = shell
                .iter()
                .map(|&f| solid.polygons()[topology.faces[f].polygon].clone())
                .collect();
            Solid::from_polygons(polygons, "split").ok()
        })
        .filter(|shell| shell.volume().abs() >= MIN_SHELL_VOLUME)
        .collect()
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        // Lower root wins so grouping order stays stable
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

/// Grid-hashed vertex welding
struct Welder {
    tolerance: f64,
    cells: FxHashMap<Cell, SmallVec<[u32; 2]>>,
    points: Vec<Point3<f64>>,
}

impl Welder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: FxHashMap::default(),
            points: Vec::new(),
        }
    }

    #[inline]
    fn cell(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
            (p.z / self.tolerance).floor() as i64,
        )
    }

    fn insert(&mut self, p: Point3<f64>) -> u32 {
        let (cx, cy, cz) = self.cell(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(ids) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &id in ids {
                            if (self.points[id as usize] - p).norm() <= self.tolerance {
                                return id;
                            }
                        }
                    }
                }
            }
        }

        let id = self.points.len() as u32;
        self.points.push(p);
        self.cells.entry((cx, cy, cz)).or_default().push(id);
        id
    }
}

#[inline]
fn junction_cell(p: &Point3<f64>) -> Cell {
    (
        (p.x / JUNCTION_CELL).floor() as i64,
        (p.y / JUNCTION_CELL).floor() as i64,
        (p.z / JUNCTION_CELL).floor() as i64,
    )
}

/// Insert every vertex lying on the interior of a loop edge into that loop
fn repair_t_junctions(vertices: &[Point3<f64>], faces: &mut [TopoFace]) {
    let mut grid: FxHashMap<Cell, Vec<u32>> = FxHashMap::default();
    for (id, p) in vertices.iter().enumerate() {
        grid.entry(junction_cell(p)).or_default().push(id as u32);
    }

    for face in faces.iter_mut() {
        let n = face.vertices.len();
        let mut repaired = Vec::with_capacity(n);

        for i in 0..n {
            let a = face.vertices[i];
            let b = face.vertices[(i + 1) % n];
            repaired.push(a);

            let pa = vertices[a as usize];
            let pb = vertices[b as usize];
            let d = pb - pa;
            let len_sq = d.norm_squared();
            if len_sq <= WELD_TOLERANCE * WELD_TOLERANCE {
                continue;
            }
            let len = len_sq.sqrt();

            let lo = pa.inf(&pb) - Vector3::repeat(WELD_TOLERANCE);
            let hi = pa.sup(&pb) + Vector3::repeat(WELD_TOLERANCE);
            let (lx, ly, lz) = junction_cell(&lo);
            let (hx, hy, hz) = junction_cell(&hi);

            let mut on_edge: SmallVec<[(f64, u32); 4]> = SmallVec::new();
            for cx in lx..=hx {
                for cy in ly..=hy {
                    for cz in lz..=hz {
                        let Some(ids) = grid.get(&(cx, cy, cz)) else {
                            continue;
                        };
                        for &v in ids {
                            if v == a || v == b || face.vertices.contains(&v) {
                                continue;
                            }
                            let pv = vertices[v as usize];
                            let t = (pv - pa).dot(&d) / len_sq;
                            if t * len <= WELD_TOLERANCE || (1.0 - t) * len <= WELD_TOLERANCE {
                                continue;
                            }
                            if (pa + d * t - pv).norm() <= WELD_TOLERANCE {
                                on_edge.push((t, v));
                            }
                        }
                    }
                }
            }

            on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));
            repaired.extend(on_edge.iter().map(|&(_, v)| v));
        }

        face.vertices = repaired;
    }
}

/// One polygon edge on a crease between two tagged faces
#[derive(Debug, Clone, Copy)]
struct FeatureSegment {
    a: u32,
    b: u32,
    tags: (FaceTag, FaceTag),
    normals: (Vector3<f64>, Vector3<f64>),
    convex: bool,
}

/// Undirected edge -> (face, traversed low-to-high)
type Incidence = FxHashMap<(u32, u32), SmallVec<[(usize, bool); 2]>>;

fn edge_incidence(faces: &[TopoFace]) -> Incidence {
    let mut incidence = Incidence::default();
    for (index, face) in faces.iter().enumerate() {
        let n = face.vertices.len();
        for i in 0..n {
            let a = face.vertices[i];
            let b = face.vertices[(i + 1) % n];
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            incidence.entry(key).or_default().push((index, a < b));
        }
    }
    incidence
}

/// Give adjacent coplanar faces the lowest of their tags.
///
/// Fused or cut solids leave one planar region split between the tags of
/// the operands; treating it as one face keeps its boundary a single edge.
fn unify_coplanar_tags(faces: &mut [TopoFace], incidence: &Incidence) {
    let tags: Vec<FaceTag> = faces
        .iter()
        .map(|f| f.tag)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let slot = |tag: FaceTag| tags.binary_search(&tag).unwrap_or(0);
    let mut parent: Vec<usize> = (0..tags.len()).collect();

    for entries in incidence.values() {
        for (i, &(fi, _)) in entries.iter().enumerate() {
            for &(fj, _) in &entries[i + 1..] {
                let (a, b) = (&faces[fi], &faces[fj]);
                if a.tag != b.tag && a.normal.dot(&b.normal) >= PARALLEL_COS {
                    union(&mut parent, slot(a.tag), slot(b.tag));
                }
            }
        }
    }

    for face in faces.iter_mut() {
        let root = find(&mut parent, slot(face.tag));
        face.tag = tags[root];
    }
}

fn feature_edges(vertices: &[Point3<f64>], faces: &[TopoFace], incidence: &Incidence) -> Vec<TopoEdge> {
    let mut keys: Vec<(u32, u32)> = incidence.keys().copied().collect();
    keys.sort_unstable();

    let mut segments = Vec::new();
    for key in keys {
        if let Some(segment) = crease(vertices, faces, key, &incidence[&key]) {
            segments.push(segment);
        }
    }

    chain_segments(vertices, &segments)
}

/// The crease across an undirected edge, if its faces differ in tag and plane
fn crease(
    vertices: &[Point3<f64>],
    faces: &[TopoFace],
    (u, v): (u32, u32),
    entries: &[(usize, bool)],
) -> Option<FeatureSegment> {
    for (i, &(fi, forward_i)) in entries.iter().enumerate() {
        for &(fj, forward_j) in &entries[i + 1..] {
            if forward_i == forward_j {
                continue;
            }
            let (f1, f2) = if forward_i { (&faces[fi], &faces[fj]) } else { (&faces[fj], &faces[fi]) };
            if f1.tag == f2.tag || f1.normal.dot(&f2.normal).abs() >= PARALLEL_COS {
                continue;
            }

            // f1 runs u -> v, so its interior lies on the n1 x d side
            let d = vertices[v as usize] - vertices[u as usize];
            let inward = f1.normal.cross(&d);
            let convex = f2.normal.dot(&inward) < 0.0;

            let (tags, normals) = if f1.tag < f2.tag {
                ((f1.tag, f2.tag), (f1.normal, f2.normal))
            } else {
                ((f2.tag, f1.tag), (f2.normal, f1.normal))
            };
            return Some(FeatureSegment {
                a: u,
                b: v,
                tags,
                normals,
                convex,
            });
        }
    }
    None
}

fn chain_segments(vertices: &[Point3<f64>], segments: &[FeatureSegment]) -> Vec<TopoEdge> {
    let mut groups: BTreeMap<(FaceTag, FaceTag), Vec<usize>> = BTreeMap::new();
    for (index, segment) in segments.iter().enumerate() {
        groups.entry(segment.tags).or_default().push(index);
    }

    let mut edges = Vec::new();
    let mut visited = vec![false; segments.len()];

    for (tags, members) in groups {
        let mut adjacency: FxHashMap<u32, SmallVec<[usize; 2]>> = FxHashMap::default();
        for &s in &members {
            adjacency.entry(segments[s].a).or_default().push(s);
            adjacency.entry(segments[s].b).or_default().push(s);
        }

        // The segment continuing the chain through `vertex`, if the chain goes on
        let continue_through = |vertex: u32, from: usize| -> Option<usize> {
            let around = adjacency.get(&vertex)?;
            if around.len() != 2 {
                return None;
            }
            let next = if around[0] == from { around[1] } else { around[0] };
            let p = vertices[vertex as usize];
            let back = vertices[other_end(&segments[from], vertex) as usize] - p;
            let ahead = vertices[other_end(&segments[next], vertex) as usize] - p;
            let cos = -back.dot(&ahead) / (back.norm() * ahead.norm());
            (cos >= SHARP_TURN_COS).then_some(next)
        };

        for &start in &members {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let mut chain: Vec<u32> = vec![segments[start].a, segments[start].b];
            let mut chain_segs: Vec<usize> = vec![start];

            // Forward from b
            let (mut at, mut from) = (segments[start].b, start);
            while let Some(next) = continue_through(at, from) {
                if visited[next] {
                    break;
                }
                visited[next] = true;
                at = other_end(&segments[next], at);
                from = next;
                chain.push(at);
                chain_segs.push(next);
            }

            let closed = chain.len() > 3 && chain.first() == chain.last();

            if !closed {
                let (mut at, mut from) = (segments[start].a, start);
                while let Some(next) = continue_through(at, from) {
                    if visited[next] {
                        break;
                    }
                    visited[next] = true;
                    at = other_end(&segments[next], at);
                    from = next;
                    chain.insert(0, at);
                    chain_segs.insert(0, next);
                }
            }

            edges.push(TopoEdge {
                id: edges.len() as u32,
                tags,
                points: chain.iter().map(|&v| vertices[v as usize]).collect(),
                normals: chain_segs.iter().map(|&s| segments[s].normals).collect(),
                convex: chain_segs.iter().map(|&s| segments[s].convex).collect(),
                closed,
            });
        }
    }

    edges
}

#[inline]
fn other_end(segment: &FeatureSegment, vertex: u32) -> u32 {
    if segment.a == vertex {
        segment.b
    } else {
        segment.a
    }
}
