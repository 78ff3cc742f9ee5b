// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render mesh and STL views of a finished solid

use lightholder_geometry::mesh::{edge_lines, mesh_topology};
use lightholder_geometry::{write_binary_stl, EdgeGroup, FaceGroup, Solid, Topology};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Base name of exported files
pub const MODEL_NAME: &str = "plant-light-holder";

/// File name for the STL download
pub fn stl_filename() -> String {
    format!("{MODEL_NAME}.stl")
}

/// Triangles of the solid, grouped by face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceBuffers {
    /// Flat xyz positions
    pub vertices: Vec<f32>,
    /// Three vertex indices per triangle
    pub triangles: Vec<u32>,
    /// Flat xyz normals, one per vertex
    pub normals: Vec<f32>,
    pub face_groups: Vec<FaceRange>,
}

/// `count` triangle indices from `start` belong to face `face_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceRange {
    pub start: u32,
    pub count: u32,
    pub face_id: u32,
}

/// Line segments of the solid's edges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeBuffers {
    /// Flat xyz positions, two per segment
    pub lines: Vec<f32>,
    pub edge_groups: Vec<EdgeRange>,
}

/// `count` line vertices from `start` belong to edge `edge_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRange {
    pub start: u32,
    pub count: u32,
    pub edge_id: u32,
}

/// Read-only view of a solid for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMesh {
    pub faces: FaceBuffers,
    pub edges: EdgeBuffers,
}

impl RenderMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.faces.vertices.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.triangles.len() / 3
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.edge_groups.len()
    }

    /// Axis-aligned bounds `(min, max)` of the vertices
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in self.faces.vertices.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        (min, max)
    }
}

impl From<FaceGroup> for FaceRange {
    fn from(group: FaceGroup) -> Self {
        Self {
            start: group.start,
            count: group.count,
            face_id: group.face_id,
        }
    }
}

impl From<EdgeGroup> for EdgeRange {
    fn from(group: EdgeGroup) -> Self {
        Self {
            start: group.start,
            count: group.count,
            edge_id: group.edge_id,
        }
    }
}

/// Faces and edges of `solid`, from one topology pass
pub fn to_render_mesh(solid: &Solid) -> Result<RenderMesh> {
    let topology = Topology::build(solid);
    let mesh = mesh_topology(&topology)?;
    let edges = edge_lines(&topology);

    Ok(RenderMesh {
        faces: FaceBuffers {
            vertices: mesh.positions,
            triangles: mesh.indices,
            normals: mesh.normals,
            face_groups: mesh.face_groups.into_iter().map(FaceRange::from).collect(),
        },
        edges: EdgeBuffers {
            lines: edges.lines,
            edge_groups: edges.groups.into_iter().map(EdgeRange::from).collect(),
        },
    })
}

/// Binary STL of `solid`, triangle for triangle the render mesh
pub fn to_binary_stl(solid: &Solid) -> Result<Vec<u8>> {
    let mesh = solid.mesh()?;
    Ok(write_binary_stl(&mesh)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightholder_geometry::{build_u_sketch, extrude, read_binary_stl, TagAllocator};

    fn plate() -> Solid {
        let sketch = build_u_sketch(20.0, 0.0).unwrap();
        extrude(&sketch, 8.0, &mut TagAllocator::new()).unwrap()
    }

    #[test]
    fn test_filename() {
        assert_eq!(stl_filename(), "plant-light-holder.stl");
    }

    #[test]
    fn test_render_mesh_groups_cover_buffers() {
        let mesh = to_render_mesh(&plate()).unwrap();
        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.faces.normals.len(), mesh.faces.vertices.len());

        let indices: u32 = mesh.faces.face_groups.iter().map(|g| g.count).sum();
        assert_eq!(indices as usize, mesh.faces.triangles.len());
        let line_vertices: u32 = mesh.edges.edge_groups.iter().map(|g| g.count).sum();
        assert_eq!(line_vertices as usize * 3, mesh.edges.lines.len());

        let (min, max) = mesh.bounds();
        assert_eq!(min[2], 0.0);
        assert_eq!(max[2], 8.0);
    }

    #[test]
    fn test_stl_matches_render_mesh() {
        let solid = plate();
        let mesh = to_render_mesh(&solid).unwrap();
        let summary = read_binary_stl(&to_binary_stl(&solid).unwrap()).unwrap();
        assert_eq!(summary.triangle_count, mesh.triangle_count());
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_value(to_render_mesh(&plate()).unwrap()).unwrap();
        assert!(json["faces"]["faceGroups"].is_array());
        assert!(json["edges"]["edgeGroups"][0]["edgeId"].is_number());
        assert!(json["faces"]["triangles"].is_array());
    }
}
