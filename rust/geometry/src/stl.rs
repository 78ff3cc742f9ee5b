// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary STL export and read-back

use std::io::Cursor;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::{Point3, Vector3};

/// Size of an empty binary STL: header plus triangle count
pub const STL_HEADER_LEN: usize = 84;

/// Bytes per triangle record
pub const STL_TRIANGLE_LEN: usize = 50;

/// What a parsed STL contains
#[derive(Debug, Clone, PartialEq)]
pub struct StlSummary {
    pub triangle_count: usize,
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Encode the mesh as binary STL, one record per mesh triangle.
///
/// Facet normals come from the triangle winding; degenerate triangles
/// fall back to their first vertex normal.
pub fn write_binary_stl(mesh: &Mesh) -> Result<Vec<u8>> {
    let triangles: Vec<stl_io::Triangle> = (0..mesh.triangle_count())
        .map(|i| {
            let [a, b, c] = mesh.triangle(i);
            stl_io::Triangle {
                normal: stl_io::Normal::new(facet_normal(mesh, i, &a, &b, &c)),
                vertices: [
                    stl_io::Vertex::new(a),
                    stl_io::Vertex::new(b),
                    stl_io::Vertex::new(c),
                ],
            }
        })
        .collect();

    let mut bytes = Vec::with_capacity(STL_HEADER_LEN + STL_TRIANGLE_LEN * triangles.len());
    stl_io::write_stl(&mut bytes, triangles.iter()).map_err(|e| Error::InvalidStl(e.to_string()))?;
    Ok(bytes)
}

fn facet_normal(mesh: &Mesh, i: usize, a: &[f32; 3], b: &[f32; 3], c: &[f32; 3]) -> [f32; 3] {
    let (a, b, c) = (Vector3::from(*a), Vector3::from(*b), Vector3::from(*c));
    if let Some(n) = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON) {
        return [n.x, n.y, n.z];
    }
    let v = mesh.indices[i * 3] as usize * 3;
    [mesh.normals[v], mesh.normals[v + 1], mesh.normals[v + 2]]
}

/// Parse a binary STL buffer back into its triangle count and bounds
pub fn read_binary_stl(bytes: &[u8]) -> Result<StlSummary> {
    if bytes.len() < STL_HEADER_LEN {
        return Err(Error::InvalidStl(format!(
            "{} bytes is shorter than the {STL_HEADER_LEN} byte header",
            bytes.len()
        )));
    }
    let declared = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let expected = declared
        .checked_mul(STL_TRIANGLE_LEN)
        .and_then(|n| n.checked_add(STL_HEADER_LEN))
        .ok_or_else(|| Error::InvalidStl(format!("header declares an impossible {declared} triangles")))?;
    if bytes.len() < expected {
        return Err(Error::InvalidStl(format!(
            "header declares {declared} triangles ({expected} bytes), buffer has {}",
            bytes.len()
        )));
    }

    let indexed = stl_io::read_stl(&mut Cursor::new(bytes)).map_err(|e| Error::InvalidStl(e.to_string()))?;

    let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
    for v in &indexed.vertices {
        let p = Point3::new(v.0[0], v.0[1], v.0[2]);
        min = min.inf(&p);
        max = max.sup(&p);
    }
    if indexed.vertices.is_empty() {
        min = Point3::origin();
        max = Point3::origin();
    }

    Ok(StlSummary {
        triangle_count: indexed.faces.len(),
        min,
        max,
    })
}
