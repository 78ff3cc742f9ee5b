// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain JavaScript views of a render mesh
//!
//! Buffers cross as typed arrays (copied out of wasm memory); the small
//! group tables go through serde-wasm-bindgen.

use js_sys::{Float32Array, Object, Uint32Array};
use lightholder_processing::RenderMesh;
use wasm_bindgen::prelude::*;

use crate::utils::set_js_prop;

/// `{ faces: { vertices, triangles, normals, faceGroups }, edges: { lines, edgeGroups } }`
pub fn render_mesh_to_js(mesh: &RenderMesh) -> Result<JsValue, JsValue> {
    let faces = Object::new();
    set_js_prop(&faces, "vertices", &Float32Array::from(&mesh.faces.vertices[..]).into());
    set_js_prop(&faces, "triangles", &Uint32Array::from(&mesh.faces.triangles[..]).into());
    set_js_prop(&faces, "normals", &Float32Array::from(&mesh.faces.normals[..]).into());
    set_js_prop(&faces, "faceGroups", &serde_wasm_bindgen::to_value(&mesh.faces.face_groups)?);

    let edges = Object::new();
    set_js_prop(&edges, "lines", &Float32Array::from(&mesh.edges.lines[..]).into());
    set_js_prop(&edges, "edgeGroups", &serde_wasm_bindgen::to_value(&mesh.edges.edge_groups)?);

    let result = Object::new();
    set_js_prop(&result, "faces", &faces.into());
    set_js_prop(&result, "edges", &edges.into());
    Ok(result.into())
}
