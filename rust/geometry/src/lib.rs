// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plant Light Holder geometry kernel
//!
//! Pen-style sketches on planes, extrusion and ruled lofts, tagged BSP
//! booleans (csgrs), edge recovery and selection, rolling-ball fillets,
//! and triangle mesh / binary STL export.

pub mod csg;
pub mod error;
pub mod extrusion;
pub mod fillet;
pub mod mesh;
pub mod plane;
pub mod profile;
pub mod selector;
pub mod shape;
pub mod sketch;
pub mod solid;
pub mod stl;
pub mod topology;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use csg::{cut, fuse, fuse_all, intersect, FaceTag, TagAllocator};
pub use error::{Error, Result};
pub use extrusion::{extrude, loft};
pub use fillet::fillet;
pub use mesh::{EdgeGroup, EdgeLines, FaceGroup, Mesh};
pub use plane::{Plane, PlaneName};
pub use profile::{draw, draw_circle, Drawing, Profile2D, Tessellation};
pub use selector::{Axis, EdgeFilter, EdgeFinder};
pub use shape::{Shape, ShapeKind};
pub use sketch::{build_u_sketch, build_u_sketch_with, Sketch, Wire};
pub use solid::{Facet, Solid};
pub use stl::{read_binary_stl, write_binary_stl, StlSummary};
pub use topology::{split_shells, TopoEdge, TopoFace, Topology};
pub use triangulation::triangulate_polygon;
