// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plant light holder build pipeline
//!
//! Shared by the HTTP server and the wasm bindings:
//!
//! - [`model`]: parameters to a filleted solid, stage by stage
//! - [`export`]: render mesh and binary STL views of that solid
//! - [`kernel`]: the ready handle every build takes
//! - [`service`]: sequence-numbered requests with last-used parameters

pub mod error;
pub mod export;
pub mod kernel;
pub mod model;
pub mod service;

pub use error::{BuildError, Result};
pub use export::{
    stl_filename, to_binary_stl, to_render_mesh, EdgeBuffers, EdgeRange, FaceBuffers, FaceRange,
    RenderMesh, MODEL_NAME,
};
pub use kernel::Kernel;
pub use model::{apply_fillets, build_parts, build_solid, ModelParts};
pub use service::{Job, ModelService};

pub use lightholder_core::{ModelParams, ParamRanges, PartialParams};
