// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use lightholder_processing::{Job, ModelParams, ParamRanges, RenderMesh};
use serde::Serialize;

/// Parameter defaults, accepted ranges and the last parameters built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamsResponse {
    pub defaults: ModelParams,
    pub ranges: ParamRanges,
    pub last_used: ModelParams,
    /// Sequence number of the most recent request.
    pub latest_seq: u64,
}

/// A built render mesh, labelled with the request that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct MeshResponse {
    pub seq: u64,
    pub params: ModelParams,
    pub mesh: RenderMesh,
}

impl From<Job<RenderMesh>> for MeshResponse {
    fn from(job: Job<RenderMesh>) -> Self {
        Self {
            seq: job.seq,
            params: job.params,
            mesh: job.output,
        }
    }
}
