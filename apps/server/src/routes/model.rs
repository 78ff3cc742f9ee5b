// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model endpoints.
//!
//! Both build endpoints take an optional JSON body of camelCase
//! parameters. Missing fields, or a missing body, fall back to the
//! parameters of the last successful build. Builds are CPU-bound and run
//! on the blocking pool.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use lightholder_processing::{stl_filename, ModelParams, PartialParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::types::{MeshResponse, ParamsResponse};

/// Header carrying the sequence number of the build behind a response.
pub const BUILD_SEQ_HEADER: HeaderName = HeaderName::from_static("x-build-seq");

/// GET /api/v1/params
pub async fn params(State(state): State<AppState>) -> Json<ParamsResponse> {
    Json(ParamsResponse {
        defaults: ModelParams::default(),
        ranges: ModelParams::ranges(),
        last_used: state.service.last_params(),
        latest_seq: state.service.latest_seq(),
    })
}

/// POST /api/v1/mesh
pub async fn mesh(State(state): State<AppState>, body: Bytes) -> Result<Json<MeshResponse>, ApiError> {
    let partial = parse_params(&body)?;
    let service = Arc::clone(&state.service);
    let start = Instant::now();

    let job = tokio::task::spawn_blocking(move || service.mesh_job(partial)).await??;

    tracing::info!(
        seq = job.seq,
        vertices = job.output.vertex_count(),
        triangles = job.output.triangle_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "mesh built"
    );
    Ok(Json(job.into()))
}

/// POST /api/v1/stl
pub async fn stl(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let partial = parse_params(&body)?;
    let service = Arc::clone(&state.service);
    let start = Instant::now();

    let job = tokio::task::spawn_blocking(move || service.blob_job(partial)).await??;

    tracing::info!(
        seq = job.seq,
        bytes = job.output.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "stl built"
    );

    let headers = [
        (header::CONTENT_TYPE, "model/stl".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", stl_filename()),
        ),
        (BUILD_SEQ_HEADER, job.seq.to_string()),
    ];
    Ok((headers, job.output).into_response())
}

/// An empty or whitespace-only body means "no overrides".
fn parse_params(body: &[u8]) -> Result<Option<PartialParams>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}
