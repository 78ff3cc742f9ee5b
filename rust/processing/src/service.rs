// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request handling shared by the HTTP server and the browser worker
//!
//! Each request gets a sequence number. Builds are pure functions of their
//! parameters, so overlapping requests need no locking beyond the
//! last-used parameters; callers drop completions that [`ModelService::is_stale`]
//! reports as superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lightholder_core::{ModelParams, PartialParams};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::export::{to_binary_stl, to_render_mesh, RenderMesh};
use crate::kernel::Kernel;
use crate::model::build_solid;

/// Output of one request, labelled with its sequence number
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job<T> {
    pub seq: u64,
    pub params: ModelParams,
    pub output: T,
}

pub struct ModelService {
    kernel: Kernel,
    /// Parameters of the newest successful build, with its sequence number
    last_params: Mutex<(u64, ModelParams)>,
    seq: AtomicU64,
}

impl ModelService {
    pub fn new(kernel: Kernel) -> Self {
        Self::with_params(kernel, ModelParams::default())
    }

    pub fn with_params(kernel: Kernel, params: ModelParams) -> Self {
        Self {
            kernel,
            last_params: Mutex::new((0, params)),
            seq: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Parameters of the last successful build, or the initial ones
    pub fn last_params(&self) -> ModelParams {
        self.last_params.lock().unwrap_or_else(|e| e.into_inner()).1
    }

    /// Most recently issued sequence number
    #[inline]
    pub fn latest_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    /// True once a newer request than `seq` has been issued
    #[inline]
    pub fn is_stale(&self, seq: u64) -> bool {
        seq < self.latest_seq()
    }

    /// Issue a new sequence number for a rebuild with the last-used parameters
    pub fn request_rebuild(&self) -> (u64, ModelParams) {
        let seq = self.next_seq();
        let params = self.last_params();
        debug!(seq, "rebuild requested");
        (seq, params)
    }

    /// Render mesh for `params`, merged over the last-used parameters
    pub async fn create_mesh(&self, params: Option<PartialParams>) -> Result<Job<RenderMesh>> {
        self.mesh_job(params)
    }

    /// Binary STL for `params`, merged over the last-used parameters
    pub async fn create_blob(&self, params: Option<PartialParams>) -> Result<Job<Vec<u8>>> {
        self.blob_job(params)
    }

    /// Blocking form of [`ModelService::create_mesh`], for worker threads
    pub fn mesh_job(&self, params: Option<PartialParams>) -> Result<Job<RenderMesh>> {
        let (seq, params) = self.begin(params);
        self.finish(seq, params, |solid| {
            let mesh = to_render_mesh(solid)?;
            info!(
                seq,
                triangles = mesh.triangle_count(),
                edges = mesh.edge_count(),
                "render mesh built"
            );
            Ok(mesh)
        })
    }

    /// Blocking form of [`ModelService::create_blob`], for worker threads
    pub fn blob_job(&self, params: Option<PartialParams>) -> Result<Job<Vec<u8>>> {
        let (seq, params) = self.begin(params);
        self.finish(seq, params, |solid| {
            let bytes = to_binary_stl(solid)?;
            info!(seq, bytes = bytes.len(), "stl exported");
            Ok(bytes)
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn begin(&self, partial: Option<PartialParams>) -> (u64, ModelParams) {
        let seq = self.next_seq();
        let params = match partial {
            Some(partial) => self.last_params().merged(&partial),
            None => self.last_params(),
        };
        debug!(
            seq,
            neck_length = params.neck_length,
            neck_thickness = params.neck_thickness,
            base_width = params.base_width,
            "build started"
        );
        (seq, params)
    }

    fn finish<T>(
        &self,
        seq: u64,
        params: ModelParams,
        export: impl FnOnce(&lightholder_geometry::Solid) -> Result<T>,
    ) -> Result<Job<T>> {
        let output = build_solid(&params, &self.kernel)
            .and_then(|solid| export(&solid))
            .map_err(|e| {
                warn!(seq, code = e.code(), error = %e, "build failed");
                e
            })?;

        // A slow build must not overwrite the parameters of a newer one
        let mut last = self.last_params.lock().unwrap_or_else(|e| e.into_inner());
        if seq >= last.0 {
            *last = (seq, params);
        } else {
            debug!(seq, newer = last.0, "stale build kept out of last-used params");
        }
        drop(last);
        Ok(Job { seq, params, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> ModelService {
        ModelService::new(Kernel::init().await.unwrap())
    }

    #[tokio::test]
    async fn test_sequence_increases() {
        let service = service().await;
        let (first, _) = service.request_rebuild();
        let (second, _) = service.request_rebuild();
        assert!(second > first);
        assert!(service.is_stale(first));
        assert!(!service.is_stale(second));
    }

    #[tokio::test]
    async fn test_rebuild_uses_last_params() {
        let service = service().await;
        let (_, params) = service.request_rebuild();
        assert_eq!(params, ModelParams::default());
    }

    #[tokio::test]
    async fn test_invalid_params_keep_last_used() {
        let service = service().await;
        let bad = PartialParams {
            neck_thickness: Some(25.0),
            ..Default::default()
        };
        let err = service.create_mesh(Some(bad)).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
        assert_eq!(service.last_params(), ModelParams::default());
        assert_eq!(service.latest_seq(), 1);
    }

    #[tokio::test]
    async fn test_out_of_order_completion_keeps_newest_params() {
        let service = service().await;
        let older = PartialParams {
            neck_length: Some(60.0),
            ..Default::default()
        };
        let newer = PartialParams {
            neck_length: Some(90.0),
            ..Default::default()
        };
        let (seq_a, params_a) = service.begin(Some(older));
        let (seq_b, params_b) = service.begin(Some(newer));
        assert!(seq_b > seq_a);

        service.finish(seq_b, params_b, |_| Ok(())).unwrap();
        service.finish(seq_a, params_a, |_| Ok(())).unwrap();
        assert_eq!(service.last_params(), params_b);

        let (_, rebuild) = service.request_rebuild();
        assert_eq!(rebuild.neck_length, 90.0);
    }

    #[tokio::test]
    async fn test_partial_params_merge() {
        let service = service().await;
        let partial = PartialParams {
            neck_length: Some(60.0),
            ..Default::default()
        };
        let job = service.create_mesh(Some(partial)).await.unwrap();
        assert_eq!(job.seq, 1);
        assert_eq!(job.params, ModelParams::new(60.0, 6.5, 45.0));
        assert_eq!(service.last_params(), job.params);

        // Omitted params fall back to the last-used ones
        let blob = service.create_blob(None).await.unwrap();
        assert_eq!(blob.seq, 2);
        assert_eq!(blob.params, job.params);
        assert!(job.output.triangle_count() > 0);
        assert!(service.is_stale(job.seq));
    }
}
