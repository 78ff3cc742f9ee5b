// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for the plant light holder
//!
//! Meant to live in a dedicated Web Worker: each call builds the model
//! synchronously inside the returned promise, so the page thread stays
//! responsive while the worker is busy.

use std::rc::Rc;

use futures_util::FutureExt;
use js_sys::{Promise, Uint8Array};
use lightholder_processing::{Kernel, ModelParams, ModelService, PartialParams};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::mesh_js::render_mesh_to_js;
use crate::utils::{build_error_to_js, now_ms, set_js_prop};

/// Main plant light holder API
#[wasm_bindgen]
pub struct ModelAPI {
    service: Rc<ModelService>,
}

#[wasm_bindgen]
impl ModelAPI {
    /// Create the API and bootstrap the geometry kernel
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ModelAPI, JsValue> {
        crate::utils::set_panic_hook();

        // Kernel bootstrap does no I/O, so its future is ready on first poll
        let kernel = Kernel::init()
            .now_or_never()
            .ok_or_else(|| JsValue::from_str("kernel bootstrap did not complete"))?
            .map_err(|e| build_error_to_js(&e))?;

        Ok(Self {
            service: Rc::new(ModelService::new(kernel)),
        })
    }

    /// Build the model and resolve with its render mesh
    ///
    /// Example:
    /// ```javascript
    /// const api = new ModelAPI();
    /// const { faces, edges } = await api.createMesh({ neckLength: 120 });
    /// ```
    #[wasm_bindgen(js_name = createMesh)]
    pub fn create_mesh(&self, params: JsValue) -> Promise {
        let service = Rc::clone(&self.service);
        let promise = Promise::new(&mut |resolve, reject| {
            let service = Rc::clone(&service);
            let params = params.clone();
            spawn_local(async move {
                let result = async {
                    let partial = parse_params(params)?;
                    let start = now_ms();
                    let job = service.create_mesh(partial).await.map_err(|e| build_error_to_js(&e))?;
                    web_sys::console::debug_1(
                        &format!(
                            "[lightholder] mesh #{}: {} triangles in {:.0} ms",
                            job.seq,
                            job.output.triangle_count(),
                            now_ms() - start
                        )
                        .into(),
                    );
                    let value = render_mesh_to_js(&job.output)?;
                    set_js_prop(&value, "seq", &JsValue::from_f64(job.seq as f64));
                    Ok::<JsValue, JsValue>(value)
                }
                .await;

                settle(&resolve, &reject, result);
            });
        });

        promise
    }

    /// Build the model and resolve with binary STL bytes
    ///
    /// Example:
    /// ```javascript
    /// const bytes = await api.createBlob();
    /// const blob = new Blob([bytes], { type: 'model/stl' });
    /// ```
    #[wasm_bindgen(js_name = createBlob)]
    pub fn create_blob(&self, params: JsValue) -> Promise {
        let service = Rc::clone(&self.service);
        let promise = Promise::new(&mut |resolve, reject| {
            let service = Rc::clone(&service);
            let params = params.clone();
            spawn_local(async move {
                let result = async {
                    let partial = parse_params(params)?;
                    let job = service.create_blob(partial).await.map_err(|e| build_error_to_js(&e))?;
                    web_sys::console::debug_1(
                        &format!("[lightholder] stl #{}: {} bytes", job.seq, job.output.len()).into(),
                    );
                    Ok::<JsValue, JsValue>(Uint8Array::from(&job.output[..]).into())
                }
                .await;

                settle(&resolve, &reject, result);
            });
        });

        promise
    }

    /// Default parameters
    #[wasm_bindgen(js_name = defaultParams)]
    pub fn default_params(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&ModelParams::default())?)
    }

    /// Parameters of the last successful build
    #[wasm_bindgen(js_name = lastParams)]
    pub fn last_params(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.service.last_params())?)
    }

    /// `{ neckLength: {min, max, default}, ... }`
    #[wasm_bindgen(js_name = paramRanges)]
    pub fn param_ranges(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&ModelParams::ranges())?)
    }

    /// New sequence number plus the parameters to rebuild with
    #[wasm_bindgen(js_name = requestRebuild)]
    pub fn request_rebuild(&self) -> Result<JsValue, JsValue> {
        let (seq, params) = self.service.request_rebuild();
        let result = js_sys::Object::new();
        set_js_prop(&result, "seq", &JsValue::from_f64(seq as f64));
        set_js_prop(&result, "params", &serde_wasm_bindgen::to_value(&params)?);
        Ok(result.into())
    }

    /// True when a newer request than `seq` was issued
    #[wasm_bindgen(js_name = isStale)]
    pub fn is_stale(&self, seq: f64) -> bool {
        self.service.is_stale(seq as u64)
    }

    #[wasm_bindgen(getter, js_name = latestSeq)]
    pub fn latest_seq(&self) -> f64 {
        self.service.latest_seq() as f64
    }

    /// Get version string
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// `undefined` and `null` mean "use the last parameters"
fn parse_params(params: JsValue) -> Result<Option<PartialParams>, JsValue> {
    if params.is_undefined() || params.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(params)
        .map(Some)
        .map_err(|e| js_sys::Error::new(&format!("invalid parameters: {e}")).into())
}

fn settle(resolve: &js_sys::Function, reject: &js_sys::Function, result: Result<JsValue, JsValue>) {
    let outcome = match result {
        Ok(value) => resolve.call1(&JsValue::NULL, &value),
        Err(error) => reject.call1(&JsValue::NULL, &error),
    };
    if let Err(e) = outcome {
        let _ = reject.call1(&JsValue::NULL, &e);
    }
}
