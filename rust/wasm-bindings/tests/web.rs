// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![cfg(target_arch = "wasm32")]

use js_sys::{Float32Array, Reflect, Uint8Array};
use lightholder_wasm::{version, ModelAPI};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

fn prop(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_version() {
    assert_eq!(version(), env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen_test]
fn test_default_params() {
    let api = ModelAPI::new().unwrap();
    let params = api.default_params().unwrap();
    assert_eq!(prop(&params, "neckLength").as_f64(), Some(170.0));
    assert_eq!(prop(&params, "neckThickness").as_f64(), Some(6.5));
    assert_eq!(prop(&params, "baseWidth").as_f64(), Some(45.0));

    let ranges = api.param_ranges().unwrap();
    assert_eq!(prop(&prop(&ranges, "neckLength"), "max").as_f64(), Some(300.0));
}

#[wasm_bindgen_test]
fn test_rebuild_sequence() {
    let api = ModelAPI::new().unwrap();
    let first = prop(&api.request_rebuild().unwrap(), "seq").as_f64().unwrap();
    let second = prop(&api.request_rebuild().unwrap(), "seq").as_f64().unwrap();
    assert!(second > first);
    assert!(api.is_stale(first));
    assert!(!api.is_stale(second));
}

#[wasm_bindgen_test]
async fn test_create_mesh() {
    let api = ModelAPI::new().unwrap();
    let mesh = JsFuture::from(api.create_mesh(JsValue::UNDEFINED)).await.unwrap();
    let vertices: Float32Array = prop(&prop(&mesh, "faces"), "vertices").dyn_into().unwrap();
    assert!(vertices.length() > 0);
    assert!(prop(&prop(&mesh, "edges"), "edgeGroups").is_object());
}

#[wasm_bindgen_test]
async fn test_create_blob() {
    let api = ModelAPI::new().unwrap();
    let bytes: Uint8Array = JsFuture::from(api.create_blob(JsValue::NULL))
        .await
        .unwrap()
        .dyn_into()
        .unwrap();
    assert!(bytes.length() > 84);
}

#[wasm_bindgen_test]
async fn test_invalid_params_reject() {
    let api = ModelAPI::new().unwrap();
    let params = js_sys::Object::new();
    Reflect::set(&params, &"neckThickness".into(), &25.0.into()).unwrap();
    let err = JsFuture::from(api.create_mesh(params.into())).await.unwrap_err();
    assert_eq!(prop(&err, "code").as_string().as_deref(), Some("INVALID_PARAMETER"));
}
