// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lightholder_processing::BuildError;
use wasm_bindgen::prelude::*;

/// Set panic hook for better error messages in the browser
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Safely set a property on a JavaScript object.
/// Returns true if successful, false otherwise.
#[inline]
pub(crate) fn set_js_prop(obj: &JsValue, key: &str, value: &JsValue) -> bool {
    js_sys::Reflect::set(obj, &JsValue::from_str(key), value).unwrap_or(false)
}

/// A JS `Error` carrying the build error's message and a `code` property
pub(crate) fn build_error_to_js(error: &BuildError) -> JsValue {
    let js_error = js_sys::Error::new(&error.to_string());
    set_js_prop(&js_error, "code", &JsValue::from_str(error.code()));
    js_error.into()
}

/// Milliseconds since the epoch; works in windows and workers alike
#[inline]
pub(crate) fn now_ms() -> f64 {
    js_sys::Date::now()
}
