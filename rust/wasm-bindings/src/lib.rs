// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plant Light Holder WebAssembly Bindings
//!
//! JavaScript/TypeScript API built with wasm-bindgen, intended to run in a
//! Web Worker.

use wasm_bindgen::prelude::*;

mod api;
mod mesh_js;
mod utils;

pub use api::ModelAPI;
pub use utils::set_panic_hook as init_panic_hook;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the version of the plant light holder model
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
