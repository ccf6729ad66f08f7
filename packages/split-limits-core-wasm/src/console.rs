#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// This allows us to access console.log from JS
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    // Use `js_namespace` to bind `console.log(..)` instead of just `log(..)`
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

#[cfg(target_arch = "wasm32")]
pub fn warn(s: &str) {
    web_sys::console::warn_1(&JsValue::from_str(s));
}

// Imported JS functions panic off-wasm, so native builds (and `cargo test`) go to stderr
#[cfg(not(target_arch = "wasm32"))]
pub fn log(s: &str) {
    eprintln!("[split] {}", s);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(s: &str) {
    eprintln!("[split] WARN {}", s);
}

// Note: The console_log and console_warn macros are defined in lib.rs to avoid duplication
