//! Error conversion utilities for WASM.

use wasm_bindgen::prelude::*;

/// Convert a Result to a JsValue error.
pub fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&format!("{}", err))
}

/// Best-effort description of a thrown JavaScript value.
///
/// Prefers `error.message`, then the value itself if it is a string.
pub fn describe_js_error(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }

    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Macro to convert Rust errors to JavaScript values.
#[macro_export]
macro_rules! map_err_to_js {
    ($expr:expr) => {
        $expr.map_err(|e| JsValue::from_str(&format!("{:#}", e)))
    };
}
