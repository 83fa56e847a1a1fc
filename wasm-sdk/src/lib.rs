//! Wallet Bridge - WASM Bindings
//!
//! This crate provides WebAssembly bindings for the wallet bridge core.
//! It adapts JavaScript wallet SDK clients and host platform callbacks to
//! the core traits and exposes a promise-based session API.
//!
//! **Note:** This crate is WASM-only and will not compile for native targets.
//!
//! # Usage from JavaScript/TypeScript
//!
//! ```javascript
//! import init, { WalletSession, JsWalletSdkProvider, JsPlatformProvider } from '@wallet-bridge/sdk';
//!
//! // Initialize WASM
//! await init();
//!
//! const sdk = new JsWalletSdkProvider((spec) => makeClient(spec));
//! const platform = new JsPlatformProvider(
//!     'com.example.app',
//!     () => linkHandlers,
//!     (uri) => packagesHandling(uri),
//! );
//!
//! const session = new WalletSession(sdk, platform, { dappName: 'Example' });
//! session.configure('https://example.com', 'myapp');
//!
//! const { address, chainId } = await session.connect();
//! const signature = await session.signMessage('hello');
//! ```

// This crate only compiles for WASM targets
#![cfg(target_arch = "wasm32")]

mod error;
mod js_types;
mod platform_adapter;
mod sdk_adapter;
mod session;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use error::*;
pub use js_types::*;
pub use platform_adapter::*;
pub use sdk_adapter::*;
pub use session::*;

/// Initialize the WASM module.
///
/// This sets up logging and panic hooks for better debugging.
#[wasm_bindgen(start)]
pub fn initialize() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("Wallet bridge initialized");
}

/// Serialize a value to JsValue as a plain object (not a Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
