//! JavaScript platform adapter for WASM.
//!
//! Exposes the host's app identity and link routing to the core library.
//! Both introspection functions must be synchronous; URL opening falls back
//! to `window.location` when the host does not provide one.

use crate::error::describe_js_error;
use js_sys::{Function, Promise};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use wallet_bridge_core::{Error, LinkHandler, NavigationFlags, Platform, UiTask};
use wasm_bindgen::prelude::*;

/// JavaScript platform provider passed from TypeScript.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const platform = new JsPlatformProvider(
///     'com.example.app',
///     () => [{ package: 'com.example.app', schemes: ['myapp'], hosts: ['mmsdk'], browsable: true }],
///     (uri) => ['com.example.app'],
///     (uri, flags) => Linking.openURL(uri),
/// );
/// ```
#[wasm_bindgen]
pub struct JsPlatformProvider {
    package_name: String,
    link_handlers_fn: Function,
    packages_handling_fn: Function,
    open_url_fn: Option<Function>,
}

#[wasm_bindgen]
impl JsPlatformProvider {
    /// Create a new JsPlatformProvider from JavaScript callbacks.
    ///
    /// # Arguments
    /// * `package_name` - The host app's package / bundle id
    /// * `link_handlers_fn` - Function: `() => LinkHandler[]`
    /// * `packages_handling_fn` - Function: `(uri: string) => string[]`
    /// * `open_url_fn` - Optional function: `(uri: string, flags: NavigationFlags) => void`
    #[wasm_bindgen(constructor)]
    pub fn new(
        package_name: String,
        link_handlers_fn: Function,
        packages_handling_fn: Function,
        open_url_fn: Option<Function>,
    ) -> Self {
        Self {
            package_name,
            link_handlers_fn,
            packages_handling_fn,
            open_url_fn,
        }
    }
}

/// Internal adapter that implements the core Platform trait using JS
/// callbacks.
pub struct JsPlatformAdapter {
    provider: JsPlatformProvider,
}

impl JsPlatformAdapter {
    pub fn new(provider: JsPlatformProvider) -> Arc<Self> {
        Arc::new(Self { provider })
    }
}

fn read_sync<T: DeserializeOwned>(name: &str, value: JsValue) -> wallet_bridge_core::Result<T> {
    if value.is_instance_of::<Promise>() {
        return Err(Error::Configuration(format!("{name} must return synchronously")));
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| Error::Format(format!("Invalid {name} result: {e}")))
}

impl Platform for JsPlatformAdapter {
    fn package_name(&self) -> String {
        self.provider.package_name.clone()
    }

    fn link_handlers(&self) -> wallet_bridge_core::Result<Vec<LinkHandler>> {
        let value = self
            .provider
            .link_handlers_fn
            .call0(&JsValue::NULL)
            .map_err(|e| Error::Other(format!("linkHandlers failed: {}", describe_js_error(&e))))?;
        read_sync("linkHandlers", value)
    }

    fn packages_handling(&self, uri: &str) -> wallet_bridge_core::Result<Vec<String>> {
        let value = self
            .provider
            .packages_handling_fn
            .call1(&JsValue::NULL, &JsValue::from_str(uri))
            .map_err(|e| {
                Error::Other(format!("packagesHandling failed: {}", describe_js_error(&e)))
            })?;
        read_sync("packagesHandling", value)
    }

    fn open_url(&self, uri: &str, flags: NavigationFlags) -> wallet_bridge_core::Result<()> {
        if let Some(open) = &self.provider.open_url_fn {
            let flags = crate::to_js_value(&flags)
                .map_err(|e| Error::Format(describe_js_error(&e)))?;
            open.call2(&JsValue::NULL, &JsValue::from_str(uri), &flags)
                .map_err(|e| Error::Other(format!("openUrl failed: {}", describe_js_error(&e))))?;
            return Ok(());
        }

        let window = web_sys::window()
            .ok_or_else(|| Error::Configuration("no window to open URL in".into()))?;
        window
            .location()
            .assign(uri)
            .map_err(|e| Error::Other(format!("Failed to open {uri}: {}", describe_js_error(&e))))
    }

    fn dispatch_to_ui(&self, task: UiTask) -> wallet_bridge_core::Result<()> {
        // The JS event loop is the UI thread.
        wasm_bindgen_futures::spawn_local(async move { task() });
        Ok(())
    }
}
