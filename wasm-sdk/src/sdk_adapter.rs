//! JavaScript wallet SDK adapter for WASM.
//!
//! This module bridges a JavaScript wallet SDK object (e.g. the MetaMask JS
//! SDK's provider wrapped by the host) to the core `WalletSdk`/`WalletClient`
//! traits. Client methods may take a trailing callback, return a Promise, or
//! return the result directly; all of these resolve the same single-use
//! `SdkCallback`.

use crate::error::describe_js_error;
use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use wallet_bridge_core::{
    ClientSpec, Platform, SdkCallback, SdkError, SdkResult, SignRequest, WalletClient, WalletSdk,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// JavaScript wallet SDK factory passed from TypeScript.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const sdk = new JsWalletSdkProvider((spec) => {
///     const client = new MetaMaskSDK({ dappMetadata: { name: spec.name, url: spec.url } });
///     return {
///         connect: (cb) => client.connect().then(
///             (accounts) => cb({ type: 'item', value: JSON.stringify(accounts) }),
///             (e) => cb({ type: 'error', value: { message: e.message, code: e.code } })),
///         sendRequest: (req, cb) => client.getProvider().request(req).then(
///             (sig) => cb({ type: 'item', value: sig }),
///             (e) => cb({ type: 'error', value: { message: e.message } })),
///         connectAndSign: (msg, cb) => client.connectAndSign({ msg }).then(
///             (sig) => cb({ type: 'item', value: sig })),
///         getEthAccounts: (cb) => ...,
///         getChainId: (cb) => ...,
///         get account() { return client.getProvider().getSelectedAddress(); },
///         get chainId() { return client.getProvider().getChainId(); },
///     };
/// });
/// ```
#[wasm_bindgen]
pub struct JsWalletSdkProvider {
    create_client_fn: Function,
}

#[wasm_bindgen]
impl JsWalletSdkProvider {
    /// Create a new JsWalletSdkProvider from a JavaScript factory.
    ///
    /// # Arguments
    /// * `create_client_fn` - Function: `(spec: ClientSpec) => WalletClient`
    #[wasm_bindgen(constructor)]
    pub fn new(create_client_fn: Function) -> Self {
        Self { create_client_fn }
    }
}

/// Client spec as seen by the JavaScript factory.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsClientSpec<'a> {
    name: &'a str,
    url: &'a str,
    infura_api_key: Option<&'a str>,
    readonly_rpc_map: Option<&'a BTreeMap<String, String>>,
    deep_link_scheme: Option<&'a str>,
}

impl<'a> From<&'a ClientSpec> for JsClientSpec<'a> {
    fn from(spec: &'a ClientSpec) -> Self {
        Self {
            name: &spec.metadata.name,
            url: &spec.metadata.url,
            infura_api_key: spec.options.infura_api_key.as_deref(),
            readonly_rpc_map: spec.options.readonly_rpc_map.as_ref(),
            deep_link_scheme: spec.deep_link_scheme.as_deref(),
        }
    }
}

/// Internal adapter that implements the core WalletSdk trait using the JS
/// factory.
pub struct JsWalletSdkAdapter {
    provider: JsWalletSdkProvider,
}

impl JsWalletSdkAdapter {
    /// Create a new adapter wrapping a JsWalletSdkProvider.
    pub fn new(provider: JsWalletSdkProvider) -> Self {
        Self { provider }
    }
}

impl WalletSdk for JsWalletSdkAdapter {
    fn create_client(
        &self,
        _platform: &dyn Platform,
        spec: &ClientSpec,
    ) -> wallet_bridge_core::Result<Arc<dyn WalletClient>> {
        let spec_js = crate::to_js_value(&JsClientSpec::from(spec)).map_err(|e| {
            wallet_bridge_core::Error::Other(format!(
                "Failed to serialize client spec: {}",
                describe_js_error(&e)
            ))
        })?;

        let client = self
            .provider
            .create_client_fn
            .call1(&JsValue::NULL, &spec_js)
            .map_err(|e| {
                wallet_bridge_core::Error::Other(format!(
                    "Failed to create wallet client: {}",
                    describe_js_error(&e)
                ))
            })?;

        if !client.is_object() {
            return Err(wallet_bridge_core::Error::Other(
                "Expected an object from create_client".into(),
            ));
        }

        Ok(Arc::new(JsWalletClient { inner: client }))
    }
}

/// A JavaScript wallet client object.
pub struct JsWalletClient {
    inner: JsValue,
}

impl JsWalletClient {
    fn method(&self, name: &str) -> Result<Function, JsValue> {
        Reflect::get(&self.inner, &JsValue::from_str(name))?
            .dyn_into::<Function>()
            .map_err(|_| JsValue::from_str(&format!("wallet client has no {name}() method")))
    }

    fn property(&self, name: &str) -> Option<String> {
        let value = Reflect::get(&self.inner, &JsValue::from_str(name)).ok()?;
        if value.is_null() || value.is_undefined() {
            return None;
        }
        value
            .as_string()
            .or_else(|| value.as_f64().map(|n| format!("{}", n as i64)))
    }

    fn set_property(&self, setter: &str, property: &str, value: &str) {
        let value = JsValue::from_str(value);
        let result = match self.method(setter) {
            Ok(f) => f.call1(&self.inner, &value).map(|_| ()),
            Err(_) => Reflect::set(&self.inner, &JsValue::from_str(property), &value).map(|_| ()),
        };
        if let Err(e) = result {
            log::warn!("Failed to update {property}: {}", describe_js_error(&e));
        }
    }

    /// Call `name(...args, callback)` and route its outcome to `callback`.
    ///
    /// A returned Promise is awaited as well and any other non-undefined return
    /// value is taken as the result; whichever arrives first wins.
    fn call_with_callback(&self, name: &str, args: &[JsValue], callback: SdkCallback) {
        let js_callback = {
            let callback = callback.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
                callback.resolve(result_from_js(value));
            })
            .into_js_value()
        };

        let outcome = self.method(name).and_then(|f| {
            let argv: Array = args.iter().collect();
            argv.push(&js_callback);
            f.apply(&self.inner, &argv)
        });

        match outcome {
            Err(e) => callback.resolve(SdkResult::error(format!(
                "{name} failed: {}",
                describe_js_error(&e)
            ))),
            Ok(returned) if returned.is_undefined() => {}
            Ok(returned) => match returned.dyn_into::<Promise>() {
                Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                    match JsFuture::from(promise).await {
                        Ok(value) if value.is_undefined() => {}
                        Ok(value) => callback.resolve(result_from_js(value)),
                        Err(e) => callback.resolve(error_from_js(&e)),
                    }
                }),
                Err(value) => callback.resolve(result_from_js(value)),
            },
        }
    }
}

impl WalletClient for JsWalletClient {
    fn connect(&self, callback: SdkCallback) {
        self.call_with_callback("connect", &[], callback);
    }

    fn send_request(&self, request: SignRequest, callback: SdkCallback) {
        match crate::to_js_value(&request) {
            Ok(request) => self.call_with_callback("sendRequest", &[request], callback),
            Err(e) => callback.resolve(SdkResult::error(format!(
                "Failed to serialize request: {}",
                describe_js_error(&e)
            ))),
        }
    }

    fn connect_and_sign(&self, message: String, callback: SdkCallback) {
        self.call_with_callback("connectAndSign", &[JsValue::from_str(&message)], callback);
    }

    fn get_eth_accounts(&self, callback: SdkCallback) {
        self.call_with_callback("getEthAccounts", &[], callback);
    }

    fn get_chain_id(&self, callback: SdkCallback) {
        self.call_with_callback("getChainId", &[], callback);
    }

    fn selected_address(&self) -> Option<String> {
        self.property("account")
            .or_else(|| self.property("selectedAddress"))
    }

    fn chain_id(&self) -> Option<String> {
        self.property("chainId")
    }

    fn update_account(&self, address: &str) {
        self.set_property("updateAccount", "account", address);
    }

    fn update_chain_id(&self, chain_id: &str) {
        self.set_property("updateChainId", "chainId", chain_id);
    }
}

/// Interpret a value handed to a client callback.
///
/// Tagged objects (`{type, value}`) are taken as-is, flat error objects are
/// read field by field, and anything else is classified by its JavaScript
/// shape.
fn result_from_js(value: JsValue) -> SdkResult {
    // Flat error objects: `{type: "error", message, code}`.
    let field = |name: &str| Reflect::get(&value, &JsValue::from_str(name)).ok();
    let tag = field("type").and_then(|t| t.as_string());
    let has_value = field("value").is_some_and(|v| !v.is_undefined());
    if tag.as_deref() == Some("error") && !has_value {
        return error_from_js(&value);
    }

    if let Ok(result) = serde_wasm_bindgen::from_value::<SdkResult>(value.clone()) {
        return result;
    }

    match serde_wasm_bindgen::from_value::<serde_json::Value>(value) {
        Ok(serde_json::Value::Object(map)) => SdkResult::ItemMap(map),
        Ok(serde_json::Value::Array(items)) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            match strings {
                Some(strings) => SdkResult::Items(strings),
                None => SdkResult::Item(serde_json::Value::Array(items)),
            }
        }
        Ok(other) => SdkResult::Item(other),
        Err(e) => SdkResult::error(format!("Unreadable wallet result: {e}")),
    }
}

fn error_from_js(value: &JsValue) -> SdkResult {
    let code = Reflect::get(value, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);

    SdkResult::Error(SdkError {
        code,
        message: Some(describe_js_error(value)),
    })
}
