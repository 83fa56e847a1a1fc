use crate::{
    ConnectResult, ConnectSignResult, JsPlatformAdapter, JsPlatformProvider, JsWalletSdkAdapter,
    JsWalletSdkProvider, SessionPhase, SessionState, map_err_to_js, to_js_error,
};
use std::sync::Arc;
use wallet_bridge_core::{SessionOptions, codec};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

/// Wallet session.
#[wasm_bindgen]
pub struct WalletSession {
    inner: wallet_bridge_core::Session,
}

#[wasm_bindgen]
impl WalletSession {
    /// Create a new session.
    ///
    /// # Arguments
    /// * `sdk` - Wallet SDK provider building the vendor client
    /// * `platform` - Platform provider for link routing and URL opening
    /// * `options` - Optional `{ dappName, sdk: { infuraApiKey, readonlyRpcMap } }`
    #[wasm_bindgen(constructor)]
    pub fn new(
        sdk: JsWalletSdkProvider,
        platform: JsPlatformProvider,
        options: JsValue,
    ) -> Result<WalletSession, JsValue> {
        let options: SessionOptions = if options.is_undefined() || options.is_null() {
            SessionOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid session options: {}", e)))?
        };

        let inner = wallet_bridge_core::Session::with_options(
            Arc::new(JsWalletSdkAdapter::new(sdk)),
            options,
        );
        inner.attach_platform(JsPlatformAdapter::new(platform));

        Ok(Self { inner })
    }

    /// Set the dapp URL and deep link scheme. Absent values use defaults.
    pub fn configure(&self, dapp_url: Option<String>, deep_link_scheme: Option<String>) {
        self.inner.configure(dapp_url, deep_link_scheme);
    }

    /// Current configuration as a plain object.
    pub fn configuration(&self) -> Result<JsValue, JsValue> {
        crate::to_js_value(&self.inner.configuration())
    }

    pub async fn connect(&self) -> Result<ConnectResult, JsValue> {
        self.inner
            .connect()
            .await
            .map(Into::into)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "signMessage")]
    pub async fn sign_message(&self, message: String) -> Result<String, JsValue> {
        self.inner
            .sign_message(&message)
            .await
            .map_err(to_js_error)
    }

    /// Connect and sign a `{nonce, exp}` envelope in one wallet round trip.
    ///
    /// # Arguments
    /// * `nonce` - Server-issued nonce
    /// * `exp` - Expiry timestamp (unix seconds)
    #[wasm_bindgen(js_name = "connectSign")]
    pub async fn connect_sign(
        &self,
        nonce: String,
        exp: i64,
    ) -> Result<ConnectSignResult, JsValue> {
        self.inner
            .connect_sign(&nonce, exp)
            .await
            .map(Into::into)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "getAddress")]
    pub fn get_address(&self) -> Option<String> {
        self.inner.get_address()
    }

    #[wasm_bindgen(js_name = "getChainId")]
    pub fn get_chain_id(&self) -> Option<i64> {
        self.inner.get_chain_id()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state().into()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.phase().into()
    }
}

/// Parse a chain id given as decimal (`"137"`) or hex (`"0x89"`).
#[wasm_bindgen(js_name = "parseChainId")]
pub fn parse_chain_id(raw: &str) -> Result<i64, JsValue> {
    map_err_to_js!(codec::parse_chain_id(raw))
}

/// Format a chain id as `0x`-prefixed lowercase hex.
#[wasm_bindgen(js_name = "formatChainId")]
pub fn format_chain_id(chain_id: i64) -> String {
    codec::format_chain_id(chain_id)
}
