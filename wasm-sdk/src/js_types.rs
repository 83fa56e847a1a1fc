//! WASM-friendly type wrappers.
//!
//! These types wrap the core session types with wasm_bindgen annotations
//! for seamless JavaScript interop.

use wasm_bindgen::prelude::*;

/// Session phase.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Connected,
    Signing,
}

impl From<wallet_bridge_core::SessionPhase> for SessionPhase {
    fn from(p: wallet_bridge_core::SessionPhase) -> Self {
        match p {
            wallet_bridge_core::SessionPhase::Disconnected => SessionPhase::Disconnected,
            wallet_bridge_core::SessionPhase::Connecting => SessionPhase::Connecting,
            wallet_bridge_core::SessionPhase::Connected => SessionPhase::Connected,
            wallet_bridge_core::SessionPhase::Signing => SessionPhase::Signing,
        }
    }
}

/// Result of a successful connect.
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone)]
pub struct ConnectResult {
    pub address: String,
    #[wasm_bindgen(js_name = "chainId")]
    pub chain_id: i64,
}

impl From<wallet_bridge_core::ConnectResult> for ConnectResult {
    fn from(r: wallet_bridge_core::ConnectResult) -> Self {
        ConnectResult {
            address: r.address,
            chain_id: r.chain_id,
        }
    }
}

/// Result of a combined connect-and-sign.
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone)]
pub struct ConnectSignResult {
    pub signature: String,
    pub address: String,
    #[wasm_bindgen(js_name = "chainId")]
    pub chain_id: i64,
}

impl From<wallet_bridge_core::ConnectSignResult> for ConnectSignResult {
    fn from(r: wallet_bridge_core::ConnectSignResult) -> Self {
        ConnectSignResult {
            signature: r.signature,
            address: r.address,
            chain_id: r.chain_id,
        }
    }
}

/// Snapshot of the connected account and chain.
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub address: Option<String>,
    #[wasm_bindgen(js_name = "chainId")]
    pub chain_id: Option<i64>,
}

impl From<wallet_bridge_core::SessionState> for SessionState {
    fn from(s: wallet_bridge_core::SessionState) -> Self {
        SessionState {
            address: s.address,
            chain_id: s.chain_id,
        }
    }
}
