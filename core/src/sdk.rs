//! Abstraction over the vendor wallet SDK.
//!
//! The bridge never talks to a wallet directly. The host hands it a
//! [`WalletSdk`] that knows how to build a [`WalletClient`], and every
//! round trip goes through the client's callback-based methods. SDKs that
//! are already awaitable implement the same trait by resolving the callback
//! from their own completion handler.

use crate::callback::SdkCallback;
use crate::codec::SignRequest;
use crate::error::Result;
use crate::platform::Platform;
use crate::types::ClientSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Thread-safety bound for collaborator traits.
///
/// On WASM targets nothing needs to be `Send` since JavaScript is
/// single-threaded. On native targets collaborators are shared across
/// threads and must be `Send + Sync`.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// Error payload reported by the wallet SDK.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(message.into()),
        }
    }
}

/// Raw outcome of a wallet SDK call, as delivered to its callback.
///
/// The SDK reports success in several shapes; which one is legal depends on
/// the operation and is decided by [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SdkResult {
    /// A single value (usually a string).
    Item(Value),
    /// A keyed map of values.
    ItemMap(Map<String, Value>),
    /// A list of strings (e.g. account addresses).
    Items(Vec<String>),
    /// The wallet refused or failed the request.
    Error(SdkError),
}

impl SdkResult {
    /// Convenience constructor for a single string value.
    pub fn item(value: impl Into<String>) -> Self {
        SdkResult::Item(Value::String(value.into()))
    }

    /// Convenience constructor for an error with a message.
    pub fn error(message: impl Into<String>) -> Self {
        SdkResult::Error(SdkError::new(message))
    }
}

/// A constructed wallet SDK client.
///
/// Callback methods must eventually invoke the callback at most once per
/// call; extra invocations are tolerated and ignored by the bridge.
pub trait WalletClient: MaybeSendSync {
    /// Start a connection with the wallet app.
    fn connect(&self, callback: SdkCallback);

    /// Forward a JSON-RPC request (e.g. `personal_sign`) to the wallet.
    fn send_request(&self, request: SignRequest, callback: SdkCallback);

    /// Connect (if needed) and sign `message` in one round trip.
    fn connect_and_sign(&self, message: String, callback: SdkCallback);

    /// Query the accounts exposed to this dapp.
    fn get_eth_accounts(&self, callback: SdkCallback);

    /// Query the wallet's current chain id.
    fn get_chain_id(&self, callback: SdkCallback);

    /// Live selected account, if any.
    fn selected_address(&self) -> Option<String>;

    /// Live chain id as reported by the wallet (hex or decimal string).
    fn chain_id(&self) -> Option<String>;

    /// Push a freshly queried account into the client's state.
    fn update_account(&self, address: &str);

    /// Push a freshly queried chain id into the client's state.
    fn update_chain_id(&self, chain_id: &str);
}

/// Factory for wallet clients.
pub trait WalletSdk: MaybeSendSync {
    /// Build a new client for `spec`.
    ///
    /// Called with the bridge's client lock held, at most once per
    /// configuration change.
    fn create_client(
        &self,
        platform: &dyn Platform,
        spec: &ClientSpec,
    ) -> Result<Arc<dyn WalletClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_deserialize_from_tagged_objects() {
        let item: SdkResult = serde_json::from_str(r#"{"type":"item","value":"0xsig"}"#).unwrap();
        assert_eq!(item, SdkResult::item("0xsig"));

        let items: SdkResult =
            serde_json::from_str(r#"{"type":"items","value":["0xa","0xb"]}"#).unwrap();
        assert_eq!(items, SdkResult::Items(vec!["0xa".into(), "0xb".into()]));

        let error: SdkResult =
            serde_json::from_str(r#"{"type":"error","value":{"code":4001,"message":"User rejected"}}"#)
                .unwrap();
        assert_eq!(
            error,
            SdkResult::Error(SdkError {
                code: Some(4001),
                message: Some("User rejected".into()),
            })
        );
    }
}
