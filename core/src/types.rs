//! Shared types for the Wallet Bridge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dapp URL used when the host never configured one.
pub const DEFAULT_DAPP_URL: &str = "https://novastera.com";

/// Dapp name reported to the wallet.
pub const DEFAULT_DAPP_NAME: &str = "Nitro MetaMask Connector";

/// Bridge configuration.
///
/// Two configurations are equal when both the dapp URL and the deep link
/// scheme match; any difference invalidates the current wallet client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// A valid HTTP/HTTPS URL identifying the dapp to the wallet.
    pub dapp_url: String,
    /// Scheme used to return to the host app. `None` means auto-detect.
    pub deep_link_scheme: Option<String>,
}

impl Configuration {
    /// Build a configuration, applying defaults for absent values.
    ///
    /// An empty scheme is treated as absent.
    pub fn new(dapp_url: Option<String>, deep_link_scheme: Option<String>) -> Self {
        Self {
            dapp_url: dapp_url.unwrap_or_else(|| DEFAULT_DAPP_URL.to_string()),
            deep_link_scheme: deep_link_scheme.filter(|scheme| !scheme.is_empty()),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Dapp identity handed to the wallet SDK when a client is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappMetadata {
    pub name: String,
    pub url: String,
}

/// Pass-through options for the wallet SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdkOptions {
    pub infura_api_key: Option<String>,
    /// Chain id (hex string) to read-only RPC URL.
    pub readonly_rpc_map: Option<BTreeMap<String, String>>,
}

/// Options fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    pub dapp_name: String,
    pub sdk: SdkOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dapp_name: DEFAULT_DAPP_NAME.to_string(),
            sdk: SdkOptions::default(),
        }
    }
}

/// Everything the wallet SDK needs to build a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSpec {
    pub metadata: DappMetadata,
    pub options: SdkOptions,
    pub deep_link_scheme: Option<String>,
}

/// Position of a session in its connect/sign state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Connected,
    Signing,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Disconnected => write!(f, "disconnected"),
            SessionPhase::Connecting => write!(f, "connecting"),
            SessionPhase::Connected => write!(f, "connected"),
            SessionPhase::Signing => write!(f, "signing"),
        }
    }
}

/// Live projection of the wallet client's account state.
///
/// Re-read from the client on every query, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub address: Option<String>,
    pub chain_id: Option<i64>,
}

/// Result of a successful `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResult {
    pub address: String,
    pub chain_id: i64,
}

/// Result of a successful combined connect+sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectSignResult {
    pub signature: String,
    pub address: String,
    pub chain_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let config = Configuration::new(None, Some(String::new()));
        assert_eq!(config.dapp_url, DEFAULT_DAPP_URL);
        assert_eq!(config.deep_link_scheme, None);
    }

    #[test]
    fn configuration_deserializes_from_partial_json() {
        let config: Configuration =
            serde_json::from_str(r#"{"deepLinkScheme":"myapp"}"#).unwrap();
        assert_eq!(config.dapp_url, DEFAULT_DAPP_URL);
        assert_eq!(config.deep_link_scheme.as_deref(), Some("myapp"));
    }
}
