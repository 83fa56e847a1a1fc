//! Wire formats shared with the wallet SDK.
//!
//! Chain ids arrive as strings (`"0x1"`, `"137"`), signing payloads leave as
//! either plain UTF-8 or `0x`-prefixed hex, and the combined connect+sign
//! message is a small JSON envelope.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// JSON-RPC method used for message signing.
pub const PERSONAL_SIGN: &str = "personal_sign";

/// Parse a chain id reported by the wallet.
///
/// Accepts `0x`/`0X`-prefixed hexadecimal or plain decimal.
pub fn parse_chain_id(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Format("empty chain id".to_string()));
    }

    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) => i64::from_str_radix(digits, 16),
        None => trimmed.parse::<i64>(),
    };

    parsed.map_err(|e| Error::Format(format!("Invalid chainId format: {raw} ({e})")))
}

/// Render a chain id the way wallets report it (`0x`-prefixed lowercase hex).
pub fn format_chain_id(chain_id: i64) -> String {
    format!("0x{chain_id:x}")
}

/// `"0x"` + lowercase hex of the message's UTF-8 bytes.
pub fn encode_message_hex(message: &str) -> String {
    format!("0x{}", hex::encode(message.as_bytes()))
}

/// How a message is placed into a `personal_sign` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageEncoding {
    /// The raw message string; the wallet SDK hex-encodes it itself.
    #[default]
    Utf8,
    /// Pre-encoded `0x`-prefixed hex.
    Hex,
}

impl MessageEncoding {
    pub fn encode(self, message: &str) -> String {
        match self {
            MessageEncoding::Utf8 => message.to_string(),
            MessageEncoding::Hex => encode_message_hex(message),
        }
    }
}

/// A JSON-RPC request forwarded to the wallet through `sendRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    pub method: String,
    pub params: Vec<String>,
}

impl SignRequest {
    /// Build a `personal_sign` request.
    ///
    /// Parameters are always ordered `[address, message]`.
    pub fn personal_sign(address: &str, message: &str, encoding: MessageEncoding) -> Self {
        Self {
            method: PERSONAL_SIGN.to_string(),
            params: vec![address.to_string(), encoding.encode(message)],
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Message signed during the combined connect+sign flow.
///
/// Carries exactly `nonce` and `exp`; the wallet binds the signing account
/// and chain itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignEnvelope {
    pub nonce: String,
    pub exp: i64,
}

impl SignEnvelope {
    pub fn new(nonce: impl Into<String>, exp: i64) -> Self {
        Self {
            nonce: nonce.into(),
            exp,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_decimal_chain_ids_agree() {
        for (hex, decimal) in [
            ("0x1", "1"),
            ("0X89", "137"),
            ("0xa4b1", "42161"),
            ("0xaa36a7", "11155111"),
            ("0x0", "0"),
        ] {
            assert_eq!(
                parse_chain_id(hex).unwrap(),
                parse_chain_id(decimal).unwrap(),
                "{hex} vs {decimal}"
            );
        }
    }

    #[test]
    fn chain_ids_wider_than_32_bits_parse() {
        assert_eq!(parse_chain_id("0x1fffffffffffff").unwrap(), 9_007_199_254_740_991);
    }

    #[test]
    fn malformed_chain_ids_are_format_errors() {
        for raw in ["", "   ", "0x", "0xzz", "mainnet", "1.5"] {
            assert!(
                matches!(parse_chain_id(raw), Err(Error::Format(_))),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn format_chain_id_round_trips_through_parse() {
        assert_eq!(format_chain_id(137), "0x89");
        assert_eq!(parse_chain_id(&format_chain_id(137)).unwrap(), 137);
    }

    #[test]
    fn hex_encoding_is_prefixed_lowercase_utf8() {
        assert_eq!(encode_message_hex("Hi"), "0x4869");
        assert_eq!(encode_message_hex(""), "0x");
        assert_eq!(encode_message_hex("é"), "0xc3a9");
    }

    #[test]
    fn personal_sign_puts_address_first() {
        let request = SignRequest::personal_sign("0xabc", "hello", MessageEncoding::Utf8);
        assert_eq!(request.method, "personal_sign");
        assert_eq!(request.params, vec!["0xabc", "hello"]);

        let request = SignRequest::personal_sign("0xabc", "hello", MessageEncoding::Hex);
        assert_eq!(request.params, vec!["0xabc", "0x68656c6c6f"]);
        assert_eq!(
            request.to_json().unwrap(),
            r#"{"method":"personal_sign","params":["0xabc","0x68656c6c6f"]}"#
        );
    }

    #[test]
    fn envelope_has_only_nonce_and_exp() {
        let json = SignEnvelope::new("n1", 1_700_000_000).to_json().unwrap();
        assert_eq!(json, r#"{"nonce":"n1","exp":1700000000}"#);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 2);
    }
}
