//! Collapse the wallet SDK's result shapes into one value per operation.

use crate::error::{Error, Result};
use crate::sdk::{SdkError, SdkResult};
use serde_json::Value;

/// SDK operations whose results the bridge interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    SignMessage,
    ConnectSign,
    /// Multi-address query used to refresh accounts after connect+sign.
    Accounts,
    ChainId,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Connect => "connect",
            Operation::SignMessage => "signMessage",
            Operation::ConnectSign => "connectSign",
            Operation::Accounts => "eth_accounts",
            Operation::ChainId => "eth_chainId",
        }
    }

    fn failure(self, error: SdkError) -> Error {
        let message = match (error.message.filter(|m| !m.is_empty()), error.code) {
            (Some(message), _) => message,
            (None, Some(code)) => format!("wallet {} failed (code {code})", self.name()),
            (None, None) => format!("wallet {} failed", self.name()),
        };

        match self {
            Operation::Connect => Error::Connection(message),
            _ => Error::Sdk(message),
        }
    }

    fn unexpected_shape(self, shape: &str) -> Error {
        Error::Format(format!(
            "unexpected result shape ({shape}) from wallet {}",
            self.name()
        ))
    }
}

/// Interpret a raw SDK result for `operation`.
///
/// Only the single-value shape is accepted, except for [`Operation::Accounts`]
/// where a list (or a single value holding one) yields its first address.
pub fn normalize(result: SdkResult, operation: Operation) -> Result<Value> {
    match result {
        SdkResult::Error(error) => Err(operation.failure(error)),
        SdkResult::ItemMap(_) => Err(operation.unexpected_shape("map")),
        SdkResult::Items(items) => match operation {
            Operation::Accounts => first_account(items).map(Value::String),
            _ => Err(operation.unexpected_shape("list")),
        },
        SdkResult::Item(value) => match operation {
            Operation::Accounts => account_from_value(value).map(Value::String),
            _ => Ok(value),
        },
    }
}

/// [`normalize`], then require a string.
pub fn normalize_string(result: SdkResult, operation: Operation) -> Result<String> {
    expect_string(normalize(result, operation)?, operation)
}

/// Narrow a normalized value to a string.
pub fn expect_string(value: Value, operation: Operation) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::Format(format!(
            "invalid {} response format: {other}",
            operation.name()
        ))),
    }
}

/// Pull the current account out of a single-value `connect`/`eth_accounts`
/// payload. Accepts a plain address, a JSON array, or a string holding a
/// JSON array.
pub(crate) fn account_from_value(value: Value) -> Result<String> {
    match value {
        Value::Array(values) => {
            let items = values
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s),
                    other => Err(Error::Format(format!("invalid account entry: {other}"))),
                })
                .collect::<Result<Vec<_>>>()?;
            first_account(items)
        }
        Value::String(s) if s.trim_start().starts_with('[') => {
            let items: Vec<String> = serde_json::from_str(&s)?;
            first_account(items)
        }
        Value::String(s) if !s.is_empty() => Ok(s),
        other => Err(Error::Format(format!("invalid account payload: {other}"))),
    }
}

fn first_account(items: Vec<String>) -> Result<String> {
    items
        .into_iter()
        .next()
        .filter(|address| !address.is_empty())
        .ok_or_else(|| Error::Format("wallet returned no accounts".to_string()))
}
