//! Error types for the Wallet Bridge.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bridging to the external wallet SDK.
///
/// None of these are retried by the bridge; retry policy belongs to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The platform resource handle was not supplied before the first client
    /// construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The wallet rejected or failed the connection. Carries the wallet's
    /// message verbatim.
    #[error("{0}")]
    Connection(String),

    /// The wallet SDK reported a failure for a request. Carries the wallet's
    /// message verbatim.
    #[error("{0}")]
    Sdk(String),

    /// Malformed chain id, unexpected result shape or bad payload.
    #[error("Format error: {0}")]
    Format(String),

    /// Operation invoked in the wrong session state.
    #[error("State error: {0}")]
    State(String),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(format!("{:#}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_messages_are_surfaced_verbatim() {
        assert_eq!(
            Error::Connection("User rejected".into()).to_string(),
            "User rejected"
        );
        assert_eq!(Error::Sdk("Not installed".into()).to_string(), "Not installed");
    }

    #[test]
    fn serde_errors_become_format_errors() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(Error::from(err), Error::Format(_)));
    }
}
