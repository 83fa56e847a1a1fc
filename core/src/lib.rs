//! Wallet Bridge - Core Library
//!
//! Platform-agnostic connection/session bridge between a host app and an
//! external wallet app reached through a vendor wallet SDK.
//!
//! The vendor SDK and the operating system are abstracted through traits
//! ([`WalletSdk`], [`WalletClient`], [`Platform`]) that can be implemented for
//! any host (Android, iOS, React Native via WASM, tests).
//!
//! # Example
//!
//! ```rust,ignore
//! use wallet_bridge_core::Session;
//!
//! // Create a session with your wallet SDK binding
//! let session = Session::new(my_wallet_sdk);
//! session.attach_platform(my_platform);
//!
//! // Connect, then sign
//! let connected = session.connect().await?;
//! let signature = session.sign_message("hello").await?;
//! ```

pub mod callback;
pub mod codec;
pub mod deep_link;
pub mod error;
pub mod foreground;
mod lifecycle;
pub mod normalize;
pub mod platform;
pub mod sdk;
pub mod session;
pub mod types;

pub use callback::SdkCallback;
pub use codec::{MessageEncoding, SignEnvelope, SignRequest, parse_chain_id};
pub use deep_link::SchemeResolver;
pub use error::{Error, Result};
pub use platform::{ContextHolder, LinkHandler, NavigationFlags, Platform, UiTask};
pub use sdk::{MaybeSendSync, SdkError, SdkResult, WalletClient, WalletSdk};
pub use session::Session;
pub use types::{
    ClientSpec, Configuration, ConnectResult, ConnectSignResult, DappMetadata, SdkOptions,
    SessionOptions, SessionPhase, SessionState,
};
