//! The public session API.
//!
//! A [`Session`] composes the client lifecycle, the callback adapter, the
//! result normalizer and the foreground return into the operations a host
//! app calls: `configure`, `connect`, `sign_message`, `connect_sign` and the
//! state reads.

use crate::callback::invoke;
use crate::codec::{MessageEncoding, SignEnvelope, SignRequest, parse_chain_id};
use crate::deep_link::SchemeResolver;
use crate::error::{Error, Result};
use crate::foreground::ForegroundReturn;
use crate::lifecycle::{ClientHandle, ClientManager};
use crate::normalize::{Operation, account_from_value, normalize, normalize_string};
use crate::platform::{ContextHolder, Platform};
use crate::sdk::{WalletClient, WalletSdk};
use crate::types::{
    Configuration, ConnectResult, ConnectSignResult, SessionOptions, SessionPhase, SessionState,
};
use std::sync::{Arc, Mutex, PoisonError};

/// Encoding used by [`Session::sign_message`] for the `personal_sign` payload.
pub const SIGN_MESSAGE_ENCODING: MessageEncoding = MessageEncoding::Utf8;

/// Connection/signing session with an external wallet app.
///
/// # Example
///
/// ```rust,ignore
/// use wallet_bridge_core::Session;
///
/// let session = Session::new(my_wallet_sdk);
/// session.attach_platform(my_platform);
/// session.configure(Some("https://mydapp.example".into()), None);
///
/// let connected = session.connect().await?;
/// let signature = session.sign_message("hello").await?;
/// ```
pub struct Session {
    manager: ClientManager,
    context: Arc<ContextHolder>,
    foreground: ForegroundReturn,
    phase: Mutex<SessionPhase>,
}

impl Session {
    /// Create a session with default options.
    pub fn new(sdk: Arc<dyn WalletSdk>) -> Self {
        Self::with_options(sdk, SessionOptions::default())
    }

    pub fn with_options(sdk: Arc<dyn WalletSdk>, options: SessionOptions) -> Self {
        let context = Arc::new(ContextHolder::new());
        let resolver = Arc::new(SchemeResolver::new());

        Self {
            manager: ClientManager::new(
                sdk,
                Arc::clone(&context),
                Arc::clone(&resolver),
                options,
            ),
            context,
            foreground: ForegroundReturn::new(resolver),
            phase: Mutex::new(SessionPhase::Disconnected),
        }
    }

    /// Attach the platform handle. Required before the first wallet operation.
    pub fn attach_platform(&self, platform: Arc<dyn Platform>) {
        self.context.initialize(platform);
    }

    /// Set the dapp URL and deep link scheme.
    ///
    /// Absent values fall back to defaults. A change drops the current wallet
    /// client; the next operation builds a new one.
    pub fn configure(&self, dapp_url: Option<String>, deep_link_scheme: Option<String>) {
        if self.manager.configure(dapp_url, deep_link_scheme) {
            self.set_phase(SessionPhase::Disconnected);
        }
    }

    pub fn configuration(&self) -> Configuration {
        self.manager.configuration()
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Connect to the wallet and return the selected account and chain.
    pub async fn connect(&self) -> Result<ConnectResult> {
        let handle = self.manager.get_client()?;
        let client = Arc::clone(handle.client());
        let guard = PhaseGuard::enter(self, &handle, SessionPhase::Connecting);

        match connect_with(client.as_ref()).await {
            Ok(result) => {
                guard.finish(SessionPhase::Connected);
                log::debug!(
                    "connect: {} on chain {} (client #{})",
                    result.address,
                    result.chain_id,
                    handle.generation()
                );
                Ok(result)
            }
            Err(e) => {
                guard.finish(SessionPhase::Disconnected);
                Err(e)
            }
        }
    }

    /// Sign `message` with the connected account via `personal_sign`.
    ///
    /// Fails with [`Error::State`] without contacting the wallet when no
    /// account is connected.
    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let handle = self.manager.get_client()?;
        let client = Arc::clone(handle.client());

        let address = live_address(client.as_ref()).ok_or_else(|| {
            Error::State("no connected account. Call connect() first".to_string())
        })?;

        let guard = PhaseGuard::enter(self, &handle, SessionPhase::Signing);
        let request = SignRequest::personal_sign(&address, message, SIGN_MESSAGE_ENCODING);
        let raw = invoke(Operation::SignMessage.name(), |callback| {
            client.send_request(request, callback)
        })
        .await?;
        let signature = normalize_string(raw, Operation::SignMessage)?;

        guard.finish(SessionPhase::Connected);
        self.return_to_foreground(&handle);
        Ok(signature)
    }

    /// Connect (if needed) and sign a `{nonce, exp}` envelope in one wallet
    /// round trip, then report the account and chain that signed it.
    ///
    /// If the signature succeeds but the follow-up account refresh fails, the
    /// session keeps whatever connection the wallet established.
    pub async fn connect_sign(&self, nonce: &str, exp: i64) -> Result<ConnectSignResult> {
        let handle = self.manager.get_client()?;
        let client = Arc::clone(handle.client());
        let message = SignEnvelope::new(nonce, exp).to_json()?;
        log::debug!("connectSign: constructed message {message}");

        let during = match live_address(client.as_ref()) {
            Some(_) => SessionPhase::Signing,
            None => SessionPhase::Connecting,
        };
        let guard = PhaseGuard::enter(self, &handle, during);

        let raw = invoke(Operation::ConnectSign.name(), |callback| {
            client.connect_and_sign(message, callback)
        })
        .await?;
        let signature = normalize_string(raw, Operation::ConnectSign)?;
        self.return_to_foreground(&handle);

        let raw = invoke(Operation::Accounts.name(), |callback| {
            client.get_eth_accounts(callback)
        })
        .await?;
        let address = normalize_string(raw, Operation::Accounts)?;
        client.update_account(&address);

        let raw = invoke(Operation::ChainId.name(), |callback| {
            client.get_chain_id(callback)
        })
        .await?;
        let chain_id_raw = normalize_string(raw, Operation::ChainId)?;
        client.update_chain_id(&chain_id_raw);
        let chain_id = parse_chain_id(&chain_id_raw)?;

        guard.finish(SessionPhase::Connected);
        log::debug!("connectSign: signed by {address} on chain {chain_id}");

        Ok(ConnectSignResult {
            signature,
            address,
            chain_id,
        })
    }

    /// Currently selected account, read from the live wallet client.
    pub fn get_address(&self) -> Option<String> {
        let handle = self.manager.current()?;
        live_address(handle.client().as_ref())
    }

    /// Current chain id, read from the live wallet client.
    ///
    /// An unparsable chain id reads as absent.
    pub fn get_chain_id(&self) -> Option<i64> {
        let handle = self.manager.current()?;
        let raw = handle.client().chain_id().filter(|c| !c.is_empty())?;
        match parse_chain_id(&raw) {
            Ok(chain_id) => Some(chain_id),
            Err(e) => {
                log::warn!("getChainId: {e}");
                None
            }
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            address: self.get_address(),
            chain_id: self.get_chain_id(),
        }
    }

    fn return_to_foreground(&self, handle: &ClientHandle) {
        match self.context.get() {
            Ok(platform) => self
                .foreground
                .return_to_foreground(platform, handle.config().clone()),
            Err(e) => log::error!("Cannot return to foreground: {e}"),
        }
    }
}

async fn connect_with(client: &dyn WalletClient) -> Result<ConnectResult> {
    let raw = invoke(Operation::Connect.name(), |callback| client.connect(callback)).await?;
    let value = normalize(raw, Operation::Connect)?;

    let address = match live_address(client) {
        Some(address) => address,
        None => {
            let address = account_from_value(value).map_err(|_| {
                Error::Connection("wallet returned no address after connection".to_string())
            })?;
            client.update_account(&address);
            address
        }
    };

    let chain_id = client
        .chain_id()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            Error::Connection("wallet returned no chainId after connection".to_string())
        })?;

    Ok(ConnectResult {
        address,
        chain_id: parse_chain_id(&chain_id)?,
    })
}

fn live_address(client: &dyn WalletClient) -> Option<String> {
    client.selected_address().filter(|a| !a.is_empty())
}

/// Holds the session in a transitional phase for the duration of an
/// operation.
///
/// If the operation future is dropped or fails without an explicit
/// [`PhaseGuard::finish`], the phase is settled from the live client. Once a
/// reconfiguration has replaced the client the operation started on, the
/// guard leaves the phase alone.
struct PhaseGuard<'a> {
    session: &'a Session,
    client: Arc<dyn WalletClient>,
    generation: u64,
    settled: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(session: &'a Session, handle: &ClientHandle, during: SessionPhase) -> Self {
        session.set_phase(during);
        Self {
            session,
            client: Arc::clone(handle.client()),
            generation: handle.generation(),
            settled: false,
        }
    }

    fn finish(mut self, next: SessionPhase) {
        self.set(next);
        self.settled = true;
    }

    fn set(&self, next: SessionPhase) {
        // Checked under the phase lock; `configure` writes the phase only
        // after the manager has dropped the old client.
        let mut phase = self
            .session
            .phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.session.manager.is_current(self.generation) {
            *phase = next;
        } else {
            log::debug!(
                "client #{} was replaced, leaving phase at {}",
                self.generation,
                *phase
            );
        }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let next = match live_address(self.client.as_ref()) {
            Some(_) => SessionPhase::Connected,
            None => SessionPhase::Disconnected,
        };
        self.set(next);
    }
}
