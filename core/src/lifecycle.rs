//! Wallet client lifecycle.
//!
//! The manager owns the configuration and the wallet client built from it.
//! Both live behind one mutex, so a configuration change and a client
//! construction can never interleave.

use crate::deep_link::SchemeResolver;
use crate::error::Result;
use crate::platform::ContextHolder;
use crate::sdk::{WalletClient, WalletSdk};
use crate::types::{ClientSpec, Configuration, DappMetadata, SessionOptions};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A constructed wallet client bound to the configuration it was built from.
pub(crate) struct ClientHandle {
    client: Arc<dyn WalletClient>,
    config: Configuration,
    generation: u64,
}

impl ClientHandle {
    pub(crate) fn client(&self) -> &Arc<dyn WalletClient> {
        &self.client
    }

    pub(crate) fn config(&self) -> &Configuration {
        &self.config
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

struct ManagerState {
    config: Configuration,
    handle: Option<Arc<ClientHandle>>,
    built: u64,
}

/// Owns the configuration and (re)creates the wallet client lazily.
pub(crate) struct ClientManager {
    sdk: Arc<dyn WalletSdk>,
    context: Arc<ContextHolder>,
    resolver: Arc<SchemeResolver>,
    options: SessionOptions,
    state: Mutex<ManagerState>,
}

impl ClientManager {
    pub(crate) fn new(
        sdk: Arc<dyn WalletSdk>,
        context: Arc<ContextHolder>,
        resolver: Arc<SchemeResolver>,
        options: SessionOptions,
    ) -> Self {
        Self {
            sdk,
            context,
            resolver,
            options,
            state: Mutex::new(ManagerState {
                config: Configuration::default(),
                handle: None,
                built: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the configuration.
    ///
    /// Returns `true` if it changed, in which case the current client is
    /// dropped and rebuilt by the next operation.
    pub(crate) fn configure(
        &self,
        dapp_url: Option<String>,
        deep_link_scheme: Option<String>,
    ) -> bool {
        let mut state = self.lock();
        let next = Configuration::new(dapp_url, deep_link_scheme);

        if next == state.config {
            return false;
        }

        if next.deep_link_scheme != state.config.deep_link_scheme {
            self.resolver.clear_cache();
        }

        match &next.deep_link_scheme {
            Some(scheme) => log::debug!(
                "configure: dapp URL set to {}, deep link scheme set to {scheme}",
                next.dapp_url
            ),
            None => log::debug!(
                "configure: dapp URL set to {}. Deep link scheme will be auto-detected",
                next.dapp_url
            ),
        }

        state.config = next;
        state.handle = None;
        true
    }

    pub(crate) fn configuration(&self) -> Configuration {
        self.lock().config.clone()
    }

    /// Get the client for the current configuration, building it if needed.
    pub(crate) fn get_client(&self) -> Result<Arc<ClientHandle>> {
        let mut state = self.lock();

        if let Some(handle) = &state.handle {
            if handle.config == state.config {
                return Ok(Arc::clone(handle));
            }
        }

        let platform = self.context.get()?;
        let spec = ClientSpec {
            metadata: DappMetadata {
                name: self.options.dapp_name.clone(),
                url: state.config.dapp_url.clone(),
            },
            options: self.options.sdk.clone(),
            deep_link_scheme: state.config.deep_link_scheme.clone(),
        };

        let client = self.sdk.create_client(platform.as_ref(), &spec)?;
        state.built += 1;
        let handle = Arc::new(ClientHandle {
            client,
            config: state.config.clone(),
            generation: state.built,
        });
        state.handle = Some(Arc::clone(&handle));

        log::debug!(
            "Wallet SDK client #{} initialized with dapp URL {}",
            handle.generation,
            handle.config.dapp_url
        );
        Ok(handle)
    }

    /// The current client, if one exists and still matches the configuration.
    /// Never builds.
    pub(crate) fn current(&self) -> Option<Arc<ClientHandle>> {
        let state = self.lock();
        state
            .handle
            .as_ref()
            .filter(|handle| handle.config == state.config)
            .cloned()
    }

    /// Whether the client built as `generation` is still the live one.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current()
            .is_some_and(|handle| handle.generation == generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::SdkCallback;
    use crate::codec::SignRequest;
    use crate::error::Error;
    use crate::platform::{LinkHandler, NavigationFlags, Platform, UiTask};

    struct IdleClient;

    impl WalletClient for IdleClient {
        fn connect(&self, _callback: SdkCallback) {}
        fn send_request(&self, _request: SignRequest, _callback: SdkCallback) {}
        fn connect_and_sign(&self, _message: String, _callback: SdkCallback) {}
        fn get_eth_accounts(&self, _callback: SdkCallback) {}
        fn get_chain_id(&self, _callback: SdkCallback) {}
        fn selected_address(&self) -> Option<String> {
            None
        }
        fn chain_id(&self) -> Option<String> {
            None
        }
        fn update_account(&self, _address: &str) {}
        fn update_chain_id(&self, _chain_id: &str) {}
    }

    #[derive(Default)]
    struct RecordingSdk {
        specs: Mutex<Vec<ClientSpec>>,
    }

    impl WalletSdk for RecordingSdk {
        fn create_client(
            &self,
            _platform: &dyn Platform,
            spec: &ClientSpec,
        ) -> Result<Arc<dyn WalletClient>> {
            self.specs.lock().unwrap().push(spec.clone());
            Ok(Arc::new(IdleClient))
        }
    }

    struct StubPlatform;

    impl Platform for StubPlatform {
        fn package_name(&self) -> String {
            "com.example.app".into()
        }
        fn link_handlers(&self) -> Result<Vec<LinkHandler>> {
            Ok(Vec::new())
        }
        fn packages_handling(&self, _uri: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn open_url(&self, _uri: &str, _flags: NavigationFlags) -> Result<()> {
            Ok(())
        }
        fn dispatch_to_ui(&self, task: UiTask) -> Result<()> {
            task();
            Ok(())
        }
    }

    fn manager(sdk: Arc<RecordingSdk>) -> (ClientManager, Arc<SchemeResolver>) {
        let context = Arc::new(ContextHolder::new());
        context.initialize(Arc::new(StubPlatform));
        let resolver = Arc::new(SchemeResolver::new());
        let manager = ClientManager::new(
            sdk,
            context,
            Arc::clone(&resolver),
            SessionOptions::default(),
        );
        (manager, resolver)
    }

    #[test]
    fn client_is_built_lazily_and_reused() {
        let sdk = Arc::new(RecordingSdk::default());
        let (manager, _) = manager(Arc::clone(&sdk));
        assert!(manager.current().is_none());
        assert!(sdk.specs.lock().unwrap().is_empty());

        let first = manager.get_client().unwrap();
        let second = manager.get_client().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(sdk.specs.lock().unwrap().len(), 1);
        assert_eq!(
            sdk.specs.lock().unwrap()[0].metadata.url,
            crate::types::DEFAULT_DAPP_URL
        );
    }

    #[test]
    fn unchanged_configuration_keeps_the_client() {
        let sdk = Arc::new(RecordingSdk::default());
        let (manager, _) = manager(Arc::clone(&sdk));

        assert!(manager.configure(Some("https://a.example".into()), None));
        let first = manager.get_client().unwrap();
        assert!(!manager.configure(Some("https://a.example".into()), None));
        let second = manager.get_client().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.generation(), 1);
    }

    #[test]
    fn changed_configuration_rebuilds_on_next_use() {
        let sdk = Arc::new(RecordingSdk::default());
        let (manager, _) = manager(Arc::clone(&sdk));

        manager.configure(Some("https://a.example".into()), None);
        let first = manager.get_client().unwrap();
        manager.configure(Some("https://b.example".into()), None);

        assert!(manager.current().is_none());
        assert!(!manager.is_current(first.generation()));
        assert_eq!(sdk.specs.lock().unwrap().len(), 1);

        let second = manager.get_client().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.config().dapp_url, "https://b.example");
        assert_eq!(second.generation(), 2);
        assert!(manager.is_current(2));
        assert_eq!(sdk.specs.lock().unwrap()[1].metadata.url, "https://b.example");
    }

    #[test]
    fn scheme_change_clears_detected_scheme() {
        let sdk = Arc::new(RecordingSdk::default());
        let (manager, resolver) = manager(sdk);
        let config = Configuration::default();
        resolver.resolve(&config, &StubPlatform);

        manager.configure(None, Some("myapp".into()));
        assert_eq!(resolver.cached(), None);
        assert_eq!(manager.configuration().deep_link_scheme.as_deref(), Some("myapp"));
    }

    #[test]
    fn missing_platform_fails_construction() {
        let manager = ClientManager::new(
            Arc::new(RecordingSdk::default()),
            Arc::new(ContextHolder::new()),
            Arc::new(SchemeResolver::new()),
            SessionOptions::default(),
        );
        assert!(matches!(manager.get_client(), Err(Error::Configuration(_))));
    }
}
