//! Host platform hooks.
//!
//! Everything the bridge needs from the operating system goes through
//! [`Platform`]: URL-handler introspection for deep link detection, opening a
//! URL back into the host app, and scheduling work on the UI thread.

use crate::error::{Error, Result};
use crate::sdk::MaybeSendSync;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// A task to run on the UI-affine execution context.
///
/// On WASM targets tasks don't need to be `Send` since JavaScript is
/// single-threaded.
#[cfg(target_arch = "wasm32")]
pub type UiTask = Box<dyn FnOnce() + 'static>;

#[cfg(not(target_arch = "wasm32"))]
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// A registered URL handler (an Android intent filter or an iOS URL type).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkHandler {
    /// Package / bundle id owning the handler.
    pub package: String,
    /// Activity or scene name, for diagnostics only.
    pub component: Option<String>,
    pub schemes: Vec<String>,
    /// Hosts (authorities) the handler accepts.
    pub hosts: Vec<String>,
    /// Whether the handler accepts VIEW + BROWSABLE navigation.
    pub browsable: bool,
}

/// How a self-targeted navigation treats the existing task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationFlags {
    pub new_task: bool,
    pub clear_top: bool,
    pub single_top: bool,
}

impl NavigationFlags {
    /// Bring the existing task forward instead of spawning a new one.
    pub fn reuse_task() -> Self {
        Self {
            new_task: true,
            clear_top: true,
            single_top: true,
        }
    }
}

/// Platform resource handle supplied by the host.
pub trait Platform: MaybeSendSync {
    /// Package name / bundle id of the host app.
    fn package_name(&self) -> String;

    /// All URL handlers that accept VIEW navigation on this device.
    fn link_handlers(&self) -> Result<Vec<LinkHandler>>;

    /// Packages that would handle a navigation to `uri`.
    fn packages_handling(&self, uri: &str) -> Result<Vec<String>>;

    /// Open `uri`, restricted to the host app.
    fn open_url(&self, uri: &str, flags: NavigationFlags) -> Result<()>;

    /// Schedule `task` on the UI thread. Must not run it inline on a
    /// background thread.
    fn dispatch_to_ui(&self, task: UiTask) -> Result<()>;
}

/// Late-bound holder for the platform handle.
///
/// Hosts usually learn about their application context after the bridge
/// object exists, so the handle is attached separately and checked when the
/// first wallet client is built.
#[derive(Default)]
pub struct ContextHolder {
    platform: RwLock<Option<Arc<dyn Platform>>>,
}

impl ContextHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the platform handle.
    pub fn initialize(&self, platform: Arc<dyn Platform>) {
        let mut slot = self.platform.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(platform);
    }

    pub fn is_initialized(&self) -> bool {
        self.platform
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Get the platform handle, failing fast if the host never supplied one.
    pub fn get(&self) -> Result<Arc<dyn Platform>> {
        self.platform
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                Error::Configuration(
                    "platform context not initialized. Attach it before the first wallet operation"
                        .to_string(),
                )
            })
    }
}
