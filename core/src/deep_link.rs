//! Deep link scheme resolution.
//!
//! The wallet returns to the host app through `<scheme>://mmsdk`. The scheme
//! is either configured explicitly or detected from the host's registered URL
//! handlers.

use crate::error::Result;
use crate::platform::Platform;
use crate::types::Configuration;
use std::sync::{PoisonError, RwLock};

/// Host component the wallet SDK uses for return links.
pub const RETURN_HOST: &str = "mmsdk";

/// Build the return URI for `scheme`.
pub fn return_uri(scheme: &str) -> String {
    format!("{scheme}://{RETURN_HOST}")
}

/// Resolves and caches the scheme used to return to the host app.
#[derive(Debug, Default)]
pub struct SchemeResolver {
    detected: RwLock<Option<String>>,
}

impl SchemeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the return scheme.
    ///
    /// Order: configured scheme, cached detection, platform introspection.
    /// `None` means the app cannot foreground itself; it is not an error.
    pub fn resolve(&self, config: &Configuration, platform: &dyn Platform) -> Option<String> {
        if let Some(scheme) = &config.deep_link_scheme {
            return Some(scheme.clone());
        }

        if let Some(scheme) = self.cached() {
            return Some(scheme);
        }

        match self.detect(platform) {
            Ok(Some(scheme)) => {
                *self.detected.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(scheme.clone());
                Some(scheme)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Error detecting deep link scheme: {e}");
                None
            }
        }
    }

    /// Previously detected scheme, if any.
    pub fn cached(&self) -> Option<String> {
        self.detected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the detected scheme.
    pub fn clear_cache(&self) {
        *self.detected.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn detect(&self, platform: &dyn Platform) -> Result<Option<String>> {
        let package = platform.package_name();
        let handlers = platform.link_handlers()?;
        let own_handlers = handlers
            .iter()
            .filter(|handler| handler.package == package && handler.browsable);

        for handler in own_handlers {
            let has_return_host = handler
                .hosts
                .iter()
                .any(|host| host == RETURN_HOST);
            if !has_return_host {
                continue;
            }

            for scheme in handler.schemes.iter().filter(|s| !s.is_empty()) {
                let uri = return_uri(scheme);
                let resolves_to_self = match platform.packages_handling(&uri) {
                    Ok(packages) => packages.iter().any(|p| *p == package),
                    Err(e) => {
                        log::warn!("Could not resolve {uri}: {e}");
                        false
                    }
                };

                if resolves_to_self {
                    log::debug!(
                        "Detected deep link scheme: {scheme} from {}",
                        handler.component.as_deref().unwrap_or("<unnamed handler>")
                    );
                    return Ok(Some(scheme.clone()));
                }

                log::warn!(
                    "Scheme {scheme} with {RETURN_HOST} host found but does not resolve to package {package}"
                );
            }
        }

        log::warn!(
            "Could not detect deep link scheme. Searched {} handlers for package {package}",
            handlers.len()
        );
        Ok(None)
    }
}
