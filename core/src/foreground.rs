//! Bring the host app back after a wallet round trip.
//!
//! Signing suspends the host app into the wallet. Once a signature is in
//! hand the bridge navigates to `<scheme>://mmsdk` so the host returns to
//! the foreground. This is best effort: failures are logged, never returned.

use crate::deep_link::{SchemeResolver, return_uri};
use crate::platform::{NavigationFlags, Platform, UiTask};
use crate::types::Configuration;
use std::sync::Arc;

pub struct ForegroundReturn {
    resolver: Arc<SchemeResolver>,
}

impl ForegroundReturn {
    pub fn new(resolver: Arc<SchemeResolver>) -> Self {
        Self { resolver }
    }

    /// Schedule the return navigation on the UI thread and return at once.
    pub fn return_to_foreground(&self, platform: Arc<dyn Platform>, config: Configuration) {
        let resolver = Arc::clone(&self.resolver);
        let target = Arc::clone(&platform);

        let task: UiTask = Box::new(move || {
            let Some(scheme) = resolver.resolve(&config, target.as_ref()) else {
                log::warn!(
                    "Could not determine deep link scheme. Configure one via configure(dapp_url, deep_link_scheme) or register a <scheme>://mmsdk handler"
                );
                return;
            };

            let uri = return_uri(&scheme);
            match target.open_url(&uri, NavigationFlags::reuse_task()) {
                Ok(()) => log::debug!("Brought app to foreground using deep link: {uri}"),
                Err(e) => log::error!("Failed to bring app to foreground: {e}"),
            }
        });

        if let Err(e) = platform.dispatch_to_ui(task) {
            log::error!("Error scheduling foreground return: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::platform::LinkHandler;
    use std::sync::Mutex;

    #[derive(Default)]
    struct QueuedPlatform {
        queue: Mutex<Vec<UiTask>>,
        opened: Mutex<Vec<(String, NavigationFlags)>>,
        refuse_dispatch: bool,
        refuse_open: bool,
    }

    impl QueuedPlatform {
        fn drain(&self) {
            let tasks: Vec<UiTask> = self.queue.lock().unwrap().drain(..).collect();
            for task in tasks {
                task();
            }
        }
    }

    impl Platform for QueuedPlatform {
        fn package_name(&self) -> String {
            "com.example.app".into()
        }

        fn link_handlers(&self) -> Result<Vec<LinkHandler>> {
            Ok(Vec::new())
        }

        fn packages_handling(&self, _uri: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn open_url(&self, uri: &str, flags: NavigationFlags) -> Result<()> {
            if self.refuse_open {
                return Err(Error::Other("activity not found".into()));
            }
            self.opened.lock().unwrap().push((uri.to_string(), flags));
            Ok(())
        }

        fn dispatch_to_ui(&self, task: UiTask) -> Result<()> {
            if self.refuse_dispatch {
                return Err(Error::Other("main looper gone".into()));
            }
            self.queue.lock().unwrap().push(task);
            Ok(())
        }
    }

    fn configured() -> Configuration {
        Configuration::new(None, Some("myapp".into()))
    }

    #[test]
    fn navigation_runs_on_the_ui_queue() {
        let platform = Arc::new(QueuedPlatform::default());
        let foreground = ForegroundReturn::new(Arc::new(SchemeResolver::new()));

        foreground.return_to_foreground(platform.clone(), configured());
        assert!(platform.opened.lock().unwrap().is_empty());

        platform.drain();
        let opened = platform.opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].0, "myapp://mmsdk");
        assert_eq!(opened[0].1, NavigationFlags::reuse_task());
    }

    #[test]
    fn missing_scheme_skips_navigation() {
        let platform = Arc::new(QueuedPlatform::default());
        let foreground = ForegroundReturn::new(Arc::new(SchemeResolver::new()));

        foreground.return_to_foreground(platform.clone(), Configuration::default());
        platform.drain();
        assert!(platform.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn failures_are_swallowed() {
        let foreground = ForegroundReturn::new(Arc::new(SchemeResolver::new()));

        let refuses_dispatch = Arc::new(QueuedPlatform {
            refuse_dispatch: true,
            ..Default::default()
        });
        foreground.return_to_foreground(refuses_dispatch, configured());

        let refuses_open = Arc::new(QueuedPlatform {
            refuse_open: true,
            ..Default::default()
        });
        foreground.return_to_foreground(refuses_open.clone(), configured());
        refuses_open.drain();
        assert!(refuses_open.opened.lock().unwrap().is_empty());
    }
}
