//! Callback-to-future adaptation for wallet SDK calls.
//!
//! Each SDK invocation gets its own [`SdkCallback`] backed by a oneshot
//! channel. The first resolution wins; later ones are ignored. If the caller
//! dropped the future in the meantime, the result is discarded quietly and
//! the wallet request itself is left alone.

use crate::error::{Error, Result};
use crate::sdk::SdkResult;
use futures::channel::oneshot;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Completion handle passed to the wallet SDK.
///
/// Cheap to clone; all clones share the same single-use slot.
#[derive(Clone)]
pub struct SdkCallback {
    slot: Arc<Mutex<Option<oneshot::Sender<SdkResult>>>>,
    operation: &'static str,
    request_id: Uuid,
}

impl SdkCallback {
    fn new(operation: &'static str, sender: oneshot::Sender<SdkResult>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(sender))),
            operation,
            request_id: Uuid::new_v4(),
        }
    }

    /// Name of the SDK operation this callback belongs to.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Whether a result has already been delivered (or discarded).
    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Deliver the SDK's result.
    ///
    /// Never fails: duplicates and results for abandoned callers are dropped.
    pub fn resolve(&self, result: SdkResult) {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            None => log::trace!(
                "{} [{}]: ignoring duplicate callback",
                self.operation,
                self.request_id
            ),
            Some(sender) => {
                if sender.send(result).is_err() {
                    log::debug!(
                        "{} [{}]: caller is gone, discarding result",
                        self.operation,
                        self.request_id
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for SdkCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkCallback")
            .field("operation", &self.operation)
            .field("request_id", &self.request_id)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Run a callback-based SDK operation and await its single result.
///
/// `op` is called exactly once with a fresh callback. The returned future
/// never times out; dropping it does not cancel the wallet request.
pub async fn invoke<F>(operation: &'static str, op: F) -> Result<SdkResult>
where
    F: FnOnce(SdkCallback),
{
    let (sender, receiver) = oneshot::channel();
    let callback = SdkCallback::new(operation, sender);
    log::debug!("{} [{}]: dispatched", operation, callback.request_id());

    op(callback);

    receiver
        .await
        .map_err(|_| Error::Sdk(format!("{operation} callback dropped without a result")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[tokio::test]
    async fn resolves_with_the_first_result() {
        let result = invoke("connect", |callback| {
            callback.resolve(SdkResult::item("first"));
            callback.resolve(SdkResult::item("second"));
        })
        .await
        .unwrap();

        assert_eq!(result, SdkResult::item("first"));
    }

    #[tokio::test]
    async fn late_callback_after_caller_dropped_is_discarded() {
        let mut stash = None;
        let future = invoke("personal_sign", |callback| stash = Some(callback));
        // Poll once so the operation is dispatched, then abandon it.
        let mut future = Box::pin(future);
        assert!(future.as_mut().now_or_never().is_none());
        drop(future);

        let callback = stash.unwrap();
        assert!(!callback.is_resolved());
        callback.resolve(SdkResult::item("0xsig"));
        assert!(callback.is_resolved());
        callback.resolve(SdkResult::item("0xsig"));
    }

    #[tokio::test]
    async fn dropped_callback_fails_the_future() {
        let err = invoke("connect", drop).await.unwrap_err();
        assert!(matches!(err, Error::Sdk(msg) if msg.contains("connect")));
    }

    #[tokio::test]
    async fn clones_share_one_resolution() {
        let mut stash = None;
        let future = invoke("eth_accounts", |callback| {
            stash = Some(callback.clone());
            callback.resolve(SdkResult::Items(vec!["0xabc".into()]));
        });
        let result = future.await.unwrap();
        assert_eq!(result, SdkResult::Items(vec!["0xabc".into()]));
        assert!(stash.unwrap().is_resolved());
    }
}
