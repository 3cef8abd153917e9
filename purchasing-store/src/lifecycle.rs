//! Disposal signalling.

use std::future::Future;

use tokio::sync::watch;

/// One-shot, idempotent disposal flag that pending operations can race against.
#[derive(Debug)]
pub struct DisposeSignal {
    disposed: watch::Sender<bool>,
}

impl DisposeSignal {
    pub fn new() -> Self {
        Self {
            disposed: watch::Sender::new(false),
        }
    }

    /// Raise the signal. Returns true only for the call that raised it.
    pub fn dispose(&self) -> bool {
        !self.disposed.send_replace(true)
    }

    pub fn is_disposed(&self) -> bool {
        *self.disposed.borrow()
    }

    /// Resolves once the signal has been raised.
    pub async fn disposed(&self) {
        let mut rx = self.disposed.subscribe();
        // The sender is owned by self, so the channel outlives this wait.
        let _ = rx.wait_for(|disposed| *disposed).await;
    }

    /// Drive `fut` to completion unless disposal happens first.
    ///
    /// Disposal is checked before the future on every poll, so an operation
    /// that finishes concurrently with disposal still resolves as disposed.
    pub async fn run_until_disposed<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.disposed() => None,
            output = fut => Some(output),
        }
    }
}

impl Default for DisposeSignal {
    fn default() -> Self {
        Self::new()
    }
}
