//! Store initialization controller.
//!
//! At most one native initialization runs at a time. The caller that starts it
//! (the leader) publishes the outcome through a watch channel; concurrent
//! callers join that channel and observe the same outcome. Only the leader
//! raises a notification. If the leading call is dropped before it publishes,
//! a waiting joiner takes over and becomes the new leader.

use std::sync::{Arc, Mutex};

use purchasing_lib::{
    InitializeError, InitializeErrorCode, PlatformStore, ProductCatalog, StoreConfigProvider,
};
use tokio::sync::watch;

use crate::events::{EventHub, StoreEvent};
use crate::lifecycle::DisposeSignal;
use crate::metrics::StoreMetrics;

type InitOutcome = Result<Arc<ProductCatalog>, InitializeError>;

enum InitState {
    Uninitialized,
    Initializing(watch::Receiver<Option<InitOutcome>>),
    Initialized(Arc<ProductCatalog>),
}

enum Role {
    Done(Arc<ProductCatalog>),
    Join(watch::Receiver<Option<InitOutcome>>),
    Lead(watch::Sender<Option<InitOutcome>>),
}

/// Drives one-at-a-time initialization against the platform store.
pub struct InitializationController {
    state: Mutex<InitState>,
    provider: Arc<dyn StoreConfigProvider>,
    platform: Arc<dyn PlatformStore>,
    events: Arc<EventHub>,
    metrics: Arc<StoreMetrics>,
    dispose: Arc<DisposeSignal>,
}

impl InitializationController {
    pub fn new(
        provider: Arc<dyn StoreConfigProvider>,
        platform: Arc<dyn PlatformStore>,
        events: Arc<EventHub>,
        metrics: Arc<StoreMetrics>,
        dispose: Arc<DisposeSignal>,
    ) -> Self {
        Self {
            state: Mutex::new(InitState::Uninitialized),
            provider,
            platform,
            events,
            metrics,
            dispose,
        }
    }

    /// Initialize the store, or join an initialization already in flight.
    ///
    /// Returns the catalog immediately, without side effects, if the store is
    /// already initialized.
    pub async fn initialize(&self) -> Result<Arc<ProductCatalog>, InitializeError> {
        loop {
            if self.dispose.is_disposed() {
                return Err(InitializeError::disposed());
            }

            let role = {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                match &*state {
                    InitState::Initialized(catalog) => Role::Done(catalog.clone()),
                    InitState::Initializing(rx) => Role::Join(rx.clone()),
                    InitState::Uninitialized => {
                        let (tx, rx) = watch::channel(None);
                        *state = InitState::Initializing(rx);
                        Role::Lead(tx)
                    }
                }
            };

            match role {
                Role::Done(catalog) => return Ok(catalog),
                Role::Lead(tx) => return self.lead(tx).await,
                Role::Join(rx) => {
                    if let Some(outcome) = self.join(rx).await {
                        return outcome;
                    }
                    tracing::debug!("leading initialization abandoned, taking over");
                }
            }
        }
    }

    async fn lead(&self, tx: watch::Sender<Option<InitOutcome>>) -> InitOutcome {
        let mut guard = LeadGuard {
            state: &self.state,
            tx,
            armed: true,
        };
        self.metrics.record_initialize_attempt();
        tracing::info!(store = self.platform.store_id(), "initializing store");

        let outcome = match self.dispose.run_until_disposed(self.load_catalog()).await {
            Some(Ok(_)) if self.dispose.is_disposed() => Err(InitializeError::disposed()),
            Some(outcome) => outcome,
            None => Err(InitializeError::disposed()),
        };
        guard.armed = false;

        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            *state = match &outcome {
                Ok(catalog) => InitState::Initialized(catalog.clone()),
                Err(_) => InitState::Uninitialized,
            };
        }

        match &outcome {
            Ok(catalog) => {
                self.metrics.record_initialize_success();
                tracing::info!(products = catalog.len(), "store initialized");
                self.events.emit(&StoreEvent::Initialized);
            }
            Err(error) => {
                self.metrics.record_initialize_failure();
                tracing::warn!(code = %error.code, "store initialization failed");
                self.events.emit(&StoreEvent::InitializeFailed(error.clone()));
            }
        }

        guard.tx.send_replace(Some(outcome.clone()));
        outcome
    }

    /// Wait for the leader's outcome. `None` means the leader was dropped
    /// before publishing.
    async fn join(&self, rx: watch::Receiver<Option<InitOutcome>>) -> Option<InitOutcome> {
        tracing::debug!("joining initialization in flight");
        match self.dispose.run_until_disposed(published_outcome(rx)).await {
            Some(Some(outcome)) => Some(outcome),
            Some(None) if !self.dispose.is_disposed() => None,
            _ => Some(Err(InitializeError::disposed())),
        }
    }

    async fn load_catalog(&self) -> InitOutcome {
        let config = self.provider.get_store_config().await.map_err(|e| {
            InitializeError::with_cause(InitializeErrorCode::Unknown, Arc::from(e))
        })?;
        tracing::debug!(products = config.products.len(), "registering products");

        let products = self
            .platform
            .initialize(&config.products)
            .await
            .map_err(InitializeError::from_platform)?;

        let catalog = ProductCatalog::from_platform(&config.products, products);
        if catalog.is_empty() {
            return Err(InitializeError::new(
                InitializeErrorCode::NoProductsAvailable,
            ));
        }
        Ok(Arc::new(catalog))
    }

    pub fn is_initialized(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(|e| e.into_inner()),
            InitState::Initialized(_)
        )
    }

    pub fn is_initializing(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(|e| e.into_inner()),
            InitState::Initializing(_)
        )
    }

    /// The catalog, once initialized.
    pub fn catalog(&self) -> Option<Arc<ProductCatalog>> {
        match &*self.state.lock().unwrap_or_else(|e| e.into_inner()) {
            InitState::Initialized(catalog) => Some(catalog.clone()),
            _ => None,
        }
    }

    /// Forget the catalog. Used on disposal.
    pub fn reset(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = InitState::Uninitialized;
    }
}

async fn published_outcome(
    mut rx: watch::Receiver<Option<InitOutcome>>,
) -> Option<InitOutcome> {
    let published = rx.wait_for(Option::is_some).await.ok()?;
    published.clone()
}

/// Returns the controller to `Uninitialized` if the leading call is dropped
/// before it publishes an outcome. The state is reset before the sender is
/// dropped, so woken joiners find no stale in-flight attempt.
struct LeadGuard<'a> {
    state: &'a Mutex<InitState>,
    tx: watch::Sender<Option<InitOutcome>>,
    armed: bool,
}

impl Drop for LeadGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock().unwrap_or_else(|e| e.into_inner()) = InitState::Uninitialized;
        }
    }
}
