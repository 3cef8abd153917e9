//! The store service facade.

use std::sync::Arc;

use purchasing_lib::{
    NativePurchase, PlatformStore, ProductCatalog, ProductId, PurchaseResult, ReceiptValidator,
    Result, StoreConfigProvider, StoreError, StoreServiceConfig,
};

use crate::events::{EventHub, StoreEvent, SubscriptionId};
use crate::initializer::InitializationController;
use crate::lifecycle::DisposeSignal;
use crate::metrics::{MetricsSnapshot, StoreMetrics};
use crate::orchestrator::{OrchestratorState, PurchaseOrchestrator};

/// Entry point for store initialization and purchases.
///
/// The service is explicitly constructed and owned. Share it with
/// `Arc<StoreService>`. Dropping the last owner disposes it.
///
/// # Example
///
/// ```rust,ignore
/// let store = StoreService::new(config, platform, provider).with_validator(validator);
/// store.subscribe(|event| println!("{:?}", event.kind()));
///
/// store.initialize().await?;
/// let result = store.purchase("coin100").await?;
/// ```
pub struct StoreService {
    name: String,
    initializer: Arc<InitializationController>,
    orchestrator: PurchaseOrchestrator,
    events: Arc<EventHub>,
    metrics: Arc<StoreMetrics>,
    dispose: Arc<DisposeSignal>,
}

impl StoreService {
    pub fn new(
        config: StoreServiceConfig,
        platform: Arc<dyn PlatformStore>,
        provider: Arc<dyn StoreConfigProvider>,
    ) -> Self {
        let events = Arc::new(EventHub::new());
        let metrics = Arc::new(StoreMetrics::new());
        let dispose = Arc::new(DisposeSignal::new());
        let initializer = Arc::new(InitializationController::new(
            provider,
            platform.clone(),
            events.clone(),
            metrics.clone(),
            dispose.clone(),
        ));
        let orchestrator = PurchaseOrchestrator::new(
            &config,
            initializer.clone(),
            platform,
            events.clone(),
            metrics.clone(),
            dispose.clone(),
        );

        Self {
            name: config.service_name(),
            initializer,
            orchestrator,
            events,
            metrics,
            dispose,
        }
    }

    /// Validate purchase receipts with `validator`.
    pub fn with_validator(mut self, validator: Arc<dyn ReceiptValidator>) -> Self {
        self.orchestrator.set_validator(validator);
        self
    }

    /// Initialize the store.
    ///
    /// Idempotent: returns immediately once initialized. Concurrent callers
    /// share one in-flight initialization.
    #[tracing::instrument(name = "initialize", skip(self), fields(service = %self.name))]
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_not_disposed()?;
        self.initializer.initialize().await?;
        Ok(())
    }

    /// Purchase a product, initializing the store first if needed.
    pub async fn purchase(&self, product_id: &str) -> Result<PurchaseResult> {
        self.orchestrator.purchase(product_id).await
    }

    /// Process a purchase the platform re-delivered without a request.
    pub async fn process_restored_purchase(
        &self,
        product_id: &str,
        native: NativePurchase,
    ) -> Result<PurchaseResult> {
        self.orchestrator
            .process_restored_purchase(product_id, native)
            .await
    }

    pub fn is_initialized(&self) -> bool {
        !self.is_disposed() && self.initializer.is_initialized()
    }

    /// Returns true while a purchase is pending.
    pub fn is_busy(&self) -> bool {
        !self.is_disposed() && self.orchestrator.is_busy()
    }

    pub fn state(&self) -> OrchestratorState {
        if self.is_disposed() {
            return OrchestratorState::Idle;
        }
        self.orchestrator.state()
    }

    pub fn pending_product(&self) -> Option<ProductId> {
        self.orchestrator.pending_product()
    }

    /// The product catalog, once initialized.
    pub fn products(&self) -> Option<Arc<ProductCatalog>> {
        self.initializer.catalog()
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_disposed(&self) -> bool {
        self.dispose.is_disposed()
    }

    /// Dispose the service.
    ///
    /// Pending initialization and purchase calls resolve with `StoreDisposed`;
    /// later calls fail with [`StoreError::ObjectDisposed`]. Idempotent.
    pub fn dispose(&self) {
        if !self.dispose.dispose() {
            return;
        }
        tracing::info!(service = %self.name, "store disposed");
        self.orchestrator.release_pending();
        self.initializer.reset();
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(StoreError::ObjectDisposed(self.name.clone()));
        }
        Ok(())
    }
}

impl Drop for StoreService {
    fn drop(&mut self) {
        self.dispose();
    }
}
