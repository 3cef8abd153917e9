//! Purchase orchestration.
//!
//! The orchestrator admits one purchase at a time. The pending-purchase marker
//! is claimed with a synchronous check-and-set, so a rejected caller never
//! suspends and the marker is never held by a lock across an await.
//!
//! A purchase runs these stages in order, each failure mapped onto
//! [`PurchaseErrorCode`]:
//!
//! 1. claim the marker and notify `PurchaseInitiated`
//! 2. ensure the store is initialized
//! 3. resolve the product in the catalog
//! 4. issue the native purchase
//! 5. validate the receipt
//!
//! The marker is released before `PurchaseCompleted`/`PurchaseFailed` is raised.

use std::sync::{Arc, Mutex};

use purchasing_lib::{
    InitializeErrorCode, NativePurchase, PlatformStore, ProductId, PurchaseError,
    PurchaseErrorCode, PurchaseResult, ReceiptValidator, StoreError, StoreServiceConfig,
    StoreTransaction,
};
use serde::{Deserialize, Serialize};

use crate::events::{EventHub, StoreEvent};
use crate::initializer::InitializationController;
use crate::lifecycle::DisposeSignal;
use crate::metrics::StoreMetrics;

/// Observable state of a store service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrchestratorState {
    Idle,
    Initializing,
    PurchasePending,
}

/// Enforces single-flight purchases and drives each one to a terminal outcome.
pub struct PurchaseOrchestrator {
    name: String,
    require_validation: bool,
    initializer: Arc<InitializationController>,
    platform: Arc<dyn PlatformStore>,
    validator: Option<Arc<dyn ReceiptValidator>>,
    events: Arc<EventHub>,
    metrics: Arc<StoreMetrics>,
    dispose: Arc<DisposeSignal>,
    pending: Mutex<Option<ProductId>>,
}

impl PurchaseOrchestrator {
    pub fn new(
        config: &StoreServiceConfig,
        initializer: Arc<InitializationController>,
        platform: Arc<dyn PlatformStore>,
        events: Arc<EventHub>,
        metrics: Arc<StoreMetrics>,
        dispose: Arc<DisposeSignal>,
    ) -> Self {
        Self {
            name: config.service_name(),
            require_validation: config.require_receipt_validation,
            initializer,
            platform,
            validator: None,
            events,
            metrics,
            dispose,
            pending: Mutex::new(None),
        }
    }

    pub fn set_validator(&mut self, validator: Arc<dyn ReceiptValidator>) {
        self.validator = Some(validator);
    }

    /// Purchase `product_id`.
    ///
    /// Fails without suspending, and without raising any notification, if the
    /// id is empty, the service is disposed, or another purchase is pending.
    #[tracing::instrument(name = "purchase", skip(self), fields(service = %self.name))]
    pub async fn purchase(&self, product_id: &str) -> Result<PurchaseResult, StoreError> {
        let product_id = ProductId::new(product_id);
        if self.dispose.is_disposed() {
            return Err(StoreError::ObjectDisposed(self.name.clone()));
        }
        if product_id.is_empty() {
            return Err(self.reject(product_id, PurchaseErrorCode::InvalidArgument));
        }

        let marker = match self.claim(&product_id) {
            Some(marker) => marker,
            None => {
                return Err(self.reject(product_id, PurchaseErrorCode::ExistingPurchasePending))
            }
        };

        self.metrics.record_purchase_initiated();
        tracing::info!("purchase initiated");
        self.events.emit(&StoreEvent::PurchaseInitiated {
            product_id: product_id.clone(),
            restored: false,
        });

        let outcome = self.run_purchase(product_id).await;
        drop(marker);
        self.finish(outcome)
    }

    /// Process a transaction the platform delivered without a pending request.
    ///
    /// Does not claim the pending-purchase marker, but requires the store to
    /// be initialized.
    #[tracing::instrument(
        name = "restore",
        skip(self, native),
        fields(service = %self.name, transaction_id = %native.transaction_id)
    )]
    pub async fn process_restored_purchase(
        &self,
        product_id: &str,
        native: NativePurchase,
    ) -> Result<PurchaseResult, StoreError> {
        let product_id = ProductId::new(product_id);
        if self.dispose.is_disposed() {
            return Err(StoreError::ObjectDisposed(self.name.clone()));
        }
        if product_id.is_empty() {
            return Err(self.reject(product_id, PurchaseErrorCode::InvalidArgument));
        }

        self.metrics.record_purchase_restored();
        tracing::info!("restored purchase delivered");
        self.events.emit(&StoreEvent::PurchaseInitiated {
            product_id: product_id.clone(),
            restored: true,
        });

        let outcome = self.run_restore(product_id, native).await;
        self.finish(outcome)
    }

    async fn run_purchase(&self, product_id: ProductId) -> Result<PurchaseResult, PurchaseError> {
        let result = PurchaseResult::new(product_id);

        let catalog = match self.initializer.initialize().await {
            Ok(catalog) => catalog,
            Err(e)
                if e.code == InitializeErrorCode::StoreDisposed || self.dispose.is_disposed() =>
            {
                return Err(PurchaseError::new(PurchaseErrorCode::StoreDisposed, result)
                    .with_cause(Arc::new(e)));
            }
            Err(e) => {
                return Err(
                    PurchaseError::new(PurchaseErrorCode::StoreInitializationFailed, result)
                        .with_cause(Arc::new(e)),
                );
            }
        };

        let product = match catalog.get(result.product_id.as_str()) {
            Some(product) if product.available_to_purchase => product.clone(),
            _ => return Err(PurchaseError::new(PurchaseErrorCode::ProductUnavailable, result)),
        };

        tracing::debug!(store = self.platform.store_id(), "issuing native purchase");
        let native = match self
            .dispose
            .run_until_disposed(self.platform.purchase(&product))
            .await
        {
            Some(Ok(native)) => native,
            Some(Err(failure)) => return Err(PurchaseError::from_platform(failure, result)),
            None => return Err(PurchaseError::new(PurchaseErrorCode::StoreDisposed, result)),
        };

        let transaction = StoreTransaction::new(product, native, self.platform.store_id(), false);
        self.validate(result.with_transaction(transaction)).await
    }

    async fn run_restore(
        &self,
        product_id: ProductId,
        native: NativePurchase,
    ) -> Result<PurchaseResult, PurchaseError> {
        let result = PurchaseResult::new(product_id).restored(true);

        let Some(catalog) = self.initializer.catalog() else {
            return Err(PurchaseError::new(
                PurchaseErrorCode::StoreInitializationFailed,
                result,
            ));
        };
        // Restored products only need to be known, not currently for sale.
        let Some(product) = catalog.get(result.product_id.as_str()).cloned() else {
            return Err(PurchaseError::new(PurchaseErrorCode::ProductUnavailable, result));
        };

        let transaction = StoreTransaction::new(product, native, self.platform.store_id(), true);
        self.validate(result.with_transaction(transaction)).await
    }

    async fn validate(&self, result: PurchaseResult) -> Result<PurchaseResult, PurchaseError> {
        let receipt = result
            .transaction
            .as_ref()
            .and_then(|tx| tx.receipt())
            .map(str::to_owned);
        let Some(receipt) = receipt else {
            self.metrics.record_validation_failure();
            return Err(PurchaseError::new(PurchaseErrorCode::ReceiptNullOrEmpty, result));
        };

        let Some(validator) = self.validator.as_ref() else {
            return self.validation_unavailable(result);
        };

        let store_id = self.platform.store_id();
        let validation = match self
            .dispose
            .run_until_disposed(validator.validate(&receipt, store_id))
            .await
        {
            Some(Ok(Some(validation))) => validation,
            Some(Ok(None)) => return self.validation_unavailable(result),
            Some(Err(e)) => {
                self.metrics.record_validation_failure();
                return Err(
                    PurchaseError::new(PurchaseErrorCode::ReceiptValidationFailed, result)
                        .with_cause(Arc::new(e)),
                );
            }
            None => return Err(PurchaseError::new(PurchaseErrorCode::StoreDisposed, result)),
        };

        if validation.is_failed() {
            self.metrics.record_validation_failure();
            tracing::warn!(status = validation.status_code, "receipt rejected");
            return Err(PurchaseError::new(
                PurchaseErrorCode::ReceiptValidationFailed,
                result.with_validation(validation),
            ));
        }

        self.metrics.record_receipt_validated();
        Ok(result.with_validation(validation))
    }

    fn validation_unavailable(
        &self,
        result: PurchaseResult,
    ) -> Result<PurchaseResult, PurchaseError> {
        self.metrics.record_validation_unavailable();
        let code = PurchaseErrorCode::ReceiptValidationNotAvailable;
        if self.require_validation {
            return Err(PurchaseError::new(code, result));
        }
        tracing::warn!("receipt validation not available");
        Ok(result.with_advisory(code))
    }

    fn finish(
        &self,
        outcome: Result<PurchaseResult, PurchaseError>,
    ) -> Result<PurchaseResult, StoreError> {
        match outcome {
            Ok(result) => {
                self.metrics.record_purchase_completed();
                tracing::info!(
                    transaction_id = result.transaction_id().unwrap_or_default(),
                    advisory = ?result.advisory,
                    "purchase completed"
                );
                self.events.emit(&StoreEvent::PurchaseCompleted(result.clone()));
                Ok(result)
            }
            Err(error) => {
                self.metrics.record_purchase_failed();
                tracing::warn!(code = %error.code, "purchase failed");
                self.events.emit(&StoreEvent::PurchaseFailed(error.clone()));
                Err(error.into())
            }
        }
    }

    fn reject(&self, product_id: ProductId, code: PurchaseErrorCode) -> StoreError {
        self.metrics.record_purchase_rejected();
        tracing::debug!(%code, "purchase rejected");
        PurchaseError::new(code, PurchaseResult::new(product_id)).into()
    }

    fn claim(&self, product_id: &ProductId) -> Option<PendingPurchase<'_>> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending.is_some() {
            return None;
        }
        *pending = Some(product_id.clone());
        Some(PendingPurchase {
            slot: &self.pending,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn pending_product(&self) -> Option<ProductId> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn state(&self) -> OrchestratorState {
        if self.is_busy() {
            OrchestratorState::PurchasePending
        } else if self.initializer.is_initializing() {
            OrchestratorState::Initializing
        } else {
            OrchestratorState::Idle
        }
    }

    /// Release the marker of a purchase that disposal is about to resolve.
    pub fn release_pending(&self) {
        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Holds the pending-purchase marker; releases it when dropped.
struct PendingPurchase<'a> {
    slot: &'a Mutex<Option<ProductId>>,
}

impl Drop for PendingPurchase<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
