//! Scriptable platform store and configuration provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use super::fixtures::{fixture_products, fixture_store_config, TestFixtures};
use crate::catalog::{Product, ProductDefinition};
use crate::errors::{BoxError, PlatformInitializeFailure, PlatformPurchaseFailure};
use crate::platform::{PlatformStore, StoreConfig, StoreConfigProvider};
use crate::transaction::NativePurchase;

/// An open/closed gate callers can wait on.
pub struct Gate {
    open: watch::Sender<bool>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            open: watch::Sender::new(true),
        }
    }

    pub fn close(&self) {
        self.open.send_replace(false);
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    /// Wait until the gate is open.
    pub async fn passed(&self) {
        let mut rx = self.open.subscribe();
        // The sender lives in self, so the channel cannot close while waiting.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

struct Counter {
    count: watch::Sender<usize>,
}

impl Counter {
    fn new() -> Self {
        Self {
            count: watch::Sender::new(0),
        }
    }

    fn increment(&self) -> usize {
        let mut current = 0;
        self.count.send_modify(|c| {
            *c += 1;
            current = *c;
        });
        current
    }

    fn get(&self) -> usize {
        *self.count.borrow()
    }

    async fn wait_for(&self, n: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|c| *c >= n).await;
    }
}

/// A platform store whose calls can be held and whose outcomes are scripted.
///
/// Without scripting, initialization reports the configured products it knows
/// about and each purchase succeeds with transaction `tx-<n>` and receipt
/// `receipt-<n>`.
pub struct MockPlatformStore {
    store_id: String,
    products: Mutex<Vec<Product>>,
    init_failures: Mutex<VecDeque<PlatformInitializeFailure>>,
    purchase_outcomes: Mutex<VecDeque<Result<NativePurchase, PlatformPurchaseFailure>>>,
    init_gate: Gate,
    purchase_gate: Gate,
    init_calls: Counter,
    purchase_calls: Counter,
    registered: Mutex<Vec<ProductDefinition>>,
}

impl MockPlatformStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            store_id: TestFixtures::STORE_ID.to_string(),
            products: Mutex::new(products),
            init_failures: Mutex::new(VecDeque::new()),
            purchase_outcomes: Mutex::new(VecDeque::new()),
            init_gate: Gate::new(),
            purchase_gate: Gate::new(),
            init_calls: Counter::new(),
            purchase_calls: Counter::new(),
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fixture_products() -> Self {
        Self::new(fixture_products())
    }

    pub fn with_store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = store_id.into();
        self
    }

    /// Fail the next initialization with `failure`.
    pub fn fail_next_initialize(&self, failure: PlatformInitializeFailure) {
        self.init_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(failure);
    }

    /// Script the outcome of the next purchase.
    pub fn push_purchase_outcome(&self, outcome: Result<NativePurchase, PlatformPurchaseFailure>) {
        self.purchase_outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    /// Hold initialization calls until released.
    pub fn hold_initialize(&self) {
        self.init_gate.close();
    }

    pub fn release_initialize(&self) {
        self.init_gate.open();
    }

    /// Hold purchase calls until released.
    pub fn hold_purchases(&self) {
        self.purchase_gate.close();
    }

    pub fn release_purchases(&self) {
        self.purchase_gate.open();
    }

    pub fn initialize_calls(&self) -> usize {
        self.init_calls.get()
    }

    pub fn purchase_calls(&self) -> usize {
        self.purchase_calls.get()
    }

    /// Wait until at least `n` initialization calls have been issued.
    pub async fn wait_for_initialize_calls(&self, n: usize) {
        self.init_calls.wait_for(n).await
    }

    /// Wait until at least `n` purchase calls have been issued.
    pub async fn wait_for_purchase_calls(&self, n: usize) {
        self.purchase_calls.wait_for(n).await
    }

    /// Product definitions registered by the last initialization.
    pub fn registered_products(&self) -> Vec<ProductDefinition> {
        self.registered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl PlatformStore for MockPlatformStore {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    async fn initialize(
        &self,
        products: &[ProductDefinition],
    ) -> Result<Vec<Product>, PlatformInitializeFailure> {
        self.init_calls.increment();
        *self.registered.lock().unwrap_or_else(|e| e.into_inner()) = products.to_vec();
        self.init_gate.passed().await;

        let failure = self
            .init_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match failure {
            Some(failure) => Err(failure),
            None => Ok(self
                .products
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()),
        }
    }

    async fn purchase(
        &self,
        _product: &Product,
    ) -> Result<NativePurchase, PlatformPurchaseFailure> {
        let n = self.purchase_calls.increment();
        self.purchase_gate.passed().await;

        let scripted = self
            .purchase_outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        scripted.unwrap_or_else(|| {
            Ok(NativePurchase::new(format!("tx-{}", n)).with_receipt(format!("receipt-{}", n)))
        })
    }
}

/// Configuration provider returning a fixed configuration or a fixed error.
pub struct StaticConfigProvider {
    config: StoreConfig,
    error: Option<String>,
    calls: AtomicUsize,
}

impl StaticConfigProvider {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixtures() -> Self {
        Self::new(fixture_store_config())
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            config: StoreConfig::default(),
            error: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConfigProvider for StaticConfigProvider {
    async fn get_store_config(&self) -> Result<StoreConfig, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.config.clone()),
        }
    }
}
