//! Lifecycle notifications and the observer list.
//!
//! Observers are plain callbacks. They are invoked synchronously, in
//! registration order, after internal locks have been released, so an observer
//! may query the service that notified it.

use purchasing_lib::{InitializeError, ProductId, PurchaseError, PurchaseResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A lifecycle notification raised by a store service.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The store finished initializing.
    Initialized,
    /// The store failed to initialize.
    InitializeFailed(InitializeError),
    /// A purchase started, either requested by the user or restored.
    PurchaseInitiated { product_id: ProductId, restored: bool },
    /// A purchase completed successfully.
    PurchaseCompleted(PurchaseResult),
    /// A purchase failed.
    PurchaseFailed(PurchaseError),
}

impl StoreEvent {
    pub fn kind(&self) -> StoreEventKind {
        match self {
            Self::Initialized => StoreEventKind::Initialized,
            Self::InitializeFailed(_) => StoreEventKind::InitializeFailed,
            Self::PurchaseInitiated { .. } => StoreEventKind::PurchaseInitiated,
            Self::PurchaseCompleted(_) => StoreEventKind::PurchaseCompleted,
            Self::PurchaseFailed(_) => StoreEventKind::PurchaseFailed,
        }
    }

    /// Product the event concerns, if any.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::PurchaseInitiated { product_id, .. } => Some(product_id),
            Self::PurchaseCompleted(result) => Some(&result.product_id),
            Self::PurchaseFailed(error) => Some(&error.result.product_id),
            _ => None,
        }
    }
}

/// Discriminant of a [`StoreEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreEventKind {
    Initialized,
    InitializeFailed,
    PurchaseInitiated,
    PurchaseCompleted,
    PurchaseFailed,
}

impl fmt::Display for StoreEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Callback for lifecycle notifications.
pub type StoreObserver = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Handle returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of observers.
pub struct EventHub {
    observers: RwLock<Vec<(SubscriptionId, StoreObserver)>>,
    next_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Notify every observer of `event`.
    pub fn emit(&self, event: &StoreEvent) {
        let observers: Vec<StoreObserver> = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        tracing::trace!(kind = %event.kind(), observers = observers.len(), "emitting store event");
        for observer in observers {
            observer(event);
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
