//! Collaborator contracts for configuration and the platform store module.

use crate::catalog::{Product, ProductDefinition};
use crate::errors::{BoxError, PlatformInitializeFailure, PlatformPurchaseFailure};
use crate::transaction::NativePurchase;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Store configuration supplied by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub products: Vec<ProductDefinition>,
}

impl StoreConfig {
    pub fn new(products: Vec<ProductDefinition>) -> Self {
        Self { products }
    }
}

/// Supplies the store configuration at initialization time.
#[async_trait]
pub trait StoreConfigProvider: Send + Sync {
    async fn get_store_config(&self) -> Result<StoreConfig, BoxError>;
}

/// Platform store module (App Store, Google Play, a test store, ...).
///
/// Each call resolves exactly once, either with the success payload or with
/// the platform's own failure reason.
#[async_trait]
pub trait PlatformStore: Send + Sync {
    /// Identifier of the store, passed to receipt validators.
    fn store_id(&self) -> &str;

    /// Register the configured products and initialize the store.
    ///
    /// Returns the products the store knows about, with localized metadata.
    async fn initialize(
        &self,
        products: &[ProductDefinition],
    ) -> Result<Vec<Product>, PlatformInitializeFailure>;

    /// Issue a native purchase request for `product`.
    async fn purchase(&self, product: &Product) -> Result<NativePurchase, PlatformPurchaseFailure>;
}
