//! Product definitions and the immutable product catalog.

use crate::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Kind of product sold through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Can be purchased repeatedly, e.g. in-game currency.
    Consumable,
    /// Purchased once and owned permanently.
    NonConsumable,
    /// Grants access for a limited period.
    Subscription,
}

/// A product as configured by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDefinition {
    /// Application-level identifier.
    pub id: ProductId,
    /// Identifier used by the platform store, if it differs from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_specific_id: Option<String>,
    pub product_type: ProductType,
}

impl ProductDefinition {
    pub fn new(id: impl Into<ProductId>, product_type: ProductType) -> Self {
        Self {
            id: id.into(),
            store_specific_id: None,
            product_type,
        }
    }

    pub fn with_store_specific_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_specific_id = Some(store_id.into());
        self
    }

    /// Identifier the platform store knows the product by.
    pub fn store_specific_id(&self) -> &str {
        self.store_specific_id
            .as_deref()
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Localized metadata reported by the platform store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub localized_title: String,
    pub localized_description: String,
    /// Price formatted for display, e.g. `"$0.99"`.
    pub localized_price_string: String,
    /// ISO 4217 currency code.
    pub iso_currency_code: String,
}

/// A product known to the initialized store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub definition: ProductDefinition,
    pub metadata: ProductMetadata,
    /// Whether the product can currently be purchased.
    pub available_to_purchase: bool,
}

impl Product {
    pub fn new(definition: ProductDefinition, metadata: ProductMetadata) -> Self {
        Self {
            definition,
            metadata,
            available_to_purchase: true,
        }
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.available_to_purchase = available;
        self
    }

    pub fn id(&self) -> &ProductId {
        &self.definition.id
    }

    pub fn product_type(&self) -> ProductType {
        self.definition.product_type
    }
}

/// Immutable mapping from product identifier to product.
///
/// Built once per successful initialization and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<ProductId, Arc<Product>>,
}

impl ProductCatalog {
    /// Build a catalog from the configured definitions and the products the
    /// platform reported.
    ///
    /// Platform products that were not configured are ignored. Configured
    /// products the platform omitted are absent from the catalog.
    pub fn from_platform(definitions: &[ProductDefinition], products: Vec<Product>) -> Self {
        let products = products
            .into_iter()
            .filter(|p| definitions.iter().any(|d| d.id == p.definition.id))
            .map(|p| (p.definition.id.clone(), Arc::new(p)))
            .collect();
        Self { products }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Product>> {
        self.products.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.products.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Product>> {
        self.products.values()
    }

    /// Products that can currently be purchased.
    pub fn available(&self) -> impl Iterator<Item = &Arc<Product>> {
        self.products.values().filter(|p| p.available_to_purchase)
    }
}
