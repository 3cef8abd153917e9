//! Store transactions produced by completed native purchases.

use crate::catalog::Product;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a platform store reports for a successful native purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativePurchase {
    pub transaction_id: String,
    /// Raw native receipt, if the platform produced one.
    pub receipt: Option<String>,
}

impl NativePurchase {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            receipt: None,
        }
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }
}

/// A completed store transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTransaction {
    /// The purchased product, shared with the catalog.
    pub product: Arc<Product>,
    pub transaction_id: String,
    /// Identifier of the platform store that processed the transaction.
    pub store_id: String,
    /// Raw native receipt.
    pub receipt: Option<String>,
    /// Whether the platform re-delivered this transaction without a request.
    pub restored: bool,
}

impl StoreTransaction {
    pub fn new(
        product: Arc<Product>,
        native: NativePurchase,
        store_id: impl Into<String>,
        restored: bool,
    ) -> Self {
        Self {
            product,
            transaction_id: native.transaction_id,
            store_id: store_id.into(),
            receipt: native.receipt,
            restored,
        }
    }

    /// The receipt if it is present and non-empty.
    pub fn receipt(&self) -> Option<&str> {
        self.receipt.as_deref().filter(|r| !r.is_empty())
    }
}
