//! Receipt validation results and validator contracts.
//!
//! Validators are external collaborators: this module defines what they return
//! and how they compose, never a store-specific wire format.

mod fallback;

pub use fallback::{SandboxFallbackValidator, SANDBOX_RECEIPT_ON_PRODUCTION};

use crate::errors::ValidationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Status code a validation service reports for a valid receipt.
pub const STATUS_OK: i32 = 0;

/// Environment a receipt was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreEnvironment {
    Production,
    Sandbox,
}

/// A single purchase entry contained in a validated receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub product_id: String,
    pub transaction_id: String,
    /// Transaction this one restores or renews, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
}

fn default_quantity() -> u32 {
    1
}

impl PurchaseReceipt {
    pub fn new(product_id: impl Into<String>, transaction_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            transaction_id: transaction_id.into(),
            original_transaction_id: None,
            quantity: default_quantity(),
            purchase_date: None,
        }
    }

    pub fn with_original_transaction(mut self, id: impl Into<String>) -> Self {
        self.original_transaction_id = Some(id.into());
        self
    }

    pub fn with_purchase_date(mut self, date: DateTime<Utc>) -> Self {
        self.purchase_date = Some(date);
        self
    }
}

/// Result of validating a receipt against a validation service.
///
/// `is_ok()` holds exactly when `status_code` is [`STATUS_OK`]; any other code
/// is a service-specific failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status_code: i32,
    /// Textual status as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<StoreEnvironment>,
    /// Raw response payload.
    #[serde(default)]
    pub raw_response: String,
    #[serde(default)]
    receipts: Vec<PurchaseReceipt>,
}

impl ValidationResult {
    pub fn new(status_code: i32) -> Self {
        Self {
            status_code,
            status: None,
            environment: None,
            raw_response: String::new(),
            receipts: Vec::new(),
        }
    }

    /// A successful result.
    pub fn ok() -> Self {
        Self::new(STATUS_OK)
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_environment(mut self, environment: StoreEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = raw.into();
        self
    }

    pub fn with_receipt(mut self, receipt: PurchaseReceipt) -> Self {
        self.receipts.push(receipt);
        self
    }

    pub fn with_receipts(mut self, receipts: impl IntoIterator<Item = PurchaseReceipt>) -> Self {
        self.receipts.extend(receipts);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == STATUS_OK
    }

    pub fn is_failed(&self) -> bool {
        !self.is_ok()
    }

    /// Iterate the contained receipt entries in order.
    ///
    /// Each call starts a fresh iteration; the sequence is empty when the
    /// response carried no receipt data.
    pub fn receipts(&self) -> std::slice::Iter<'_, PurchaseReceipt> {
        self.receipts.iter()
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }

    pub fn find_receipt(&self, transaction_id: &str) -> Option<&PurchaseReceipt> {
        self.receipts
            .iter()
            .find(|r| r.transaction_id == transaction_id)
    }

    /// Parse the raw response payload as JSON.
    pub fn response_json(&self) -> Result<serde_json::Value, ValidationError> {
        serde_json::from_str(&self.raw_response)
            .map_err(|e| ValidationError::Response(e.to_string()))
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a PurchaseReceipt;
    type IntoIter = std::slice::Iter<'a, PurchaseReceipt>;

    fn into_iter(self) -> Self::IntoIter {
        self.receipts()
    }
}

/// Receipt validation collaborator.
#[async_trait]
pub trait ReceiptValidator: Send + Sync {
    /// Validate a raw native receipt issued by the store `store_id`.
    ///
    /// Returns `Ok(None)` if no validation service is available for the
    /// receipt. A service that answered, even negatively, returns
    /// `Ok(Some(result))`.
    async fn validate(
        &self,
        receipt: &str,
        store_id: &str,
    ) -> Result<Option<ValidationResult>, ValidationError>;
}

/// Validators keyed by the store id they handle.
pub struct ReceiptValidatorRegistry {
    validators: RwLock<HashMap<String, Arc<dyn ReceiptValidator>>>,
}

impl ReceiptValidatorRegistry {
    pub fn new() -> Self {
        Self {
            validators: RwLock::new(HashMap::new()),
        }
    }

    /// Register a validator, replacing any previous one for the same store.
    pub fn register(&self, store_id: impl Into<String>, validator: Arc<dyn ReceiptValidator>) {
        self.validators
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(store_id.into(), validator);
    }

    pub fn unregister(&self, store_id: &str) -> bool {
        self.validators
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(store_id)
            .is_some()
    }

    pub fn get(&self, store_id: &str) -> Option<Arc<dyn ReceiptValidator>> {
        self.validators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(store_id)
            .cloned()
    }

    pub fn store_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .validators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

impl Default for ReceiptValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptValidator for ReceiptValidatorRegistry {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, receipt)))]
    async fn validate(
        &self,
        receipt: &str,
        store_id: &str,
    ) -> Result<Option<ValidationResult>, ValidationError> {
        match self.get(store_id) {
            Some(validator) => validator.validate(receipt, store_id).await,
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(store_id, "no receipt validator registered");
                Ok(None)
            }
        }
    }
}
