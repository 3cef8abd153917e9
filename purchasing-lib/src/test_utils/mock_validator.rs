//! Scriptable receipt validator.

use std::sync::Mutex;

use async_trait::async_trait;

use super::mock_platform::Gate;
use crate::errors::ValidationError;
use crate::validation::{ReceiptValidator, ValidationResult};

enum Behavior {
    Respond(ValidationResult),
    Unavailable,
    Error(String),
}

/// A receipt validator with a fixed answer that records what it was asked.
pub struct MockReceiptValidator {
    behavior: Behavior,
    gate: Gate,
    received: Mutex<Vec<(String, String)>>,
}

impl MockReceiptValidator {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            gate: Gate::new(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Accepts every receipt with status 0.
    pub fn ok() -> Self {
        Self::responding(ValidationResult::ok())
    }

    /// Rejects every receipt with `status_code`.
    pub fn failing(status_code: i32) -> Self {
        Self::responding(ValidationResult::new(status_code))
    }

    pub fn responding(result: ValidationResult) -> Self {
        Self::with_behavior(Behavior::Respond(result))
    }

    /// Reports that no validation service is available.
    pub fn unavailable() -> Self {
        Self::with_behavior(Behavior::Unavailable)
    }

    /// Fails every call with a service error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Error(message.into()))
    }

    /// Hold validation calls until released.
    pub fn hold(&self) {
        self.gate.close();
    }

    pub fn release(&self) {
        self.gate.open();
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn validated_receipts(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(receipt, _)| receipt.clone())
            .collect()
    }

    pub fn store_ids(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, store_id)| store_id.clone())
            .collect()
    }
}

#[async_trait]
impl ReceiptValidator for MockReceiptValidator {
    async fn validate(
        &self,
        receipt: &str,
        store_id: &str,
    ) -> Result<Option<ValidationResult>, ValidationError> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((receipt.to_string(), store_id.to_string()));
        self.gate.passed().await;

        match &self.behavior {
            Behavior::Respond(result) => Ok(Some(result.clone())),
            Behavior::Unavailable => Ok(None),
            Behavior::Error(message) => Err(ValidationError::Service(message.clone())),
        }
    }
}
