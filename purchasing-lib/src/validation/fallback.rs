//! Production-first validation with sandbox fallback.

use super::{ReceiptValidator, StoreEnvironment, ValidationResult};
use crate::errors::ValidationError;
use async_trait::async_trait;
use std::sync::Arc;

/// Status a production validation service reports for a receipt that was
/// issued by the sandbox environment.
pub const SANDBOX_RECEIPT_ON_PRODUCTION: i32 = 21007;

/// Validates receipts against production first and retries against sandbox
/// when production reports a sandbox receipt.
///
/// Test builds and review builds produce sandbox receipts, so the same
/// application binary may hand either kind to the validator.
pub struct SandboxFallbackValidator {
    production: Arc<dyn ReceiptValidator>,
    sandbox: Arc<dyn ReceiptValidator>,
}

impl SandboxFallbackValidator {
    pub fn new(production: Arc<dyn ReceiptValidator>, sandbox: Arc<dyn ReceiptValidator>) -> Self {
        Self {
            production,
            sandbox,
        }
    }
}

#[async_trait]
impl ReceiptValidator for SandboxFallbackValidator {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, receipt)))]
    async fn validate(
        &self,
        receipt: &str,
        store_id: &str,
    ) -> Result<Option<ValidationResult>, ValidationError> {
        match self.production.validate(receipt, store_id).await? {
            Some(result) if result.status_code == SANDBOX_RECEIPT_ON_PRODUCTION => {
                #[cfg(feature = "tracing")]
                tracing::debug!("sandbox receipt sent to production, retrying against sandbox");
                let result = self.sandbox.validate(receipt, store_id).await?;
                Ok(result.map(|r| match r.environment {
                    Some(_) => r,
                    None => r.with_environment(StoreEnvironment::Sandbox),
                }))
            }
            other => Ok(other),
        }
    }
}
