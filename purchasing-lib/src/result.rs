//! Purchase outcome value type.

use crate::errors::PurchaseErrorCode;
use crate::transaction::StoreTransaction;
use crate::validation::ValidationResult;
use crate::ProductId;

/// Outcome of a purchase, successful or not.
///
/// Failures wrap this in [`crate::PurchaseError`] so whatever was reached
/// before the failure (transaction, validation result) stays observable.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseResult {
    pub product_id: ProductId,
    /// Absent if the purchase never reached the native layer.
    pub transaction: Option<StoreTransaction>,
    /// Absent if validation was skipped or unavailable.
    pub validation_result: Option<ValidationResult>,
    pub restored: bool,
    /// Non-fatal condition attached to an otherwise successful purchase.
    pub advisory: Option<PurchaseErrorCode>,
}

impl PurchaseResult {
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            transaction: None,
            validation_result: None,
            restored: false,
            advisory: None,
        }
    }

    pub fn restored(mut self, restored: bool) -> Self {
        self.restored = restored;
        self
    }

    pub fn with_transaction(mut self, transaction: StoreTransaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn with_validation(mut self, validation: ValidationResult) -> Self {
        self.validation_result = Some(validation);
        self
    }

    pub fn with_advisory(mut self, advisory: PurchaseErrorCode) -> Self {
        self.advisory = Some(advisory);
        self
    }

    pub fn has_advisory(&self) -> bool {
        self.advisory.is_some()
    }

    /// Returns true if a validation result is present and reports success.
    pub fn is_validated(&self) -> bool {
        self.validation_result.as_ref().is_some_and(|v| v.is_ok())
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.transaction_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_is_bare() {
        let result = PurchaseResult::new("coin100");
        assert_eq!(result.product_id.as_str(), "coin100");
        assert!(result.transaction_id().is_none());
        assert!(!result.is_validated());
        assert!(!result.has_advisory());
        assert!(!result.restored);
    }

    #[test]
    fn test_advisory_and_validation() {
        let result = PurchaseResult::new("coin100")
            .with_advisory(PurchaseErrorCode::ReceiptValidationNotAvailable);
        assert!(result.has_advisory());
        assert!(!result.is_validated());

        let result = PurchaseResult::new("coin100").with_validation(ValidationResult::new(0));
        assert!(result.is_validated());
        assert!(!PurchaseResult::new("x")
            .with_validation(ValidationResult::new(21003))
            .is_validated());
    }
}
