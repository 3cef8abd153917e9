//! Assertion helpers for purchase results.

use crate::errors::PurchaseErrorCode;
use crate::result::PurchaseResult;
use crate::Result;

/// Assert that a purchase succeeded and return its result.
///
/// # Panics
/// Panics if the purchase failed.
pub fn assert_purchase_succeeded(result: &Result<PurchaseResult>) -> &PurchaseResult {
    match result {
        Ok(purchase) => purchase,
        Err(e) => panic!("Purchase failed with error: {}", e),
    }
}

/// Assert that a purchase failed with the given code.
///
/// # Panics
/// Panics if the purchase succeeded or failed with another error.
pub fn assert_purchase_failed(result: &Result<PurchaseResult>, expected: PurchaseErrorCode) {
    match result {
        Ok(purchase) => panic!(
            "Expected purchase to fail with {}, but it succeeded: {:?}",
            expected, purchase
        ),
        Err(e) => assert_eq!(
            e.purchase_code(),
            Some(expected),
            "Unexpected failure: {}",
            e
        ),
    }
}
