//! Property-based tests for purchasing-lib
//!
//! These tests use proptest to verify invariants across a wide range of inputs.

#[cfg(test)]
mod validation_properties {
    use proptest::prelude::*;
    use purchasing_lib::{PurchaseReceipt, ValidationResult};

    proptest! {
        /// A result is OK exactly when its status code is zero
        #[test]
        fn ok_iff_status_zero(status in any::<i32>()) {
            let result = ValidationResult::new(status);
            prop_assert_eq!(result.is_ok(), status == 0);
            prop_assert_eq!(result.is_failed(), !result.is_ok());
        }

        /// Receipt enumeration yields every entry in insertion order, every time
        #[test]
        fn receipts_enumerate_in_order(ids in prop::collection::vec("[a-z0-9]{1,12}", 0..16)) {
            let result = ValidationResult::ok()
                .with_receipts(ids.iter().map(|id| PurchaseReceipt::new("coin100", id.clone())));

            let first: Vec<_> = result.receipts().map(|r| r.transaction_id.clone()).collect();
            let second: Vec<_> = result.receipts().map(|r| r.transaction_id.clone()).collect();
            prop_assert_eq!(&first, &ids);
            prop_assert_eq!(first, second);
        }
    }
}

#[cfg(test)]
mod mapping_properties {
    use proptest::prelude::*;
    use purchasing_lib::{
        InitializationFailureReason, InitializeErrorCode, PurchaseErrorCode, PurchaseFailureReason,
    };

    fn purchase_reason() -> impl Strategy<Value = PurchaseFailureReason> {
        prop_oneof![
            Just(PurchaseFailureReason::Unknown),
            Just(PurchaseFailureReason::PurchasingUnavailable),
            Just(PurchaseFailureReason::ExistingPurchasePending),
            Just(PurchaseFailureReason::ProductUnavailable),
            Just(PurchaseFailureReason::SignatureInvalid),
            Just(PurchaseFailureReason::UserCancelled),
            Just(PurchaseFailureReason::PaymentDeclined),
            Just(PurchaseFailureReason::DuplicateTransaction),
            Just(PurchaseFailureReason::AlreadyCompleted),
            ".*".prop_map(PurchaseFailureReason::Other),
        ]
    }

    proptest! {
        /// Mapping a platform reason is deterministic
        #[test]
        fn purchase_mapping_is_deterministic(reason in purchase_reason()) {
            prop_assert_eq!(
                PurchaseErrorCode::from(&reason),
                PurchaseErrorCode::from(reason.clone())
            );
        }

        /// No platform reason maps onto a code reserved for the orchestrator
        #[test]
        fn platform_reasons_never_map_to_internal_codes(reason in purchase_reason()) {
            let code = PurchaseErrorCode::from(reason);
            prop_assert!(!matches!(
                code,
                PurchaseErrorCode::StoreDisposed
                    | PurchaseErrorCode::ReceiptNullOrEmpty
                    | PurchaseErrorCode::ReceiptValidationFailed
                    | PurchaseErrorCode::ReceiptValidationNotAvailable
                    | PurchaseErrorCode::StoreInitializationFailed
                    | PurchaseErrorCode::InvalidArgument
            ));
        }

        /// Unrecognized initialization reasons always map to Unknown
        #[test]
        fn other_initialize_reasons_are_unknown(raw in ".*") {
            let code = InitializeErrorCode::from(InitializationFailureReason::Other(raw));
            prop_assert_eq!(code, InitializeErrorCode::Unknown);
        }
    }
}
