//! End-to-end purchase flows against scripted collaborators.

mod common;

use common::Harness;
use purchasing_lib::test_utils::{
    assert_purchase_failed, assert_purchase_succeeded, MockReceiptValidator, TestFixtures,
};
use purchasing_lib::{
    InitializationFailureReason, InitializeErrorCode, NativePurchase, PlatformInitializeFailure,
    PlatformPurchaseFailure, PurchaseErrorCode, PurchaseFailureReason, PurchaseReceipt,
    StoreError, StoreServiceConfig, ValidationResult,
};
use purchasing_store::{OrchestratorState, StoreEvent, StoreEventKind};
use std::sync::{Arc, Mutex};

fn coin100_purchase() -> NativePurchase {
    NativePurchase::new(TestFixtures::TRANSACTION_ID).with_receipt(TestFixtures::RECEIPT)
}

#[tokio::test]
async fn test_purchase_coin100_validated() {
    let h = Harness::new();
    h.platform.push_purchase_outcome(Ok(coin100_purchase()));

    let result = h.store.purchase("coin100").await;
    let purchase = assert_purchase_succeeded(&result);

    assert_eq!(purchase.product_id.as_str(), "coin100");
    assert_eq!(purchase.transaction_id(), Some("tx-1"));
    assert_eq!(
        purchase.transaction.as_ref().and_then(|t| t.receipt()),
        Some("R1")
    );
    assert!(purchase.validation_result.as_ref().unwrap().is_ok());
    assert!(!purchase.restored);
    assert!(!purchase.has_advisory());

    assert_eq!(h.validator.validated_receipts(), vec!["R1".to_string()]);
    assert_eq!(h.validator.store_ids(), vec![TestFixtures::STORE_ID.to_string()]);
    assert_eq!(h.store.state(), OrchestratorState::Idle);
}

#[tokio::test]
async fn test_events_in_order_for_first_purchase() {
    let h = Harness::new();

    h.store.purchase("coin100").await.unwrap();

    assert_eq!(
        h.log.kinds(),
        vec![
            StoreEventKind::PurchaseInitiated,
            StoreEventKind::Initialized,
            StoreEventKind::PurchaseCompleted,
        ]
    );
    match &h.log.events()[0] {
        StoreEvent::PurchaseInitiated {
            product_id,
            restored,
        } => {
            assert_eq!(product_id.as_str(), "coin100");
            assert!(!restored);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_product_id_is_invalid_argument() {
    let h = Harness::new();

    let result = h.store.purchase("").await;

    assert_purchase_failed(&result, PurchaseErrorCode::InvalidArgument);
    assert!(h.log.events().is_empty());
    assert_eq!(h.store.state(), OrchestratorState::Idle);
    assert!(!h.store.is_initialized());
    assert_eq!(h.store.metrics().purchases_rejected, 1);
}

#[tokio::test]
async fn test_user_cancellation() {
    let h = Harness::new();
    h.platform.push_purchase_outcome(Err(PlatformPurchaseFailure::new(
        PurchaseFailureReason::UserCancelled,
    )));

    let result = h.store.purchase("coin100").await;

    assert_purchase_failed(&result, PurchaseErrorCode::UserCanceled);
    match h.log.events().last() {
        Some(StoreEvent::PurchaseFailed(err)) => {
            assert_eq!(err.code, PurchaseErrorCode::UserCanceled);
            assert!(err.is_canceled());
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(h.store.state(), OrchestratorState::Idle);
    assert!(!h.store.is_busy());
    assert_eq!(h.validator.call_count(), 0);
}

#[tokio::test]
async fn test_platform_reasons_are_normalized() {
    let cases = [
        (PurchaseFailureReason::PaymentDeclined, PurchaseErrorCode::PaymentDeclined),
        (PurchaseFailureReason::SignatureInvalid, PurchaseErrorCode::SignatureInvalid),
        (PurchaseFailureReason::ProductUnavailable, PurchaseErrorCode::ProductUnavailable),
        (PurchaseFailureReason::PurchasingUnavailable, PurchaseErrorCode::PurchasingUnavailable),
        (PurchaseFailureReason::DuplicateTransaction, PurchaseErrorCode::DuplicateTransaction),
        (PurchaseFailureReason::AlreadyCompleted, PurchaseErrorCode::DuplicateTransaction),
        (PurchaseFailureReason::Other("E_42".into()), PurchaseErrorCode::Unknown),
    ];

    let h = Harness::new();
    for (reason, expected) in cases {
        h.platform
            .push_purchase_outcome(Err(PlatformPurchaseFailure::new(reason)));
        let result = h.store.purchase("coin100").await;
        assert_purchase_failed(&result, expected);
    }
    assert_eq!(h.log.count(StoreEventKind::PurchaseFailed), 7);
    assert_eq!(h.log.count(StoreEventKind::PurchaseCompleted), 0);
}

#[tokio::test]
async fn test_empty_receipt_fails_regardless_of_validator() {
    for validator in [
        MockReceiptValidator::ok(),
        MockReceiptValidator::unavailable(),
        MockReceiptValidator::failing(21003),
    ] {
        let h = Harness::with_validator(validator);
        h.platform
            .push_purchase_outcome(Ok(NativePurchase::new("tx-1").with_receipt("")));

        let result = h.store.purchase("coin100").await;

        assert_purchase_failed(&result, PurchaseErrorCode::ReceiptNullOrEmpty);
        assert_eq!(h.validator.call_count(), 0);
    }
}

#[tokio::test]
async fn test_missing_receipt_fails() {
    let h = Harness::new();
    h.platform.push_purchase_outcome(Ok(NativePurchase::new("tx-1")));

    match h.store.purchase("coin100").await.unwrap_err() {
        StoreError::Purchase(err) => {
            assert_eq!(err.code, PurchaseErrorCode::ReceiptNullOrEmpty);
            assert_eq!(err.result.transaction_id(), Some("tx-1"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_rejected_receipt_carries_validation_result() {
    let rejection = ValidationResult::new(21003)
        .with_status("receipt could not be authenticated")
        .with_raw_response(r#"{"status":21003}"#);
    let h = Harness::with_validator(MockReceiptValidator::responding(rejection));

    match h.store.purchase("coin100").await.unwrap_err() {
        StoreError::Purchase(err) => {
            assert_eq!(err.code, PurchaseErrorCode::ReceiptValidationFailed);
            let validation = err.result.validation_result.as_ref().unwrap();
            assert!(validation.is_failed());
            assert_eq!(validation.status_code, 21003);
            assert_eq!(validation.response_json().unwrap()["status"], 21003);
            assert!(err.result.transaction.is_some());
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(h.store.metrics().validation_failures, 1);
}

#[tokio::test]
async fn test_unavailable_validation_is_advisory() {
    let h = Harness::with_validator(MockReceiptValidator::unavailable());

    let result = h.store.purchase("coin100").await;
    let purchase = assert_purchase_succeeded(&result);

    assert!(purchase.validation_result.is_none());
    assert_eq!(
        purchase.advisory,
        Some(PurchaseErrorCode::ReceiptValidationNotAvailable)
    );
    assert_eq!(h.log.count(StoreEventKind::PurchaseCompleted), 1);
}

#[tokio::test]
async fn test_no_validator_is_advisory() {
    let h = Harness::without_validator(StoreServiceConfig::default());

    let result = h.store.purchase("coin100").await;
    let purchase = assert_purchase_succeeded(&result);

    assert!(purchase.has_advisory());
    assert!(purchase.transaction.is_some());
    assert_eq!(h.store.metrics().validation_unavailable, 1);
}

#[tokio::test]
async fn test_required_validation_turns_advisory_into_failure() {
    let h = Harness::without_validator(StoreServiceConfig::new().with_required_validation(true));

    let result = h.store.purchase("coin100").await;

    assert_purchase_failed(&result, PurchaseErrorCode::ReceiptValidationNotAvailable);
    assert_eq!(h.log.count(StoreEventKind::PurchaseFailed), 1);
}

#[tokio::test]
async fn test_validated_receipt_entries_are_enumerable() {
    let validation = ValidationResult::ok()
        .with_receipt(PurchaseReceipt::new("coin100", "tx-1"))
        .with_receipt(PurchaseReceipt::new("no_ads", "tx-0"));
    let h = Harness::with_validator(MockReceiptValidator::responding(validation));
    h.platform.push_purchase_outcome(Ok(coin100_purchase()));

    let purchase = h.store.purchase("coin100").await.unwrap();
    let validation = purchase.validation_result.unwrap();

    let products: Vec<_> = validation.receipts().map(|r| r.product_id.as_str()).collect();
    assert_eq!(products, vec!["coin100", "no_ads"]);
    assert!(validation.find_receipt("tx-1").is_some());
}

#[tokio::test]
async fn test_initialization_failure_blocks_purchase() {
    let h = Harness::new();
    h.platform.fail_next_initialize(PlatformInitializeFailure::new(
        InitializationFailureReason::PurchasingUnavailable,
    ));

    match h.store.purchase("coin100").await.unwrap_err() {
        StoreError::Purchase(err) => {
            assert_eq!(err.code, PurchaseErrorCode::StoreInitializationFailed);
            assert!(err.cause.is_some());
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(h.platform.purchase_calls(), 0);
    assert_eq!(
        h.log.kinds(),
        vec![
            StoreEventKind::PurchaseInitiated,
            StoreEventKind::InitializeFailed,
            StoreEventKind::PurchaseFailed,
        ]
    );

    // The caller may retry once the store is reachable.
    assert!(h.store.purchase("coin100").await.is_ok());
}

#[tokio::test]
async fn test_initialize_failure_event_carries_code() {
    let h = Harness::new();
    h.platform.fail_next_initialize(
        PlatformInitializeFailure::new(InitializationFailureReason::Other("BILLING_3".into()))
            .with_message("billing unavailable"),
    );

    let err = h.store.initialize().await.unwrap_err();
    assert_eq!(err.initialize_code(), Some(InitializeErrorCode::Unknown));

    match h.log.events().as_slice() {
        [StoreEvent::InitializeFailed(failure)] => {
            assert_eq!(failure.code, InitializeErrorCode::Unknown);
            let cause = failure.cause.as_ref().unwrap().to_string();
            assert!(cause.contains("BILLING_3"));
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let h = Harness::new();

    h.store.initialize().await.unwrap();
    h.store.initialize().await.unwrap();
    h.store.purchase("coin100").await.unwrap();

    assert_eq!(h.platform.initialize_calls(), 1);
    assert_eq!(h.log.count(StoreEventKind::Initialized), 1);
    assert_eq!(h.store.metrics().initialize_attempts, 1);
}

#[tokio::test]
async fn test_unavailable_and_unknown_products() {
    let h = Harness::new();

    for id in [TestFixtures::NO_ADS, TestFixtures::SEASON_PASS, "gem_pack"] {
        let result = h.store.purchase(id).await;
        assert_purchase_failed(&result, PurchaseErrorCode::ProductUnavailable);
    }
    assert_eq!(h.platform.purchase_calls(), 0);
}

#[tokio::test]
async fn test_store_is_reusable_after_each_outcome() {
    let h = Harness::new();
    h.platform.push_purchase_outcome(Err(PlatformPurchaseFailure::new(
        PurchaseFailureReason::PaymentDeclined,
    )));

    assert!(h.store.purchase("coin100").await.is_err());
    assert!(h.store.purchase("coin100").await.is_ok());
    assert!(h.store.purchase("coin100").await.is_ok());

    let metrics = h.store.metrics();
    assert_eq!(metrics.purchases_initiated, 3);
    assert_eq!(metrics.purchases_completed, 2);
    assert_eq!(metrics.purchases_failed, 1);
    assert_eq!(metrics.purchases_in_flight(), 0);
}

#[tokio::test]
async fn test_marker_released_before_completion_event() {
    let h = Harness::new();
    let busy_at_completion = Arc::new(Mutex::new(Vec::new()));
    {
        let store = Arc::downgrade(&h.store);
        let seen = busy_at_completion.clone();
        h.store.subscribe(move |event| {
            if let (StoreEvent::PurchaseCompleted(_), Some(store)) = (event, store.upgrade()) {
                seen.lock().unwrap().push(store.is_busy());
            }
        });
    }

    h.store.purchase("coin100").await.unwrap();

    assert_eq!(*busy_at_completion.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn test_unsubscribed_observer_stops_receiving() {
    let h = Harness::new();
    let count = Arc::new(Mutex::new(0));
    let id = {
        let count = count.clone();
        h.store.subscribe(move |_| *count.lock().unwrap() += 1)
    };

    h.store.initialize().await.unwrap();
    assert!(h.store.unsubscribe(id));
    h.store.purchase("coin100").await.unwrap();

    assert_eq!(*count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_restored_purchase() {
    let h = Harness::new();
    h.store.initialize().await.unwrap();
    h.log.clear();

    // Restoration applies to owned products even when they are not for sale.
    let native = NativePurchase::new("tx-0").with_receipt("R0");
    let result = h.store.process_restored_purchase("no_ads", native).await;
    let purchase = assert_purchase_succeeded(&result);

    assert!(purchase.restored);
    assert!(purchase.transaction.as_ref().unwrap().restored);
    assert!(purchase.is_validated());
    assert_eq!(h.validator.validated_receipts(), vec!["R0".to_string()]);
    assert!(matches!(
        h.log.events().first(),
        Some(StoreEvent::PurchaseInitiated { restored: true, .. })
    ));
    assert_eq!(h.log.count(StoreEventKind::PurchaseCompleted), 1);
    assert_eq!(h.store.metrics().purchases_restored, 1);
}

#[tokio::test]
async fn test_restored_purchase_requires_initialization() {
    let h = Harness::new();

    let result = h
        .store
        .process_restored_purchase("coin100", coin100_purchase())
        .await;

    assert_purchase_failed(&result, PurchaseErrorCode::StoreInitializationFailed);
    assert_eq!(
        h.log.kinds(),
        vec![StoreEventKind::PurchaseInitiated, StoreEventKind::PurchaseFailed]
    );
    assert_eq!(h.platform.initialize_calls(), 0);
}

#[tokio::test]
async fn test_restored_purchase_with_empty_receipt() {
    let h = Harness::new();
    h.store.initialize().await.unwrap();

    let result = h
        .store
        .process_restored_purchase("coin100", NativePurchase::new("tx-0"))
        .await;

    assert_purchase_failed(&result, PurchaseErrorCode::ReceiptNullOrEmpty);
}
