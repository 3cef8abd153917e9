//! Error types for store operations.
//!
//! Platform store modules report failures with their own reason enums. Those
//! are never surfaced directly: every failure is normalized onto
//! [`InitializeErrorCode`] or [`PurchaseErrorCode`] through the mapping tables
//! below, and the raw platform failure is kept only as an attached cause.

use crate::result::PurchaseResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared, clonable underlying cause of a failure.
///
/// Initialization outcomes are observed by every joiner and by event
/// subscribers, so causes are reference counted rather than boxed.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Boxed error returned by collaborators that have no error type of their own.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Normalized initialization error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitializeErrorCode {
    /// Catch-all for unrecognized initialization problems.
    Unknown,
    /// The store was disposed while initialization was pending.
    StoreDisposed,
    /// In-app purchases are disabled on the device.
    PurchasingUnavailable,
    /// None of the configured products are available for purchase.
    NoProductsAvailable,
    /// The store does not know this application.
    AppNotKnown,
}

impl InitializeErrorCode {
    /// Stable textual name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::StoreDisposed => "StoreDisposed",
            Self::PurchasingUnavailable => "PurchasingUnavailable",
            Self::NoProductsAvailable => "NoProductsAvailable",
            Self::AppNotKnown => "AppNotKnown",
        }
    }
}

impl fmt::Display for InitializeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized purchase error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseErrorCode {
    /// Catch-all for unrecognized purchase problems.
    Unknown,
    /// The store was disposed while the purchase was pending.
    StoreDisposed,
    /// The system purchasing feature is unavailable.
    PurchasingUnavailable,
    /// A purchase was already in progress when a new one was requested.
    ExistingPurchasePending,
    /// The product is unknown or not currently purchasable.
    ProductUnavailable,
    /// Signature validation of the purchase receipt failed.
    SignatureInvalid,
    /// The user cancelled the purchase.
    UserCanceled,
    /// The payment was declined.
    PaymentDeclined,
    /// The transaction was already completed.
    DuplicateTransaction,
    /// The purchase receipt is missing or empty.
    ReceiptNullOrEmpty,
    /// The validation service rejected the receipt.
    ReceiptValidationFailed,
    /// No validation service is available for the receipt.
    ReceiptValidationNotAvailable,
    /// The store could not be initialized.
    StoreInitializationFailed,
    /// The request arguments were invalid.
    InvalidArgument,
}

impl PurchaseErrorCode {
    /// Stable textual name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::StoreDisposed => "StoreDisposed",
            Self::PurchasingUnavailable => "PurchasingUnavailable",
            Self::ExistingPurchasePending => "ExistingPurchasePending",
            Self::ProductUnavailable => "ProductUnavailable",
            Self::SignatureInvalid => "SignatureInvalid",
            Self::UserCanceled => "UserCanceled",
            Self::PaymentDeclined => "PaymentDeclined",
            Self::DuplicateTransaction => "DuplicateTransaction",
            Self::ReceiptNullOrEmpty => "ReceiptNullOrEmpty",
            Self::ReceiptValidationFailed => "ReceiptValidationFailed",
            Self::ReceiptValidationNotAvailable => "ReceiptValidationNotAvailable",
            Self::StoreInitializationFailed => "StoreInitializationFailed",
            Self::InvalidArgument => "InvalidArgument",
        }
    }

    /// Returns true if the code is reported before any state change.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::ExistingPurchasePending)
    }

    /// Returns true if issuing a new purchase later may succeed.
    ///
    /// Nothing is retried automatically; this only classifies the failure
    /// for the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unknown
                | Self::PurchasingUnavailable
                | Self::ExistingPurchasePending
                | Self::StoreInitializationFailed
        )
    }
}

impl fmt::Display for PurchaseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initialization failure reasons reported by a platform store module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitializationFailureReason {
    /// In-app purchases are disabled in device settings.
    PurchasingUnavailable,
    /// No products are available for purchase.
    NoProductsAvailable,
    /// The store reported the app as unknown.
    AppNotKnown,
    /// A platform-specific reason with no normalized counterpart.
    Other(String),
}

impl fmt::Display for InitializationFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PurchasingUnavailable => f.write_str("PurchasingUnavailable"),
            Self::NoProductsAvailable => f.write_str("NoProductsAvailable"),
            Self::AppNotKnown => f.write_str("AppNotKnown"),
            Self::Other(raw) => write!(f, "Other({})", raw),
        }
    }
}

impl From<&InitializationFailureReason> for InitializeErrorCode {
    fn from(reason: &InitializationFailureReason) -> Self {
        match reason {
            InitializationFailureReason::PurchasingUnavailable => Self::PurchasingUnavailable,
            InitializationFailureReason::NoProductsAvailable => Self::NoProductsAvailable,
            InitializationFailureReason::AppNotKnown => Self::AppNotKnown,
            InitializationFailureReason::Other(_) => Self::Unknown,
        }
    }
}

impl From<InitializationFailureReason> for InitializeErrorCode {
    fn from(reason: InitializationFailureReason) -> Self {
        Self::from(&reason)
    }
}

/// Purchase failure reasons reported by a platform store module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseFailureReason {
    /// The platform could not classify the failure.
    Unknown,
    /// The system purchasing feature is unavailable.
    PurchasingUnavailable,
    /// The platform already has a purchase in progress.
    ExistingPurchasePending,
    /// The product is not available on the store.
    ProductUnavailable,
    /// Receipt signature validation failed on the device.
    SignatureInvalid,
    /// The user cancelled the purchase.
    UserCancelled,
    /// There was a problem with the payment.
    PaymentDeclined,
    /// The transaction duplicates one that already succeeded.
    DuplicateTransaction,
    /// The transaction was already completed and consumed.
    AlreadyCompleted,
    /// A platform-specific reason with no normalized counterpart.
    Other(String),
}

impl fmt::Display for PurchaseFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(raw) => write!(f, "Other({})", raw),
            other => write!(f, "{:?}", other),
        }
    }
}

impl From<&PurchaseFailureReason> for PurchaseErrorCode {
    fn from(reason: &PurchaseFailureReason) -> Self {
        match reason {
            PurchaseFailureReason::Unknown => Self::Unknown,
            PurchaseFailureReason::PurchasingUnavailable => Self::PurchasingUnavailable,
            PurchaseFailureReason::ExistingPurchasePending => Self::ExistingPurchasePending,
            PurchaseFailureReason::ProductUnavailable => Self::ProductUnavailable,
            PurchaseFailureReason::SignatureInvalid => Self::SignatureInvalid,
            PurchaseFailureReason::UserCancelled => Self::UserCanceled,
            PurchaseFailureReason::PaymentDeclined => Self::PaymentDeclined,
            // Both are terminal: the purchase must not be reported as a success.
            PurchaseFailureReason::DuplicateTransaction
            | PurchaseFailureReason::AlreadyCompleted => Self::DuplicateTransaction,
            PurchaseFailureReason::Other(_) => Self::Unknown,
        }
    }
}

impl From<PurchaseFailureReason> for PurchaseErrorCode {
    fn from(reason: PurchaseFailureReason) -> Self {
        Self::from(&reason)
    }
}

/// Initialization failure delivered by a platform store module.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("platform initialization failed: {reason}{}", fmt_message(.message))]
pub struct PlatformInitializeFailure {
    /// Platform reason.
    pub reason: InitializationFailureReason,
    /// Raw diagnostic message, if the platform supplied one.
    pub message: Option<String>,
}

impl PlatformInitializeFailure {
    pub fn new(reason: InitializationFailureReason) -> Self {
        Self {
            reason,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Purchase failure delivered by a platform store module.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("platform purchase failed: {reason}{}", fmt_message(.message))]
pub struct PlatformPurchaseFailure {
    /// Platform reason.
    pub reason: PurchaseFailureReason,
    /// Raw diagnostic message, if the platform supplied one.
    pub message: Option<String>,
}

impl PlatformPurchaseFailure {
    pub fn new(reason: PurchaseFailureReason) -> Self {
        Self {
            reason,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn fmt_message(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default()
}

/// Errors reported by a receipt validation service.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("validation service error: {0}")]
    Service(String),
    #[error("malformed validation response: {0}")]
    Response(String),
}

/// A normalized store initialization failure.
#[derive(thiserror::Error, Debug, Clone)]
#[error("store initialization failed: {code}")]
pub struct InitializeError {
    /// Normalized failure code.
    pub code: InitializeErrorCode,
    /// Underlying cause, if any.
    #[source]
    pub cause: Option<Cause>,
}

impl InitializeError {
    pub fn new(code: InitializeErrorCode) -> Self {
        Self { code, cause: None }
    }

    pub fn with_cause(code: InitializeErrorCode, cause: Cause) -> Self {
        Self {
            code,
            cause: Some(cause),
        }
    }

    /// Normalize a platform initialization failure.
    pub fn from_platform(failure: PlatformInitializeFailure) -> Self {
        Self::with_cause(InitializeErrorCode::from(&failure.reason), Arc::new(failure))
    }

    /// Initialization was interrupted by disposal.
    pub fn disposed() -> Self {
        Self::new(InitializeErrorCode::StoreDisposed)
    }
}

/// A normalized purchase failure.
///
/// Carries the partial [`PurchaseResult`] reached before the failure, so the
/// transaction and validation result stay available for diagnostics.
#[derive(thiserror::Error, Debug, Clone)]
#[error("purchase of '{}' failed: {code}", .result.product_id)]
pub struct PurchaseError {
    /// Normalized failure code.
    pub code: PurchaseErrorCode,
    /// What was known about the purchase when it failed.
    pub result: Box<PurchaseResult>,
    /// Underlying cause, if any.
    #[source]
    pub cause: Option<Cause>,
}

impl PurchaseError {
    pub fn new(code: PurchaseErrorCode, result: PurchaseResult) -> Self {
        Self {
            code,
            result: Box::new(result),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Normalize a platform purchase failure.
    pub fn from_platform(failure: PlatformPurchaseFailure, result: PurchaseResult) -> Self {
        Self::new(PurchaseErrorCode::from(&failure.reason), result).with_cause(Arc::new(failure))
    }

    /// Returns true if the user cancelled the purchase.
    pub fn is_canceled(&self) -> bool {
        self.code == PurchaseErrorCode::UserCanceled
    }
}

/// Errors surfaced by a store service.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoreError {
    /// The service was used after disposal.
    #[error("{0} has been disposed")]
    ObjectDisposed(String),
    #[error(transparent)]
    Initialize(#[from] InitializeError),
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}

impl StoreError {
    /// Purchase code, if this is a purchase failure.
    pub fn purchase_code(&self) -> Option<PurchaseErrorCode> {
        match self {
            Self::Purchase(e) => Some(e.code),
            _ => None,
        }
    }

    /// Initialization code, if this is an initialization failure.
    pub fn initialize_code(&self) -> Option<InitializeErrorCode> {
        match self {
            Self::Initialize(e) => Some(e.code),
            _ => None,
        }
    }

    /// Returns true if the service was already disposed.
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::ObjectDisposed(_))
    }
}
