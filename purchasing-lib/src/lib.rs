//! Purchasing library.
//!
//! This crate stays stateless: it defines the value types a purchase flow
//! produces, the normalized error taxonomy, and the collaborator contracts a
//! store coordinator drives (configuration provider, platform store module,
//! receipt validator). The stateful coordination lives in `purchasing-store`.
//!
//! # Features
//!
//! - **Product Catalog**: immutable product lookup populated once per initialization
//! - **Error Taxonomy**: normalized initialize/purchase codes and deterministic
//!   mapping tables from platform failure reasons
//! - **Receipt Validation**: validation results, a per-store validator registry
//!   and a sandbox fallback combinator
//!
//! # Example
//!
//! ```
//! use purchasing_lib::{PurchaseErrorCode, PurchaseFailureReason};
//!
//! let code = PurchaseErrorCode::from(PurchaseFailureReason::UserCancelled);
//! assert_eq!(code, PurchaseErrorCode::UserCanceled);
//! assert!(!PurchaseErrorCode::DuplicateTransaction.is_retryable());
//! ```

pub mod catalog;
pub mod config;
pub mod errors;
pub mod platform;
pub mod prelude;
pub mod result;
pub mod transaction;
pub mod validation;

/// Test utilities for purchase flow testing.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::{Product, ProductCatalog, ProductDefinition, ProductMetadata, ProductType};
pub use config::StoreServiceConfig;
pub use errors::{
    BoxError, Cause, InitializationFailureReason, InitializeError, InitializeErrorCode,
    PlatformInitializeFailure, PlatformPurchaseFailure, PurchaseError, PurchaseErrorCode,
    PurchaseFailureReason, StoreError, ValidationError,
};
pub use platform::{PlatformStore, StoreConfig, StoreConfigProvider};
pub use result::PurchaseResult;
pub use transaction::{NativePurchase, StoreTransaction};
pub use validation::{
    PurchaseReceipt, ReceiptValidator, ReceiptValidatorRegistry, SandboxFallbackValidator,
    StoreEnvironment, ValidationResult,
};

/// Common result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Stable identifier of a product as configured by the application.
///
/// # Example
///
/// ```
/// use purchasing_lib::ProductId;
///
/// let id: ProductId = "coin100".into();
/// assert_eq!(id.as_str(), "coin100");
/// assert!(!id.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Create a new ProductId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
