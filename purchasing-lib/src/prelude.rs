//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use purchasing_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Core types: `ProductId`, `Product`, `ProductCatalog`, `PurchaseResult`
//! - Error types: `StoreError`, `PurchaseError`, `PurchaseErrorCode`, `Result`
//! - Collaborator traits: `PlatformStore`, `StoreConfigProvider`, `ReceiptValidator`

// Core types
pub use crate::catalog::{Product, ProductCatalog, ProductDefinition, ProductType};
pub use crate::result::PurchaseResult;
pub use crate::transaction::{NativePurchase, StoreTransaction};
pub use crate::ProductId;

// Error handling
pub use crate::errors::{
    InitializeError, InitializeErrorCode, PurchaseError, PurchaseErrorCode, StoreError,
};
pub use crate::Result;

// Collaborators
pub use crate::platform::{PlatformStore, StoreConfig, StoreConfigProvider};
pub use crate::validation::{ReceiptValidator, ValidationResult};

// Configuration
pub use crate::config::StoreServiceConfig;
