//! Test utilities for purchase flow testing.
//!
//! This module provides scriptable collaborators and fixtures:
//! - A mock platform store with gated calls, scripted outcomes and observable
//!   call counters
//! - A static configuration provider
//! - A mock receipt validator
//! - Assertion helpers for purchase results
//!
//! ## Usage
//!
//! ```rust,ignore
//! use purchasing_lib::test_utils::{MockPlatformStore, StaticConfigProvider, TestFixtures};
//!
//! let platform = MockPlatformStore::with_fixture_products();
//! platform.hold_purchases();
//! // start a purchase, then:
//! platform.wait_for_purchase_calls(1).await;
//! platform.release_purchases();
//! ```

mod assertions;
mod fixtures;
mod mock_platform;
mod mock_validator;

pub use assertions::{assert_purchase_failed, assert_purchase_succeeded};
pub use fixtures::{coin100, fixture_products, fixture_store_config, no_ads, TestFixtures};
pub use mock_platform::{Gate, MockPlatformStore, StaticConfigProvider};
pub use mock_validator::MockReceiptValidator;
