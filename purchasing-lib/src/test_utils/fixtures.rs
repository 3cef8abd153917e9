//! Test fixtures for common purchase scenarios.

use crate::catalog::{Product, ProductDefinition, ProductMetadata, ProductType};
use crate::platform::StoreConfig;

/// Collection of commonly used identifiers.
pub struct TestFixtures;

impl TestFixtures {
    pub const STORE_ID: &'static str = "TestStore";
    pub const COIN100: &'static str = "coin100";
    pub const NO_ADS: &'static str = "no_ads";
    /// Configured but never reported by the fixture platform.
    pub const SEASON_PASS: &'static str = "season_pass";
    pub const TRANSACTION_ID: &'static str = "tx-1";
    pub const RECEIPT: &'static str = "R1";
}

/// 100 coins, consumable and available.
pub fn coin100() -> Product {
    Product::new(
        ProductDefinition::new(TestFixtures::COIN100, ProductType::Consumable),
        ProductMetadata {
            localized_title: "100 Coins".into(),
            localized_description: "A small pile of coins".into(),
            localized_price_string: "$0.99".into(),
            iso_currency_code: "USD".into(),
        },
    )
}

/// Ad removal, non-consumable and currently not purchasable.
pub fn no_ads() -> Product {
    Product::new(
        ProductDefinition::new(TestFixtures::NO_ADS, ProductType::NonConsumable),
        ProductMetadata {
            localized_title: "No Ads".into(),
            localized_description: "Removes all advertisements".into(),
            localized_price_string: "$2.99".into(),
            iso_currency_code: "USD".into(),
        },
    )
    .with_availability(false)
}

/// Products reported by the fixture platform.
pub fn fixture_products() -> Vec<Product> {
    vec![coin100(), no_ads()]
}

/// Configuration naming every fixture product plus one the platform omits.
pub fn fixture_store_config() -> StoreConfig {
    StoreConfig::new(vec![
        coin100().definition,
        no_ads().definition,
        ProductDefinition::new(TestFixtures::SEASON_PASS, ProductType::Subscription),
    ])
}
