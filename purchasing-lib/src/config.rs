//! Store service configuration.

use serde::{Deserialize, Serialize};

/// Base name of a store service, used in logs and disposal errors.
pub const DEFAULT_SERVICE_NAME: &str = "Purchasing";

/// Configuration for a store service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreServiceConfig {
    /// Optional name distinguishing this service from others.
    pub name: Option<String>,
    /// Fail purchases whose receipt cannot be validated because no validation
    /// service is available. When unset that condition is only an advisory.
    pub require_receipt_validation: bool,
}

impl StoreServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_required_validation(mut self, required: bool) -> Self {
        self.require_receipt_validation = required;
        self
    }

    /// `"Purchasing"`, or `"Purchasing.<name>"` when a name is set.
    pub fn service_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{}.{}", DEFAULT_SERVICE_NAME, name),
            _ => DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
