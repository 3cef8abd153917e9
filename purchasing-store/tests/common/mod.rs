//! Shared harness for store service integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use purchasing_lib::test_utils::{MockPlatformStore, MockReceiptValidator, StaticConfigProvider};
use purchasing_lib::StoreServiceConfig;
use purchasing_store::{StoreEvent, StoreEventKind, StoreService};
use tracing_subscriber::EnvFilter;

/// Install a test log subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every event a store raises.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<StoreEvent>>>,
}

impl EventLog {
    pub fn attach(store: &StoreService) -> Self {
        let log = Self::default();
        let events = log.events.clone();
        store.subscribe(move |event| events.lock().unwrap().push(event.clone()));
        log
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<StoreEventKind> {
        self.events().iter().map(StoreEvent::kind).collect()
    }

    pub fn count(&self, kind: StoreEventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

/// A store service wired to scriptable collaborators.
pub struct Harness {
    pub store: Arc<StoreService>,
    pub platform: Arc<MockPlatformStore>,
    pub validator: Arc<MockReceiptValidator>,
    pub log: EventLog,
}

impl Harness {
    /// Store with the fixture catalog and a validator accepting every receipt.
    pub fn new() -> Self {
        Self::with_validator(MockReceiptValidator::ok())
    }

    pub fn with_validator(validator: MockReceiptValidator) -> Self {
        Self::build(StoreServiceConfig::default(), Some(validator))
    }

    pub fn without_validator(config: StoreServiceConfig) -> Self {
        Self::build(config, None)
    }

    fn build(config: StoreServiceConfig, validator: Option<MockReceiptValidator>) -> Self {
        init_tracing();
        let platform = Arc::new(MockPlatformStore::with_fixture_products());
        let attached = validator.is_some();
        let validator = Arc::new(validator.unwrap_or_else(MockReceiptValidator::ok));

        let mut store = StoreService::new(
            config,
            platform.clone(),
            Arc::new(StaticConfigProvider::fixtures()),
        );
        if attached {
            store = store.with_validator(validator.clone());
        }
        let log = EventLog::attach(&store);

        Self {
            store: Arc::new(store),
            platform,
            validator,
            log,
        }
    }
}
