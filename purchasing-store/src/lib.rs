//! Purchasing store service
//!
//! This crate coordinates store initialization and purchases on top of the
//! value types and collaborator contracts in `purchasing-lib`:
//!
//! - [`InitializationController`] runs one initialization at a time and lets
//!   concurrent callers join it
//! - [`PurchaseOrchestrator`] admits one purchase at a time and drives it
//!   through initialization, the native purchase and receipt validation
//! - [`StoreService`] is the facade composing both, with lifecycle
//!   notifications ([`StoreEvent`]) and counters ([`StoreMetrics`])
//!
//! Disposal resolves every pending call with `StoreDisposed`.

pub mod events;
pub mod initializer;
pub mod lifecycle;
pub mod metrics;
pub mod orchestrator;
pub mod service;

pub use events::{EventHub, StoreEvent, StoreEventKind, StoreObserver, SubscriptionId};
pub use initializer::InitializationController;
pub use lifecycle::DisposeSignal;
pub use metrics::{MetricsSnapshot, StoreMetrics};
pub use orchestrator::{OrchestratorState, PurchaseOrchestrator};
pub use service::StoreService;
