//! Counters for store activity.
//!
//! # Example
//!
//! ```rust
//! use purchasing_store::metrics::StoreMetrics;
//!
//! let metrics = StoreMetrics::new();
//! metrics.record_purchase_initiated();
//! metrics.record_purchase_completed();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.purchase_success_rate(), 1.0);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Store activity counters.
///
/// Thread-safe via atomic operations.
#[derive(Debug)]
pub struct StoreMetrics {
    // Initialization
    initialize_attempts: AtomicU64,
    initialize_successes: AtomicU64,
    initialize_failures: AtomicU64,

    // Purchases
    purchases_initiated: AtomicU64,
    purchases_completed: AtomicU64,
    purchases_failed: AtomicU64,
    purchases_rejected: AtomicU64,
    purchases_restored: AtomicU64,

    // Validation
    receipts_validated: AtomicU64,
    validation_failures: AtomicU64,
    validation_unavailable: AtomicU64,

    start_time: Instant,
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self {
            initialize_attempts: AtomicU64::new(0),
            initialize_successes: AtomicU64::new(0),
            initialize_failures: AtomicU64::new(0),
            purchases_initiated: AtomicU64::new(0),
            purchases_completed: AtomicU64::new(0),
            purchases_failed: AtomicU64::new(0),
            purchases_rejected: AtomicU64::new(0),
            purchases_restored: AtomicU64::new(0),
            receipts_validated: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            validation_unavailable: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    // === Initialization ===

    /// Record a native initialization attempt. Joiners are not counted.
    pub fn record_initialize_attempt(&self) {
        self.initialize_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_initialize_success(&self) {
        self.initialize_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_initialize_failure(&self) {
        self.initialize_failures.fetch_add(1, Ordering::Relaxed);
    }

    // === Purchases ===

    pub fn record_purchase_initiated(&self) {
        self.purchases_initiated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purchase_completed(&self) {
        self.purchases_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purchase_failed(&self) {
        self.purchases_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a purchase rejected by a precondition check.
    pub fn record_purchase_rejected(&self) {
        self.purchases_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purchase_restored(&self) {
        self.purchases_restored.fetch_add(1, Ordering::Relaxed);
    }

    // === Validation ===

    pub fn record_receipt_validated(&self) {
        self.receipts_validated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_unavailable(&self) {
        self.validation_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    // === Snapshot ===

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),

            initialize_attempts: self.initialize_attempts.load(Ordering::Relaxed),
            initialize_successes: self.initialize_successes.load(Ordering::Relaxed),
            initialize_failures: self.initialize_failures.load(Ordering::Relaxed),

            purchases_initiated: self.purchases_initiated.load(Ordering::Relaxed),
            purchases_completed: self.purchases_completed.load(Ordering::Relaxed),
            purchases_failed: self.purchases_failed.load(Ordering::Relaxed),
            purchases_rejected: self.purchases_rejected.load(Ordering::Relaxed),
            purchases_restored: self.purchases_restored.load(Ordering::Relaxed),

            receipts_validated: self.receipts_validated.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            validation_unavailable: self.validation_unavailable.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.initialize_attempts.store(0, Ordering::Relaxed);
        self.initialize_successes.store(0, Ordering::Relaxed);
        self.initialize_failures.store(0, Ordering::Relaxed);

        self.purchases_initiated.store(0, Ordering::Relaxed);
        self.purchases_completed.store(0, Ordering::Relaxed);
        self.purchases_failed.store(0, Ordering::Relaxed);
        self.purchases_rejected.store(0, Ordering::Relaxed);
        self.purchases_restored.store(0, Ordering::Relaxed);

        self.receipts_validated.store(0, Ordering::Relaxed);
        self.validation_failures.store(0, Ordering::Relaxed);
        self.validation_unavailable.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of all counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Seconds since the counters were created.
    pub uptime_secs: u64,

    pub initialize_attempts: u64,
    pub initialize_successes: u64,
    pub initialize_failures: u64,

    pub purchases_initiated: u64,
    pub purchases_completed: u64,
    pub purchases_failed: u64,
    pub purchases_rejected: u64,
    pub purchases_restored: u64,

    pub receipts_validated: u64,
    pub validation_failures: u64,
    pub validation_unavailable: u64,
}

impl MetricsSnapshot {
    /// Fraction of finished purchases that completed (0.0 to 1.0).
    pub fn purchase_success_rate(&self) -> f64 {
        let finished = self.purchases_completed + self.purchases_failed;
        if finished == 0 {
            return 1.0;
        }
        self.purchases_completed as f64 / finished as f64
    }

    /// Purchases initiated but not yet finished.
    pub fn purchases_in_flight(&self) -> u64 {
        self.purchases_initiated
            .saturating_sub(self.purchases_completed + self.purchases_failed)
    }

    /// Format as JSON for logging/monitoring.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
