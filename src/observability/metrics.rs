//! Registry counters
//!
//! - Counters only, monotonic
//! - Reset only when the registry is created

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one registry
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Declarations stored, replacements included
    declarations_registered: AtomicU64,
    /// Registrations that overwrote an existing declaration
    declarations_replaced: AtomicU64,
    /// Registrations refused by validation or the duplicate policy
    declarations_rejected: AtomicU64,
    /// Subscriber invocations that returned Ok
    notifications_delivered: AtomicU64,
    /// Subscriber invocations that returned Err
    subscriber_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_registered(&self) {
        self.declarations_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_replaced(&self) {
        self.declarations_replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.declarations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_delivered(&self, count: u64) {
        self.notifications_delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_subscriber_failures(&self, count: u64) {
        self.subscriber_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            declarations_registered: self.declarations_registered.load(Ordering::Relaxed),
            declarations_replaced: self.declarations_replaced.load(Ordering::Relaxed),
            declarations_rejected: self.declarations_rejected.load(Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
            subscriber_failures: self.subscriber_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters.
///
/// Serializes as a flat object of named counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub declarations_registered: u64,
    pub declarations_replaced: u64,
    pub declarations_rejected: u64,
    pub notifications_delivered: u64,
    pub subscriber_failures: u64,
}
