//! Per-dispatcher counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one dispatcher instance.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    registrations: AtomicU64,
    removals: AtomicU64,
    publishes: AtomicU64,
    deliveries: AtomicU64,
    empty_publishes: AtomicU64,
}

/// Point-in-time copy of [`DispatchMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Successful registrations.
    pub registrations: u64,
    /// Subscription records removed by `off`.
    pub removals: u64,
    /// Calls to `emit`.
    pub publishes: u64,
    /// Callback invocations across all publishes.
    pub deliveries: u64,
    /// Publishes that reached no callback.
    pub empty_publishes: u64,
}

impl DispatchMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one registration.
    pub fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record removed subscription records.
    pub fn record_removals(&self, count: usize) {
        self.removals.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a publish and how many callbacks it reached.
    pub fn record_publish(&self, delivered: usize) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        if delivered == 0 {
            self.empty_publishes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take a snapshot of the current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            empty_publishes: self.empty_publishes.load(Ordering::Relaxed),
        }
    }
}
