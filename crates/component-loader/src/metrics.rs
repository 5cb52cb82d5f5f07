//! Lifecycle counters for the component loader
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = loader.metrics();
//! assert_eq!(snapshot.live_instances(), loader.live_count() as u64);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the loader as it runs.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    /// Completed scans
    pub scans: AtomicU64,
    /// Instances constructed
    pub instances_created: AtomicU64,
    /// Instances destroyed
    pub instances_destroyed: AtomicU64,
    /// Publish calls, delivered or not
    pub publishes: AtomicU64,
    /// Publish calls on a topic nobody subscribed to
    pub publishes_dropped: AtomicU64,
    /// Renders postponed because the node was hidden
    pub renders_deferred: AtomicU64,
}

impl LoaderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished scan
    pub fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_created(&self) {
        self.instances_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_destroyed(&self) {
        self.instances_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a publish call
    ///
    /// # Arguments
    /// * `delivered` - Whether the topic was known
    pub fn record_publish(&self, delivered: bool) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
        if !delivered {
            self.publishes_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_render_deferred(&self) {
        self.renders_deferred.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scans: self.scans.load(Ordering::Relaxed),
            instances_created: self.instances_created.load(Ordering::Relaxed),
            instances_destroyed: self.instances_destroyed.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            publishes_dropped: self.publishes_dropped.load(Ordering::Relaxed),
            renders_deferred: self.renders_deferred.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.scans.store(0, Ordering::Relaxed);
        self.instances_created.store(0, Ordering::Relaxed);
        self.instances_destroyed.store(0, Ordering::Relaxed);
        self.publishes.store(0, Ordering::Relaxed);
        self.publishes_dropped.store(0, Ordering::Relaxed);
        self.renders_deferred.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub scans: u64,
    pub instances_created: u64,
    pub instances_destroyed: u64,
    pub publishes: u64,
    pub publishes_dropped: u64,
    pub renders_deferred: u64,
}

impl MetricsSnapshot {
    /// Instances constructed and not yet destroyed.
    #[must_use]
    pub fn live_instances(&self) -> u64 {
        self.instances_created.saturating_sub(self.instances_destroyed)
    }
}
