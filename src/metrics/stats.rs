use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated by every tier operation.
pub struct StatsCounter {
    increments: AtomicU64,
    expired_buckets: AtomicU64,
    expired_count: AtomicU64,
}

impl StatsCounter {
    pub fn new() -> Self {
        StatsCounter {
            increments: AtomicU64::new(0),
            expired_buckets: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_increment(&self) {
        self.increments.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_expiry(&self, count: u64) {
        self.expired_buckets.fetch_add(1, Ordering::Relaxed);
        self.expired_count.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of the statistics.
    pub fn snapshot(&self) -> TierMetrics {
        TierMetrics {
            increments: self.increments.load(Ordering::Relaxed),
            expired_buckets: self.expired_buckets.load(Ordering::Relaxed),
            expired_count: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for StatsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of one tier's statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierMetrics {
    /// Number of `increment` calls the tier has received.
    pub increments: u64,
    /// Number of buckets retired by expiry sweeps.
    pub expired_buckets: u64,
    /// Sum of the counts carried by those buckets.
    pub expired_count: u64,
}
