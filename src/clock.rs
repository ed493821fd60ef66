//! Time sources.
//!
//! Counters never read the system clock directly; every tier asks its
//! [`Clock`] for the current instant in milliseconds. Swap in a
//! [`ManualClock`] to drive a counter through simulated time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current instant as milliseconds since a fixed epoch.
///
/// Readings must be monotonically non-decreasing. A clock that moves
/// backwards is not detected: buckets may then fail to expire, be recreated
/// after removal, or have their counts attributed twice.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> u64;
}

impl<C: Clock> Clock for Arc<C> {
    #[inline]
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// A clock that reports whatever instant it was last told.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the counter under test.
///
/// # Example
/// ```
/// use rolling_counter::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(0);
/// let handle = clock.clone();
/// handle.advance(1_500);
/// assert_eq!(clock.now_millis(), 1_500);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(millis: u64) -> Self {
        ManualClock {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Moves the clock to `millis`.
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::Release);
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(10);
        let other = clock.clone();
        other.set(42);
        assert_eq!(clock.now_millis(), 42);
        clock.advance(8);
        assert_eq!(other.now_millis(), 50);
    }

    #[test]
    fn arc_clock_delegates() {
        let clock = Arc::new(ManualClock::new(7));
        assert_eq!(Clock::now_millis(&clock), 7);
    }

    #[test]
    fn system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
