//! Expiry listener — a callback invoked whenever a bucket ages out of a tier.
//!
//! # Example
//! ```
//! use rolling_counter::clock::ManualClock;
//! use rolling_counter::{BucketedCounter, TierConfig, TimeUnit};
//! use std::sync::{Arc, Mutex};
//!
//! let clock = ManualClock::new(0);
//! let counter = BucketedCounter::new(TierConfig::new(TimeUnit::Seconds, 1, 60), clock.clone())
//!     .unwrap();
//!
//! let log: Arc<Mutex<Vec<(i64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
//! let log2 = Arc::clone(&log);
//! counter.subscribe_expiry_fn(move |timestamp, count| {
//!     log2.lock().unwrap().push((timestamp, count));
//! });
//!
//! counter.increment();
//! clock.set(61_000);
//! counter.increment(); // sweeps the bucket started at t=0
//! assert_eq!(*log.lock().unwrap(), vec![(0, 1)]);
//! ```

use crate::counter::Counter;

/// A callback invoked each time a bucket is retired.
///
/// The callback receives:
/// - the bucket's start time in milliseconds,
/// - the count accumulated in the bucket.
///
/// Listeners run synchronously inside the `increment` call that triggered
/// the sweep, on whichever thread made that call. No internal lock is held
/// while a listener runs, so it may call back into any counter.
pub trait ExpiryListener: Send + Sync + 'static {
    fn on_expire(&self, timestamp_millis: i64, count: u64);
}

/// An [`ExpiryListener`] backed by a closure.
///
/// Created via [`BucketedCounter::subscribe_expiry_fn`](crate::BucketedCounter::subscribe_expiry_fn).
pub struct FnListener<F>(pub F);

impl<F> ExpiryListener for FnListener<F>
where
    F: Fn(i64, u64) + Send + Sync + 'static,
{
    #[inline]
    fn on_expire(&self, timestamp_millis: i64, count: u64) {
        (self.0)(timestamp_millis, count)
    }
}

/// Rolls each retired count forward into `target` as a fresh increment.
///
/// The bucket's timestamp is discarded; the target buckets the count at the
/// current instant.
pub struct Rollover<C> {
    target: C,
}

impl<C: Counter> Rollover<C> {
    pub fn new(target: C) -> Self {
        Rollover { target }
    }
}

impl<C: Counter> ExpiryListener for Rollover<C> {
    #[inline]
    fn on_expire(&self, _timestamp_millis: i64, count: u64) {
        self.target.increment_by(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Tally(AtomicU64);

    impl Counter for Tally {
        fn increment_by(&self, amount: u64) {
            self.0.fetch_add(amount, Ordering::Relaxed);
        }

        fn total_count(&self) -> u64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn rollover_forwards_count() {
        let target = Arc::new(Tally::default());
        let rollover = Rollover::new(Arc::clone(&target));
        rollover.on_expire(1_000, 7);
        rollover.on_expire(2_000, 3);
        assert_eq!(target.total_count(), 10);
    }

    #[test]
    fn fn_listener_receives_arguments() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen2 = Arc::clone(&seen);
        let listener = FnListener(move |ts: i64, count: u64| {
            seen2.store(ts as u64 + count, Ordering::Relaxed);
        });
        listener.on_expire(40, 2);
        assert_eq!(seen.load(Ordering::Relaxed), 42);
    }
}
