//! Single-tier counter: tallies events into fixed-size time buckets and
//! retires buckets older than the configured maximum age.
//!
//! ## Bucket arithmetic
//!
//! With `now` the clock reading converted into the tier's unit:
//!
//! ```text
//! bucket index = floor(now / bucket_size)
//! cutoff index = floor((now - max_age) / bucket_size)
//! ```
//!
//! A bucket is live while its index is `>= cutoff`. `max_age` is measured in
//! the tier's unit, not in multiples of `bucket_size`.
//!
//! ## Expiry
//!
//! There is no background timer. Every `increment` ends with a sweep that
//! retires each bucket below the cutoff: the bucket is removed from the
//! store, then every subscribed listener is called with the bucket's start
//! time (milliseconds) and its count. After a long idle period a single
//! `increment` may therefore retire many buckets at once.
//!
//! `total_count` applies the cutoff test itself, so buckets that have aged
//! out but not yet been swept are never counted.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use log::{debug, log_enabled, trace, Level};
use parking_lot::RwLock;

use crate::clock::Clock;
use crate::config::TierConfig;
use crate::counter::Counter;
use crate::error::{Error, Result};
use crate::listener::{ExpiryListener, FnListener};
use crate::metrics::stats::{StatsCounter, TierMetrics};
use crate::store::sharded::ShardedStore;

/// Default number of store shards per tier.
pub const DEFAULT_SHARDS: usize = 16;

/// A counter over one `(unit, bucket_size, max_age)` configuration.
///
/// # Example
/// ```
/// use rolling_counter::clock::ManualClock;
/// use rolling_counter::{BucketedCounter, TierConfig, TimeUnit};
///
/// let clock = ManualClock::new(0);
/// let counter = BucketedCounter::new(TierConfig::new(TimeUnit::Seconds, 1, 60), clock.clone())
///     .unwrap();
/// counter.increment();
/// counter.increment_by(4);
/// assert_eq!(counter.total_count(), 5);
///
/// clock.set(120_000);
/// assert_eq!(counter.total_count(), 0);
/// ```
pub struct BucketedCounter {
    config: TierConfig,
    bucket_size: i64,
    max_age: i64,
    clock: Arc<dyn Clock>,
    store: ShardedStore,
    listeners: RwLock<Vec<Arc<dyn ExpiryListener>>>,
    /// Highest cutoff any sweep has claimed. A sweep only runs when the
    /// cutoff moves past it.
    swept_cutoff: AtomicI64,
    metrics: StatsCounter,
}

impl BucketedCounter {
    pub fn new<C: Clock>(config: TierConfig, clock: C) -> Result<Self> {
        Self::with_shards(config, clock, DEFAULT_SHARDS)
    }

    /// Like [`BucketedCounter::new`] with an explicit store shard count
    /// (must be a power of two).
    pub fn with_shards<C: Clock>(config: TierConfig, clock: C, num_shards: usize) -> Result<Self> {
        Self::from_shared_clock(config, Arc::new(clock), num_shards)
    }

    pub(crate) fn from_shared_clock(
        config: TierConfig,
        clock: Arc<dyn Clock>,
        num_shards: usize,
    ) -> Result<Self> {
        config.validate()?;
        if !num_shards.is_power_of_two() {
            return Err(Error::ShardCount(num_shards));
        }
        Ok(BucketedCounter {
            config,
            bucket_size: config.bucket_size as i64,
            max_age: config.max_age as i64,
            clock,
            store: ShardedStore::new(num_shards),
            listeners: RwLock::new(Vec::new()),
            swept_cutoff: AtomicI64::new(i64::MIN),
            metrics: StatsCounter::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Time helpers
    // -----------------------------------------------------------------------

    #[inline]
    fn now(&self) -> i64 {
        let millis = i64::try_from(self.clock.now_millis()).unwrap_or(i64::MAX);
        self.config.unit.convert_millis(millis)
    }

    #[inline]
    fn bucket_index(&self, now: i64) -> i64 {
        now.div_euclid(self.bucket_size)
    }

    #[inline]
    fn cutoff_index(&self, now: i64) -> i64 {
        now.saturating_sub(self.max_age).div_euclid(self.bucket_size)
    }

    #[inline]
    fn bucket_start_millis(&self, bucket: i64) -> i64 {
        self.config
            .unit
            .to_millis(bucket.saturating_mul(self.bucket_size))
    }

    // -----------------------------------------------------------------------
    // Counting
    // -----------------------------------------------------------------------

    /// Adds one to the current bucket, then sweeps expired buckets.
    #[inline]
    pub fn increment(&self) {
        self.increment_by(1);
    }

    /// Adds `amount` to the current bucket, then sweeps expired buckets.
    ///
    /// Listeners for any retired bucket run before this call returns.
    pub fn increment_by(&self, amount: u64) {
        let bucket = self.bucket_index(self.now());
        self.store.accumulate(bucket, amount);
        self.metrics.record_increment();
        // A sweep that claimed a cutoff past `bucket` between our clock read
        // and the add has already run; the late bucket is ours to retire.
        if bucket < self.swept_cutoff.load(Ordering::SeqCst) {
            self.retire(&[bucket]);
        }
        self.expire();
    }

    /// Sum of every bucket that is still within `max_age`.
    pub fn total_count(&self) -> u64 {
        let cutoff = self.cutoff_index(self.now());
        let count = self.store.sum_from(cutoff);
        if log_enabled!(Level::Debug) {
            debug!("{} has {} in {} buckets", self, count, self.store.len());
        }
        count
    }

    // -----------------------------------------------------------------------
    // Expiry
    // -----------------------------------------------------------------------

    /// Retires every bucket below the current cutoff.
    ///
    /// Each bucket is removed from the store before its listeners run; a
    /// bucket raced for by two sweeps is reported only by the one whose
    /// removal succeeded.
    fn expire(&self) {
        let cutoff = self.cutoff_index(self.now());
        if self.swept_cutoff.fetch_max(cutoff, Ordering::SeqCst) >= cutoff {
            return;
        }

        let expired = self.store.keys_below(cutoff);
        if !expired.is_empty() {
            self.retire(&expired);
        }
    }

    /// Removes each of `buckets` and notifies listeners for the ones this
    /// call actually removed.
    fn retire(&self, buckets: &[i64]) {
        // Snapshot so listeners run without the lock held.
        let listeners: Vec<Arc<dyn ExpiryListener>> = self.listeners.read().clone();
        for &bucket in buckets {
            let Some(count) = self.store.remove(bucket) else {
                continue;
            };
            let timestamp = self.bucket_start_millis(bucket);
            trace!("{} expiring {} at {}", self, count, timestamp);
            self.metrics.record_expiry(count);
            for listener in &listeners {
                listener.on_expire(timestamp, count);
            }
        }
    }

    /// Appends `listener`; listeners are called in subscription order.
    ///
    /// Safe to call while other threads increment. A sweep already in
    /// progress uses the list as it was when the sweep began.
    pub fn subscribe_expiry<L: ExpiryListener>(&self, listener: L) {
        self.subscribe_expiry_arc(Arc::new(listener));
    }

    pub fn subscribe_expiry_arc(&self, listener: Arc<dyn ExpiryListener>) {
        self.listeners.write().push(listener);
    }

    /// Appends a closure listener receiving `(timestamp_millis, count)`.
    pub fn subscribe_expiry_fn<F>(&self, f: F)
    where
        F: Fn(i64, u64) + Send + Sync + 'static,
    {
        self.subscribe_expiry(FnListener(f));
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    pub fn stats(&self) -> TierMetrics {
        self.metrics.snapshot()
    }

    /// Sum of every bucket physically held, including aged-out buckets that
    /// have not been swept yet.
    pub fn held_count(&self) -> u64 {
        self.store.sum_from(i64::MIN)
    }

    /// Number of buckets physically held, including aged-out buckets that
    /// have not been swept yet.
    pub fn bucket_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Counter for BucketedCounter {
    #[inline]
    fn increment_by(&self, amount: u64) {
        BucketedCounter::increment_by(self, amount)
    }

    #[inline]
    fn total_count(&self) -> u64 {
        BucketedCounter::total_count(self)
    }
}

impl fmt::Display for BucketedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BucketedCounter{}", self.config)
    }
}

impl fmt::Debug for BucketedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketedCounter")
            .field("config", &self.config)
            .field("buckets", &self.store.len())
            .field("listeners", &self.listener_count())
            .field("swept_cutoff", &self.swept_cutoff.load(Ordering::Relaxed))
            .finish()
    }
}
