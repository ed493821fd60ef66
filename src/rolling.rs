//! Multi-resolution rolling counter.
//!
//! A chain of [`BucketedCounter`] tiers, finest first. Each tier's expiry
//! listener feeds the next tier's `increment`, so counts that age out of a
//! fine-grained tier are rolled into a coarser, longer-lived one. Counts
//! retired from the last tier are dropped.
//!
//! ```text
//! increment ──▶ tier 0 ──expire──▶ tier 1 ──expire──▶ … ──expire──▶ (dropped)
//! ```

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::bucketed::{BucketedCounter, DEFAULT_SHARDS};
use crate::builder::RollingCounterBuilder;
use crate::clock::Clock;
use crate::config::{RollingConfig, TierConfig};
use crate::counter::Counter;
use crate::error::{Error, Result};
use crate::listener::Rollover;
use crate::metrics::stats::TierMetrics;

/// Shared interior of a [`RollingCounter`].
struct Inner {
    /// Never empty.
    tiers: Vec<Arc<BucketedCounter>>,
}

/// A rolling counter made of chained bucketed tiers.
///
/// `total_count` is the sum of every tier's `total_count`. A count is held by
/// exactly one tier at a time: rollup happens only when a tier retires a
/// bucket, after removing it, so no two tiers ever report the same count. Aged-out buckets that no increment has swept
/// yet are excluded by their tier and not yet counted by the next one, so the
/// total can briefly read low between increments.
///
/// # Example
/// ```
/// use rolling_counter::clock::ManualClock;
/// use rolling_counter::{RollingCounter, TimeUnit};
///
/// let clock = ManualClock::new(0);
/// let counter = RollingCounter::builder()
///     .clock(clock.clone())
///     .tier(TimeUnit::Seconds, 1, 60)
///     .tier(TimeUnit::Minutes, 1, 10)
///     .build()
///     .unwrap();
///
/// counter.increment();
/// clock.set(90_000);
/// counter.increment(); // rolls the first count into the minutes tier
/// assert_eq!(counter.total_count(), 2);
/// assert_eq!(counter.tiers()[1].total_count(), 1);
/// ```
pub struct RollingCounter {
    inner: Arc<Inner>,
}

impl Clone for RollingCounter {
    fn clone(&self) -> Self {
        RollingCounter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl RollingCounter {
    /// Builds a counter from `tiers`, finest first.
    pub fn new<C: Clock>(clock: C, tiers: &[TierConfig]) -> Result<Self> {
        Self::from_parts(Arc::new(clock), tiers, DEFAULT_SHARDS)
    }

    /// Builds a counter from a deserialized [`RollingConfig`].
    pub fn from_config<C: Clock>(clock: C, config: &RollingConfig) -> Result<Self> {
        config.validate()?;
        Self::new(clock, &config.tiers)
    }

    /// Returns a [`RollingCounterBuilder`] for constructing a new counter.
    pub fn builder() -> RollingCounterBuilder {
        RollingCounterBuilder::new()
    }

    pub(crate) fn from_parts(
        clock: Arc<dyn Clock>,
        configs: &[TierConfig],
        num_shards: usize,
    ) -> Result<Self> {
        if configs.is_empty() {
            return Err(Error::NoTiers);
        }
        let tiers = configs
            .iter()
            .map(|config| {
                BucketedCounter::from_shared_clock(*config, Arc::clone(&clock), num_shards)
                    .map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;

        // Each tier rolls into the next; the last tier's expirations are dropped.
        for pair in tiers.windows(2) {
            pair[0].subscribe_expiry(Rollover::new(Arc::clone(&pair[1])));
            debug!("wired {} into {}", pair[0], pair[1]);
        }

        Ok(RollingCounter {
            inner: Arc::new(Inner { tiers }),
        })
    }

    #[inline]
    pub fn increment(&self) {
        self.increment_by(1);
    }

    /// Adds `amount` to the first tier.
    ///
    /// A single-tier counter counts normally; its expirations are dropped.
    pub fn increment_by(&self, amount: u64) {
        self.inner.tiers[0].increment_by(amount);
    }

    /// Sum of every tier's `total_count`.
    pub fn total_count(&self) -> u64 {
        self.inner
            .tiers
            .iter()
            .fold(0u64, |acc, tier| acc.saturating_add(tier.total_count()))
    }

    /// The tiers, finest first.
    pub fn tiers(&self) -> &[Arc<BucketedCounter>] {
        &self.inner.tiers
    }

    pub fn tier_count(&self) -> usize {
        self.inner.tiers.len()
    }

    /// Per-tier statistics, finest first.
    pub fn stats(&self) -> Vec<TierMetrics> {
        self.inner.tiers.iter().map(|tier| tier.stats()).collect()
    }

    /// Total count retired from the last tier and lost.
    pub fn dropped(&self) -> u64 {
        self.inner
            .tiers
            .last()
            .map_or(0, |tier| tier.stats().expired_count)
    }
}

impl Counter for RollingCounter {
    #[inline]
    fn increment_by(&self, amount: u64) {
        RollingCounter::increment_by(self, amount)
    }

    #[inline]
    fn total_count(&self) -> u64 {
        RollingCounter::total_count(self)
    }
}

impl fmt::Debug for RollingCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingCounter")
            .field("tiers", &self.inner.tiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::unit::TimeUnit;

    #[test]
    fn empty_chain_is_rejected() {
        let err = RollingCounter::new(ManualClock::new(0), &[]).unwrap_err();
        assert_eq!(err, Error::NoTiers);
    }

    #[test]
    fn invalid_tier_is_rejected() {
        let err = RollingCounter::new(
            ManualClock::new(0),
            &[
                TierConfig::new(TimeUnit::Seconds, 1, 60),
                TierConfig::new(TimeUnit::Minutes, 1, 0),
            ],
        )
        .unwrap_err();
        assert_eq!(err, Error::ZeroMaxAge);
    }

    #[test]
    fn deserialized_config_is_validated() {
        let empty = RollingConfig { tiers: Vec::new() };
        let err = RollingCounter::from_config(ManualClock::new(0), &empty).unwrap_err();
        assert_eq!(err, Error::NoTiers);

        let huge = RollingConfig {
            tiers: vec![TierConfig::new(TimeUnit::Seconds, u64::MAX, 60)],
        };
        let err = RollingCounter::from_config(ManualClock::new(0), &huge).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { field: "bucket_size", .. }));
    }

    #[test]
    fn tiers_are_wired_in_order() {
        let counter = RollingCounter::new(
            ManualClock::new(0),
            &[
                TierConfig::new(TimeUnit::Seconds, 1, 60),
                TierConfig::new(TimeUnit::Minutes, 1, 4),
                TierConfig::new(TimeUnit::Minutes, 5, 15),
            ],
        )
        .unwrap();
        let listeners: Vec<usize> = counter.tiers().iter().map(|t| t.listener_count()).collect();
        assert_eq!(listeners, vec![1, 1, 0]);
    }

    #[test]
    fn single_tier_counts_and_drops() {
        let clock = ManualClock::new(0);
        let counter =
            RollingCounter::new(clock.clone(), &[TierConfig::new(TimeUnit::Seconds, 1, 5)])
                .unwrap();
        counter.increment_by(3);
        assert_eq!(counter.total_count(), 3);

        clock.set(10_000);
        counter.increment();
        assert_eq!(counter.total_count(), 1);
        assert_eq!(counter.dropped(), 3);
    }

    #[test]
    fn counts_move_between_tiers() {
        let clock = ManualClock::new(0);
        let counter = RollingCounter::new(
            clock.clone(),
            &[
                TierConfig::new(TimeUnit::Seconds, 1, 2),
                TierConfig::new(TimeUnit::Seconds, 10, 20),
            ],
        )
        .unwrap();

        counter.increment_by(5);
        clock.set(3_000);
        counter.increment();

        let tiers = counter.tiers();
        assert_eq!(tiers[0].total_count(), 1);
        assert_eq!(tiers[1].total_count(), 5);
        assert_eq!(counter.total_count(), 6);
        assert_eq!(counter.stats()[0].expired_count, 5);
        assert_eq!(counter.dropped(), 0);
    }

    #[test]
    fn clones_share_state() {
        let clock = ManualClock::new(0);
        let a = RollingCounter::new(clock, &[TierConfig::new(TimeUnit::Seconds, 1, 60)]).unwrap();
        let b = a.clone();
        a.increment();
        b.increment();
        assert_eq!(a.total_count(), 2);
    }
}
