use std::sync::Arc;

use crate::bucketed::DEFAULT_SHARDS;
use crate::clock::{Clock, SystemClock};
use crate::config::TierConfig;
use crate::error::Result;
use crate::rolling::RollingCounter;
use crate::unit::TimeUnit;

/// Builder for configuring and constructing a [`RollingCounter`].
///
/// # Example
/// ```
/// use rolling_counter::{RollingCounter, TimeUnit};
///
/// let counter = RollingCounter::builder()
///     .tier(TimeUnit::Seconds, 1, 60)
///     .tier(TimeUnit::Minutes, 1, 4)
///     .tier(TimeUnit::Minutes, 5, 15)
///     .tier(TimeUnit::Minutes, 10, 40)
///     .build()
///     .unwrap();
/// counter.increment();
/// assert_eq!(counter.tier_count(), 4);
/// ```
pub struct RollingCounterBuilder {
    clock: Arc<dyn Clock>,
    tiers: Vec<TierConfig>,
    num_shards: usize,
}

impl RollingCounterBuilder {
    pub fn new() -> Self {
        RollingCounterBuilder {
            clock: Arc::new(SystemClock),
            tiers: Vec::new(),
            num_shards: DEFAULT_SHARDS,
        }
    }

    /// Set the time source shared by every tier (default: [`SystemClock`]).
    pub fn clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set the number of store shards per tier (must be a power of two;
    /// default: 16). Checked by [`build`](Self::build).
    pub fn num_shards(mut self, n: usize) -> Self {
        self.num_shards = n;
        self
    }

    /// Append a tier. Add tiers finest first.
    pub fn tier(self, unit: TimeUnit, bucket_size: u64, max_age: u64) -> Self {
        self.tier_config(TierConfig::new(unit, bucket_size, max_age))
    }

    pub fn tier_config(mut self, config: TierConfig) -> Self {
        self.tiers.push(config);
        self
    }

    pub fn tiers<I>(mut self, configs: I) -> Self
    where
        I: IntoIterator<Item = TierConfig>,
    {
        self.tiers.extend(configs);
        self
    }

    /// Validates every tier and wires the chain.
    pub fn build(self) -> Result<RollingCounter> {
        RollingCounter::from_parts(self.clock, &self.tiers, self.num_shards)
    }
}

impl Default for RollingCounterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
