//! Tier configuration.
//!
//! A [`TierConfig`] describes one bucketed tier; a [`RollingConfig`] is the
//! ordered chain of tiers a [`RollingCounter`](crate::RollingCounter) is
//! built from, highest fidelity first. Both deserialize from any serde
//! format:
//!
//! ```
//! use rolling_counter::config::RollingConfig;
//!
//! let json = r#"{ "tiers": [
//!     { "unit": "seconds", "bucket_size": 1, "max_age": 60 },
//!     { "unit": "minutes", "bucket_size": 1, "max_age": 4 }
//! ] }"#;
//! let config: RollingConfig = serde_json::from_str(json).unwrap();
//! assert_eq!(config.tiers.len(), 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::unit::TimeUnit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    /// Unit for both bucketing and `max_age`.
    pub unit: TimeUnit,
    /// Time covered by one bucket, in `unit`.
    pub bucket_size: u64,
    /// Retention horizon, in `unit` (not in multiples of `bucket_size`).
    pub max_age: u64,
}

impl TierConfig {
    pub const fn new(unit: TimeUnit, bucket_size: u64, max_age: u64) -> Self {
        TierConfig {
            unit,
            bucket_size,
            max_age,
        }
    }

    /// Checks that both sizes are positive and fit the signed bucket
    /// arithmetic.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_size == 0 {
            return Err(Error::ZeroBucketSize);
        }
        if self.max_age == 0 {
            return Err(Error::ZeroMaxAge);
        }
        check_range("bucket_size", self.bucket_size)?;
        check_range("max_age", self.max_age)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::OutOfRange { field, value })
}

impl fmt::Display for TierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(unit: {}, size: {}, age: {})",
            self.unit, self.bucket_size, self.max_age
        )
    }
}

/// An ordered tier chain, finest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollingConfig {
    pub tiers: Vec<TierConfig>,
}

impl RollingConfig {
    /// Validates every tier and rejects an empty chain.
    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(Error::NoTiers);
        }
        self.tiers.iter().try_for_each(TierConfig::validate)
    }
}
