//! Multi-resolution rolling counters.
//!
//! A [`BucketedCounter`] tallies events into fixed-size time buckets and
//! retires buckets older than its maximum age, notifying subscribed
//! [`ExpiryListener`]s as it does. A [`RollingCounter`] chains several
//! bucketed tiers so that counts falling out of a fine-grained tier are
//! rolled into a coarser, longer-lived one: recent activity is tracked
//! precisely, older activity progressively coarsened.
//!
//! All work happens inside the calling thread; there is no background timer.
//! Time comes from a [`Clock`], which tests replace with a
//! [`ManualClock`](clock::ManualClock).

mod bucketed;
mod builder;
mod counter;
mod error;
mod metrics;
mod rolling;
mod store;
mod unit;
pub mod clock;
pub mod config;
pub mod listener;

pub use bucketed::{BucketedCounter, DEFAULT_SHARDS};
pub use builder::RollingCounterBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RollingConfig, TierConfig};
pub use counter::Counter;
pub use error::{Error, Result};
pub use listener::{ExpiryListener, FnListener, Rollover};
pub use metrics::stats::TierMetrics;
pub use rolling::RollingCounter;
pub use unit::TimeUnit;
