//! Rollup conservation: while every event is younger than the chain's
//! combined retention, no count leaves the chain.
//!
//! On aligned chains every tier's cutoff moves on an instant at which the tier
//! before it also retires a bucket, so the rolling total is exact after each
//! increment. On other chains a coarser tier may hold an aged-out bucket that
//! nothing has swept yet: the total can read low, but the held counts still
//! add up.

use proptest::prelude::*;
use rolling_counter::{ManualClock, RollingCounter, TierConfig, TimeUnit};

/// Tier chains where every bucket size divides the next one and every
/// `max_age` is a whole number of buckets, so each tier's cutoff moves on an
/// instant at which the tier before it also retires a bucket.
fn aligned_chain() -> impl Strategy<Value = Vec<TierConfig>> {
    (1u64..=3, 1u64..=5, prop::collection::vec((1u64..=4, 1u64..=4), 0..=3)).prop_map(
        |(base, base_age, coarser)| {
            let mut tiers = vec![TierConfig::new(TimeUnit::Seconds, base, base * base_age)];
            let mut size = base;
            for (factor, age) in coarser {
                size *= factor;
                tiers.push(TierConfig::new(TimeUnit::Seconds, size, size * age));
            }
            tiers
        },
    )
}

/// Any chain whose bucket sizes and retentions both strictly increase, plus
/// an increment interval no longer than the finest bucket.
fn increasing_chain() -> impl Strategy<Value = (Vec<TierConfig>, u64)> {
    (1u64..=3, 1u64..=6, prop::collection::vec((1u64..=4, 1u64..=8), 0..=3))
        .prop_flat_map(|(base, base_age, coarser)| {
            let mut tiers = vec![TierConfig::new(TimeUnit::Seconds, base, base_age)];
            let (mut size, mut age) = (base, base_age);
            for (grow, older) in coarser {
                size += grow;
                age += older;
                tiers.push(TierConfig::new(TimeUnit::Seconds, size, age));
            }
            (Just(tiers), 1..=base)
        })
}

proptest! {
    #[test]
    fn total_is_conserved_within_horizon(
        tiers in aligned_chain(),
        amounts in prop::collection::vec(0u64..=5, 1..400),
    ) {
        let clock = ManualClock::new(0);
        let counter = RollingCounter::new(clock.clone(), &tiers).unwrap();

        let step = tiers[0].bucket_size;
        let horizon: u64 = tiers.iter().map(|t| t.max_age).sum();
        let steps = (horizon / step + 1) as usize;

        let mut expected = 0u64;
        for (i, amount) in amounts.into_iter().take(steps).enumerate() {
            clock.set(i as u64 * step * 1_000);
            counter.increment_by(amount);
            expected += amount;
            prop_assert_eq!(counter.total_count(), expected, "step {}", i);
        }
        prop_assert_eq!(counter.dropped(), 0);
    }

    #[test]
    fn held_counts_are_conserved_on_any_chain(
        (tiers, step) in increasing_chain(),
        amounts in prop::collection::vec(0u64..=5, 1..400),
    ) {
        let clock = ManualClock::new(0);
        let counter = RollingCounter::new(clock.clone(), &tiers).unwrap();

        let horizon: u64 = tiers.iter().map(|t| t.max_age).sum();
        let steps = (horizon / step + 1) as usize;

        let mut expected = 0u64;
        for (i, amount) in amounts.into_iter().take(steps).enumerate() {
            clock.set(i as u64 * step * 1_000);
            counter.increment_by(amount);
            expected += amount;
            let held: u64 = counter.tiers().iter().map(|t| t.held_count()).sum();
            prop_assert_eq!(held, expected, "step {}", i);
            prop_assert!(counter.total_count() <= expected, "step {}", i);
        }
        prop_assert_eq!(counter.dropped(), 0);
    }
}
