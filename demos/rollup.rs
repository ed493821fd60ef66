//! Drives a four-tier rolling counter through two simulated hours of bursty
//! traffic and prints what each tier holds every ten minutes.
//!
//! Run with:
//!     cargo run --example rollup

use rolling_counter::{ManualClock, RollingCounter, TimeUnit};

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;

fn main() -> rolling_counter::Result<()> {
    let clock = ManualClock::new(0);
    let counter = RollingCounter::builder()
        .clock(clock.clone())
        .tier(TimeUnit::Seconds, 1, 60)
        .tier(TimeUnit::Minutes, 1, 4)
        .tier(TimeUnit::Minutes, 5, 15)
        .tier(TimeUnit::Minutes, 10, 40)
        .build()?;

    let mut sent = 0u64;
    for ms in (0..120 * MINUTE).step_by(100) {
        clock.set(ms);
        // Quiet for 30s out of every minute, busier on odd minutes.
        let second_of_minute = (ms / SECOND) % 60;
        if second_of_minute < 30 {
            let amount = if (ms / MINUTE) % 2 == 1 { 3 } else { 1 };
            counter.increment_by(amount);
            sent += amount;
        }

        if ms % (10 * MINUTE) == 0 && ms > 0 {
            let per_tier: Vec<u64> = counter.tiers().iter().map(|t| t.total_count()).collect();
            println!(
                "t={:>3}m sent={:>6} total={:>6} dropped={:>6} tiers={:?}",
                ms / MINUTE,
                sent,
                counter.total_count(),
                counter.dropped(),
                per_tier
            );
        }
    }

    for (tier, stats) in counter.tiers().iter().zip(counter.stats()) {
        println!("{tier}: {stats:?}");
    }
    Ok(())
}
