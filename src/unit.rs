use std::fmt;

use serde::{Deserialize, Serialize};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// The granularity a tier buckets with and measures its maximum age in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds.
    const fn nanos(self) -> i128 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 60 * 60 * 1_000_000_000,
            TimeUnit::Days => 24 * 60 * 60 * 1_000_000_000,
        }
    }

    /// Converts a millisecond reading into this unit.
    ///
    /// Coarser units truncate toward zero; finer units saturate at the `i64`
    /// bounds.
    pub fn convert_millis(self, millis: i64) -> i64 {
        saturate(i128::from(millis) * NANOS_PER_MILLI / self.nanos())
    }

    /// Converts a value in this unit back into milliseconds, with the same
    /// truncation and saturation rules as [`TimeUnit::convert_millis`].
    pub fn to_millis(self, value: i64) -> i64 {
        saturate(i128::from(value) * self.nanos() / NANOS_PER_MILLI)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }
}

#[inline]
fn saturate(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::TimeUnit;

    #[test]
    fn coarser_units_truncate() {
        assert_eq!(TimeUnit::Seconds.convert_millis(61_999), 61);
        assert_eq!(TimeUnit::Minutes.convert_millis(59_999), 0);
        assert_eq!(TimeUnit::Minutes.convert_millis(60_000), 1);
        assert_eq!(TimeUnit::Hours.convert_millis(3_600_000 * 5 + 1), 5);
        assert_eq!(TimeUnit::Milliseconds.convert_millis(123), 123);
    }

    #[test]
    fn finer_units_multiply() {
        assert_eq!(TimeUnit::Microseconds.convert_millis(3), 3_000);
        assert_eq!(TimeUnit::Nanoseconds.convert_millis(3), 3_000_000);
        assert_eq!(TimeUnit::Nanoseconds.convert_millis(i64::MAX), i64::MAX);
    }

    #[test]
    fn back_to_millis() {
        assert_eq!(TimeUnit::Minutes.to_millis(10), 600_000);
        assert_eq!(TimeUnit::Days.to_millis(1), 86_400_000);
        assert_eq!(TimeUnit::Microseconds.to_millis(2_999), 2);
        assert_eq!(TimeUnit::Days.to_millis(i64::MAX), i64::MAX);
    }

    #[test]
    fn display_is_lowercase_plural() {
        assert_eq!(TimeUnit::Seconds.to_string(), "seconds");
        assert_eq!(TimeUnit::Days.to_string(), "days");
    }
}
