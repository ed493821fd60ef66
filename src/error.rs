use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors reported when a counter is constructed.
///
/// Once built, counters never fail: every operation is total.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("bucket_size must be greater than 0")]
    ZeroBucketSize,
    #[error("max_age must be greater than 0")]
    ZeroMaxAge,
    #[error("{field} = {value} does not fit in a signed 64-bit bucket index")]
    OutOfRange { field: &'static str, value: u64 },
    #[error("a rolling counter needs at least one tier")]
    NoTiers,
    #[error("num_shards must be a power of two, got {0}")]
    ShardCount(usize),
}
