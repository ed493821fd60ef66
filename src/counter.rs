/// Anything that tallies events and can report a total.
///
/// Implemented by both [`BucketedCounter`](crate::BucketedCounter) and
/// [`RollingCounter`](crate::RollingCounter), so a rollover target can be
/// either.
pub trait Counter: Send + Sync + 'static {
    /// Adds `amount` to the counter at the current instant.
    fn increment_by(&self, amount: u64);

    /// Adds one.
    #[inline]
    fn increment(&self) {
        self.increment_by(1);
    }

    /// Total currently retained by the counter.
    fn total_count(&self) -> u64;
}

impl<C: Counter> Counter for std::sync::Arc<C> {
    #[inline]
    fn increment_by(&self, amount: u64) {
        (**self).increment_by(amount)
    }

    #[inline]
    fn total_count(&self) -> u64 {
        (**self).total_count()
    }
}
