use core::time::Duration;
use std::sync::Arc;

use crate::{Error, Result};

/// Largest value any sequence may issue.
///
/// Every id fits a signed 64-bit integer, so hosts that store ids as `i64`
/// never see a negative one.
pub const MAX_ID: u64 = i64::MAX as u64;

/// The authority holding the high-water mark of every named sequence.
///
/// Implementations must make [`CounterStore::allocate_block`] atomic per
/// sequence name: a database row lock, an atomic integer, or a
/// compare-and-swap loop. The block allocator relies on that and never
/// reconstructs a counter value on its own.
pub trait CounterStore: Send + Sync {
    /// Reserves `block_size` fresh values for `sequence` and returns the first
    /// one. The reserved range is `[start, start + block_size)`.
    ///
    /// A sequence the store has never seen is created at the store's origin.
    /// `timeout` bounds the round-trip for stores that can block; in-memory
    /// stores may ignore it.
    ///
    /// # Errors
    ///
    /// - [`Error::CounterOverflow`] if the range would pass [`MAX_ID`]. The
    ///   counter is left untouched.
    /// - [`Error::StoreUnavailable`] / [`Error::StoreTimeout`] for transient
    ///   failures. The counter must not have moved.
    /// - [`Error::InvalidConfig`] for an empty name, or a `block_size` that is
    ///   zero or larger than [`MAX_ID`]. Nothing is registered.
    fn allocate_block(
        &self,
        sequence: &str,
        block_size: u64,
        timeout: Option<Duration>,
    ) -> Result<u64>;

    /// Returns the exclusive end of the last reserved block, or `None` if
    /// `sequence` has never been allocated from.
    ///
    /// Diagnostic only: the value may be stale by the time it is read.
    ///
    /// # Errors
    ///
    /// Same transient failures as [`CounterStore::allocate_block`].
    fn high_water_mark(&self, sequence: &str) -> Result<Option<u64>>;
}

impl<S> CounterStore for Arc<S>
where
    S: CounterStore + ?Sized,
{
    fn allocate_block(
        &self,
        sequence: &str,
        block_size: u64,
        timeout: Option<Duration>,
    ) -> Result<u64> {
        (**self).allocate_block(sequence, block_size, timeout)
    }

    fn high_water_mark(&self, sequence: &str) -> Result<Option<u64>> {
        (**self).high_water_mark(sequence)
    }
}

impl<S> CounterStore for &S
where
    S: CounterStore + ?Sized,
{
    fn allocate_block(
        &self,
        sequence: &str,
        block_size: u64,
        timeout: Option<Duration>,
    ) -> Result<u64> {
        (**self).allocate_block(sequence, block_size, timeout)
    }

    fn high_water_mark(&self, sequence: &str) -> Result<Option<u64>> {
        (**self).high_water_mark(sequence)
    }
}

/// Computes the end of the block starting at `start`, refusing to pass
/// [`MAX_ID`].
#[inline]
pub(crate) fn block_end(sequence: &str, start: u64, block_size: u64) -> Result<u64> {
    if block_size == 0 {
        return Err(Error::invalid_config("block size must be greater than 0"));
    }
    start
        .checked_add(block_size)
        .filter(|end| *end <= MAX_ID + 1)
        .ok_or_else(|| Error::overflow(sequence))
}
