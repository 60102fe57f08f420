use core::time::Duration;
use std::{collections::HashMap, sync::Arc};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CounterStore, Result, StoreConfig,
    config::{validate_block_size, validate_name},
    mutex::{RwLock, read, write},
    store::block_end,
};

#[cfg(feature = "cache-padded")]
type Counter = crossbeam_utils::CachePadded<AtomicU64>;
#[cfg(not(feature = "cache-padded"))]
type Counter = AtomicU64;

#[inline]
fn new_counter(origin: u64) -> Counter {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(AtomicU64::new(origin))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        AtomicU64::new(origin)
    }
}

/// A lock-free in-memory [`CounterStore`].
///
/// Each sequence owns an [`AtomicU64`] high-water mark advanced with a
/// compare-and-swap loop, so allocations for the same name never block each
/// other and allocations for different names never touch the same cache
/// line (with `cache-padded`). The name table itself sits behind a
/// read/write lock that is only taken for writing the first time a name is
/// seen.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Lock-free allocation for known sequences
/// - ❌ Durable: state is lost with the process
///
/// ## Recommended When
/// - Sequences live for the lifetime of one process
/// - Many threads refill blocks concurrently
///
/// ## See Also
/// - [`LockCounterStore`]
///
/// [`LockCounterStore`]: crate::LockCounterStore
#[derive(Default)]
pub struct AtomicCounterStore {
    origin: u64,
    counters: RwLock<HashMap<String, Arc<Counter>>>,
}

impl AtomicCounterStore {
    /// Creates an empty store whose sequences start at `config.origin`.
    ///
    /// # Example
    /// ```
    /// use orbseq::{AtomicCounterStore, CounterStore, StoreConfig};
    ///
    /// let store = AtomicCounterStore::new(StoreConfig::with_origin(1));
    /// assert_eq!(store.allocate_block("orders", 10, None)?, 1);
    /// assert_eq!(store.allocate_block("orders", 10, None)?, 11);
    /// assert_eq!(store.high_water_mark("orders")?, Some(21));
    /// # Ok::<(), orbseq::Error>(())
    /// ```
    pub fn new(config: StoreConfig) -> Self {
        Self {
            origin: config.origin,
            counters: RwLock::new(HashMap::new()),
        }
    }

    fn counter(&self, sequence: &str) -> Result<Arc<Counter>> {
        if let Some(counter) = read(&self.counters)?.get(sequence) {
            return Ok(Arc::clone(counter));
        }

        let mut counters = write(&self.counters)?;
        let counter = counters.entry(sequence.to_owned()).or_insert_with(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!(sequence, origin = self.origin, "registering counter");
            Arc::new(new_counter(self.origin))
        });
        Ok(Arc::clone(counter))
    }
}

impl CounterStore for AtomicCounterStore {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, _timeout)))]
    fn allocate_block(
        &self,
        sequence: &str,
        block_size: u64,
        _timeout: Option<Duration>,
    ) -> Result<u64> {
        validate_name(sequence)?;
        validate_block_size(block_size)?;
        let counter = self.counter(sequence)?;

        let mut current = counter.load(Ordering::Acquire);
        loop {
            let end = block_end(sequence, current, block_size)?;
            let swapped =
                counter.compare_exchange_weak(current, end, Ordering::AcqRel, Ordering::Acquire);
            match swapped {
                Ok(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(sequence, start = current, end, "reserved block");
                    return Ok(current);
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn high_water_mark(&self, sequence: &str) -> Result<Option<u64>> {
        Ok(read(&self.counters)?
            .get(sequence)
            .map(|counter| counter.load(Ordering::Acquire)))
    }
}
