use core::time::Duration;
use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CounterStore, Result, StoreConfig,
    config::{validate_block_size, validate_name},
    mutex::{Mutex, MutexGuard, lock},
    store::block_end,
};

/// A lock-based in-memory [`CounterStore`].
///
/// Every sequence lives in one map behind a single mutex, so each
/// read-increment-write is trivially atomic. This is the closest in-process
/// stand-in for a store backed by a database row lock.
///
/// With the `parking-lot` feature the caller's timeout is honored while
/// waiting for the mutex and surfaces as [`Error::StoreTimeout`]; with std
/// mutexes the timeout is ignored.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Honors store timeouts (`parking-lot`)
/// - ❌ Durable: state is lost with the process
///
/// ## Recommended When
/// - Few sequences, or refills are rare (large blocks)
/// - You want timeout behavior that mirrors a remote store
///
/// ## See Also
/// - [`AtomicCounterStore`]
///
/// [`Error::StoreTimeout`]: crate::Error::StoreTimeout
/// [`AtomicCounterStore`]: crate::AtomicCounterStore
#[derive(Default)]
pub struct LockCounterStore {
    origin: u64,
    #[cfg(feature = "cache-padded")]
    counters: crossbeam_utils::CachePadded<Mutex<HashMap<String, u64>>>,
    #[cfg(not(feature = "cache-padded"))]
    counters: Mutex<HashMap<String, u64>>,
}

impl LockCounterStore {
    /// Creates an empty store whose sequences start at `config.origin`.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            origin: config.origin,
            #[cfg(feature = "cache-padded")]
            counters: crossbeam_utils::CachePadded::new(Mutex::new(HashMap::new())),
            #[cfg(not(feature = "cache-padded"))]
            counters: Mutex::new(HashMap::new()),
        }
    }

    fn lock_counters(
        &self,
        sequence: &str,
        timeout: Option<Duration>,
    ) -> Result<MutexGuard<'_, HashMap<String, u64>>> {
        #[cfg(feature = "parking-lot")]
        if let Some(timeout) = timeout {
            return self
                .counters
                .try_lock_for(timeout)
                .ok_or_else(|| crate::Error::StoreTimeout {
                    sequence: sequence.to_owned(),
                    timeout,
                });
        }
        #[cfg(not(feature = "parking-lot"))]
        let _ = (sequence, timeout);

        lock(&self.counters)
    }
}

impl CounterStore for LockCounterStore {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn allocate_block(
        &self,
        sequence: &str,
        block_size: u64,
        timeout: Option<Duration>,
    ) -> Result<u64> {
        validate_name(sequence)?;
        validate_block_size(block_size)?;
        let mut counters = self.lock_counters(sequence, timeout)?;

        let start = counters.get(sequence).copied().unwrap_or(self.origin);
        let end = block_end(sequence, start, block_size)?;
        counters.insert(sequence.to_owned(), end);

        #[cfg(feature = "tracing")]
        tracing::trace!(sequence, start, end, "reserved block");
        Ok(start)
    }

    fn high_water_mark(&self, sequence: &str) -> Result<Option<u64>> {
        Ok(lock(&self.counters)?.get(sequence).copied())
    }
}
