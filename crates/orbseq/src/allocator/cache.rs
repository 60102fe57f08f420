use core::time::Duration;
use std::{collections::HashMap, sync::Arc};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Block, CounterStore, Error, Result, SequenceConfig,
    config::{validate_block_size, validate_name},
    mutex::{Mutex, RwLock, lock, read, write},
};

#[cfg(feature = "cache-padded")]
type Slot = crossbeam_utils::CachePadded<Mutex<Block>>;
#[cfg(not(feature = "cache-padded"))]
type Slot = Mutex<Block>;

#[inline]
fn new_slot() -> Slot {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(Mutex::new(Block::EMPTY))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        Mutex::new(Block::EMPTY)
    }
}

/// Serves sequence values out of blocks reserved from a [`CounterStore`].
///
/// Each sequence name gets its own lock around its current [`Block`]. Callers
/// of the same name serialize on that lock, including the occasional store
/// round-trip when the block runs dry; callers of different names never
/// contend beyond a read lock on the name table.
///
/// Values for one name are strictly increasing across all callers and never
/// repeat, even across cache instances sharing a store: a new cache starts
/// with an empty block and reserves past whatever the store already handed
/// out. The unused tail of a block is lost when the cache is dropped.
///
/// # Example
/// ```
/// use orbseq::{AtomicCounterStore, CounterStore, SequenceBlockCache};
///
/// let cache = SequenceBlockCache::new(AtomicCounterStore::default(), 100)?;
/// assert_eq!(cache.next("orders")?, 0);
/// assert_eq!(cache.next("orders")?, 1);
/// assert_eq!(cache.remaining("orders")?, 98);
///
/// // One store round-trip reserved the whole first block.
/// assert_eq!(cache.store().high_water_mark("orders")?, Some(100));
/// # Ok::<(), orbseq::Error>(())
/// ```
pub struct SequenceBlockCache<S> {
    store: S,
    block_size: u64,
    store_timeout: Option<Duration>,
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl<S> SequenceBlockCache<S>
where
    S: CounterStore,
{
    /// Creates a cache reserving `block_size` values per store round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `block_size` is zero.
    pub fn new(store: S, block_size: u64) -> Result<Self> {
        validate_block_size(block_size)?;
        Ok(Self {
            store,
            block_size,
            store_timeout: None,
            slots: RwLock::new(HashMap::new()),
        })
    }

    /// Creates a cache using the block size and store timeout of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn with_config(store: S, config: &SequenceConfig) -> Result<Self> {
        config.validate()?;
        let mut cache = Self::new(store, config.block_size)?;
        cache.store_timeout = config.store_timeout;
        Ok(cache)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Returns the next value of `sequence`.
    ///
    /// Refills the sequence's block from the store first if it is exhausted.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for an empty name.
    /// - Any error from [`CounterStore::allocate_block`]. The block is left
    ///   as it was, so retrying after a transient failure is always safe.
    pub fn next(&self, sequence: &str) -> Result<u64> {
        validate_name(sequence)?;
        let slot = self.slot(sequence)?;
        let mut block = lock(&slot)?;

        if block.is_exhausted() {
            *block = self.refill(sequence)?;
        }
        Ok(block.take())
    }

    /// Returns how many reserved values are left in the in-memory block of
    /// `sequence`, or 0 if it has none.
    ///
    /// # Errors
    ///
    /// Only fails when a lock is poisoned.
    pub fn remaining(&self, sequence: &str) -> Result<u64> {
        let Some(slot) = read(&self.slots)?.get(sequence).cloned() else {
            return Ok(0);
        };
        Ok(lock(&slot)?.remaining())
    }

    /// Drops the in-memory block of `sequence` and returns how many values
    /// were forfeited.
    ///
    /// This is what an unclean restart does implicitly. Forfeited values are
    /// never handed out; the next call to [`SequenceBlockCache::next`]
    /// reserves a fresh block.
    ///
    /// # Errors
    ///
    /// Only fails when a lock is poisoned.
    pub fn forfeit(&self, sequence: &str) -> Result<u64> {
        let Some(slot) = read(&self.slots)?.get(sequence).cloned() else {
            return Ok(0);
        };
        let mut block = lock(&slot)?;
        let lost = block.remaining();
        *block = Block::EMPTY;

        #[cfg(feature = "tracing")]
        tracing::debug!(sequence, lost, "forfeited block");
        Ok(lost)
    }

    fn slot(&self, sequence: &str) -> Result<Arc<Slot>> {
        if let Some(slot) = read(&self.slots)?.get(sequence) {
            return Ok(Arc::clone(slot));
        }

        let mut slots = write(&self.slots)?;
        let slot = slots
            .entry(sequence.to_owned())
            .or_insert_with(|| Arc::new(new_slot()));
        Ok(Arc::clone(slot))
    }

    #[cold]
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(block_size = self.block_size))
    )]
    fn refill(&self, sequence: &str) -> Result<Block> {
        let start = self
            .store
            .allocate_block(sequence, self.block_size, self.store_timeout)?;
        let end = start
            .checked_add(self.block_size)
            .ok_or_else(|| Error::overflow(sequence))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(start, end, "refilled block");
        Ok(Block::new(start, end))
    }
}
