use portable_atomic::{AtomicU64, Ordering};

use crate::{Error, MAX_ID, NumberSequence, Result, config::validate_name};

/// A raw in-process counter: no store, no blocks.
///
/// Values start at `origin` and increase by one per call until [`MAX_ID`].
/// Nothing survives the process, so this suits tests and ids that only need
/// to be unique within one run.
#[derive(Debug)]
pub struct AtomicSequence {
    name: String,
    #[cfg(feature = "cache-padded")]
    next: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    next: AtomicU64,
}

impl AtomicSequence {
    /// Creates a counter named `name` whose first id is `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty name.
    pub fn new(name: impl Into<String>, origin: u64) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            #[cfg(feature = "cache-padded")]
            next: crossbeam_utils::CachePadded::new(AtomicU64::new(origin)),
            #[cfg(not(feature = "cache-padded"))]
            next: AtomicU64::new(origin),
        })
    }
}

impl NumberSequence for AtomicSequence {
    fn try_next_id(&self) -> Result<u64> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next <= MAX_ID).then_some(next + 1)
            })
            .map_err(|_| Error::overflow(&self.name))
    }

    fn sequence_name(&self) -> String {
        self.name.clone()
    }
}
