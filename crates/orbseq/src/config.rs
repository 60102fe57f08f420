use core::time::Duration;

use crate::{Error, MAX_ID, Partitions, Result};

/// Default number of values reserved per store round-trip.
pub const DEFAULT_BLOCK_SIZE: u64 = 1000;

/// Default first seed of the scrambling permutation.
pub const DEFAULT_SEED1: u64 = 0x9E37_79B9_7F4A_7C15;

/// Default second seed of the scrambling permutation.
pub const DEFAULT_SEED2: u64 = 0xD1B5_4A32_D192_ED03;

/// Tuning shared by every sequence of a [`SequenceRegistry`].
///
/// The seeds and partitions select one permutation out of the
/// [`OrbOfConfusion`] family. Changing any of them after ids have been
/// handed out changes every future scrambled id, and may collide with ids
/// already issued.
///
/// With the `serde` feature enabled, missing fields fall back to their
/// defaults when deserializing.
///
/// # Example
/// ```
/// use core::time::Duration;
/// use orbseq::SequenceConfig;
///
/// let config = SequenceConfig::default()
///     .with_block_size(128)
///     .with_store_timeout(Duration::from_millis(250))
///     .with_seeds(7, 11);
/// assert!(config.validate().is_ok());
/// ```
///
/// [`SequenceRegistry`]: crate::SequenceRegistry
/// [`OrbOfConfusion`]: crate::OrbOfConfusion
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SequenceConfig {
    /// Values reserved per [`CounterStore::allocate_block`] call.
    ///
    /// [`CounterStore::allocate_block`]: crate::CounterStore::allocate_block
    pub block_size: u64,
    /// Upper bound on a single store round-trip. `None` waits indefinitely.
    pub store_timeout: Option<Duration>,
    /// Seed for the per-partition affine maps.
    pub seed1: u64,
    /// Seed for the cross-partition mixing rounds.
    pub seed2: u64,
    /// How the scrambling domain is sliced.
    pub partitions: Partitions,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            store_timeout: None,
            seed1: DEFAULT_SEED1,
            seed2: DEFAULT_SEED2,
            partitions: Partitions::default(),
        }
    }
}

impl SequenceConfig {
    #[must_use]
    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_seeds(mut self, seed1: u64, seed2: u64) -> Self {
        self.seed1 = seed1;
        self.seed2 = seed2;
        self
    }

    #[must_use]
    pub fn with_partitions(mut self, partitions: Partitions) -> Self {
        self.partitions = partitions;
        self
    }

    /// Checks the settings that cannot be enforced by their types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the block size is zero or larger
    /// than [`MAX_ID`].
    pub fn validate(&self) -> Result<()> {
        validate_block_size(self.block_size)
    }
}

/// Settings for the in-process counter stores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StoreConfig {
    /// First value handed out for a sequence the store has never seen.
    pub origin: u64,
}

impl StoreConfig {
    pub fn with_origin(origin: u64) -> Self {
        Self { origin }
    }
}

pub(crate) fn validate_block_size(block_size: u64) -> Result<()> {
    if block_size == 0 {
        return Err(Error::invalid_config("block size must be greater than 0"));
    }
    if block_size > MAX_ID {
        return Err(Error::invalid_config(format!(
            "block size {block_size} exceeds the id space (max = {MAX_ID})"
        )));
    }
    Ok(())
}

pub(crate) fn validate_name(sequence: &str) -> Result<()> {
    if sequence.is_empty() {
        return Err(Error::invalid_config("sequence name must not be empty"));
    }
    Ok(())
}
