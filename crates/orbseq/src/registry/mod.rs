use std::{collections::HashMap, sync::Arc};

use crate::{
    BlockSequence, CounterStore, Error, NumberSequence, OrbOfConfusion, Result,
    ScrambledSequence, SequenceBlockCache, SequenceConfig,
    config::validate_name,
    mutex::{RwLock, read, write},
};


/// A scrambled view over a registry-owned [`BlockSequence`].
pub type ScrambledBlockSequence<S> = ScrambledSequence<Arc<BlockSequence<S>>>;

/// Hands out named sequences backed by one [`SequenceBlockCache`].
///
/// Sequences are created on first access and live as long as the registry.
/// The registry is a plain value: build one per configuration and pass it
/// (or an `Arc` of it) to whatever needs ids. Two registries never share
/// state unless they share a store.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use orbseq::{LockCounterStore, SequenceConfig, SequenceRegistry};
///
/// let store = Arc::new(LockCounterStore::default());
/// let registry = SequenceRegistry::new(Arc::clone(&store), SequenceConfig::default())?;
///
/// assert_eq!(registry.next_id("invoices")?, 0);
/// assert_eq!(registry.next_id("invoices")?, 1);
/// assert_eq!(registry.next_id("refunds")?, 0);
///
/// let scrambled = registry.next_scrambled_id("vouchers", 10_000)?;
/// assert!(scrambled < 10_000);
/// assert_eq!(registry.names()?, ["invoices", "refunds", "vouchers"]);
/// # Ok::<(), orbseq::Error>(())
/// ```
pub struct SequenceRegistry<S> {
    cache: Arc<SequenceBlockCache<S>>,
    config: SequenceConfig,
    sequences: RwLock<HashMap<String, Arc<BlockSequence<S>>>>,
    scrambled: RwLock<HashMap<String, Arc<ScrambledBlockSequence<S>>>>,
}

impl<S> SequenceRegistry<S>
where
    S: CounterStore,
{
    /// Creates an empty registry over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(store: S, config: SequenceConfig) -> Result<Self> {
        let cache = SequenceBlockCache::with_config(store, &config)?;
        Ok(Self {
            cache: Arc::new(cache),
            config,
            sequences: RwLock::new(HashMap::new()),
            scrambled: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SequenceBlockCache<S>> {
        &self.cache
    }

    /// Returns the raw sequence named `name`, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty name.
    pub fn sequence(&self, name: &str) -> Result<Arc<BlockSequence<S>>> {
        validate_name(name)?;
        if let Some(sequence) = read(&self.sequences)?.get(name) {
            return Ok(Arc::clone(sequence));
        }

        let mut sequences = write(&self.sequences)?;
        if let Some(sequence) = sequences.get(name) {
            return Ok(Arc::clone(sequence));
        }
        let sequence = Arc::new(BlockSequence::new(name, Arc::clone(&self.cache))?);
        sequences.insert(name.to_owned(), Arc::clone(&sequence));

        #[cfg(feature = "tracing")]
        tracing::debug!(sequence = name, "registered sequence");
        Ok(sequence)
    }

    /// Returns the scrambled sequence named `name` over `[0, upper_bound)`,
    /// creating it on first access.
    ///
    /// The scrambled sequence draws its raw ids from [`Self::sequence`] of the
    /// same name, so mixing raw and scrambled calls for one name never hands
    /// out the same raw id twice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty name, a bound the
    /// transform rejects, or a bound different from the one `name` was first
    /// declared with.
    pub fn scrambled(
        &self,
        name: &str,
        upper_bound: u64,
    ) -> Result<Arc<ScrambledBlockSequence<S>>> {
        validate_name(name)?;
        if let Some(sequence) = read(&self.scrambled)?.get(name) {
            return Self::same_bound(name, sequence, upper_bound);
        }

        let mut scrambled = write(&self.scrambled)?;
        if let Some(sequence) = scrambled.get(name) {
            return Self::same_bound(name, sequence, upper_bound);
        }
        // A rejected bound must not leave the raw sequence registered.
        let orb = OrbOfConfusion::new(
            upper_bound,
            &self.config.partitions,
            self.config.seed1,
            self.config.seed2,
        )?;
        let raw = self.sequence(name)?;
        let sequence = Arc::new(ScrambledSequence::new(raw, orb));
        scrambled.insert(name.to_owned(), Arc::clone(&sequence));

        #[cfg(feature = "tracing")]
        tracing::debug!(sequence = name, upper_bound, "registered scrambled sequence");
        Ok(sequence)
    }

    /// Shortcut for `self.sequence(name)?.try_next_id()`.
    ///
    /// # Errors
    ///
    /// See [`Self::sequence`] and [`SequenceBlockCache::next`].
    pub fn next_id(&self, name: &str) -> Result<u64> {
        self.sequence(name)?.try_next_id()
    }

    /// Shortcut for `self.scrambled(name, upper_bound)?.try_next_id()`.
    ///
    /// # Errors
    ///
    /// See [`Self::scrambled`] and [`SequenceBlockCache::next`], plus
    /// [`Error::OutOfDomain`] once the bounded space is used up.
    pub fn next_scrambled_id(&self, name: &str, upper_bound: u64) -> Result<u64> {
        self.scrambled(name, upper_bound)?.try_next_id()
    }

    /// Names of every sequence created so far, sorted.
    ///
    /// # Errors
    ///
    /// Only fails when a lock is poisoned.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = read(&self.sequences)?.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }

    fn same_bound(
        name: &str,
        sequence: &Arc<ScrambledBlockSequence<S>>,
        upper_bound: u64,
    ) -> Result<Arc<ScrambledBlockSequence<S>>> {
        if sequence.upper_bound() != upper_bound {
            return Err(Error::invalid_config(format!(
                "sequence `{name}` is scrambled over [0, {}), not [0, {upper_bound})",
                sequence.upper_bound()
            )));
        }
        Ok(Arc::clone(sequence))
    }
}
