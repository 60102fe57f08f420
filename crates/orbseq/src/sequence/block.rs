use std::sync::Arc;

use crate::{CounterStore, NumberSequence, Result, SequenceBlockCache, config::validate_name};

/// A named sequence served by a shared [`SequenceBlockCache`].
///
/// Many `BlockSequence`s can share one cache; each only ever touches the
/// block of its own name.
pub struct BlockSequence<S> {
    name: String,
    cache: Arc<SequenceBlockCache<S>>,
}

impl<S> BlockSequence<S>
where
    S: CounterStore,
{
    /// Binds `name` to `cache`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty name.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn new(name: impl Into<String>, cache: Arc<SequenceBlockCache<S>>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, cache })
    }

    pub fn cache(&self) -> &Arc<SequenceBlockCache<S>> {
        &self.cache
    }
}

impl<S> NumberSequence for BlockSequence<S>
where
    S: CounterStore,
{
    fn try_next_id(&self) -> Result<u64> {
        self.cache.next(&self.name)
    }

    fn sequence_name(&self) -> String {
        self.name.clone()
    }
}
