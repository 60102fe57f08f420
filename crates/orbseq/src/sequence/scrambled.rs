use crate::{NumberSequence, OrbOfConfusion, Result, SequenceConfig};

/// Decorates a raw sequence so its ids come out in scrambled order.
///
/// Every raw id is fed through an [`OrbOfConfusion`] over
/// `[0, upper_bound)`. Because the transform is a bijection, the first
/// `upper_bound` raw ids `0..upper_bound` produce `upper_bound` distinct ids
/// that cover the same range. A raw id at or past the bound means the space
/// is used up and surfaces as [`Error::OutOfDomain`].
///
/// # Example
/// ```
/// use orbseq::{AtomicSequence, NumberSequence, ScrambledSequence, SequenceConfig};
///
/// let raw = AtomicSequence::new("coupons", 0)?;
/// let coupons = ScrambledSequence::from_config(raw, 1000, &SequenceConfig::default())?;
///
/// assert_eq!(coupons.sequence_name(), "coupons~scrambled(1000)");
/// let first = coupons.try_next_id()?;
/// assert_eq!(coupons.unscramble(first)?, 0);
/// # Ok::<(), orbseq::Error>(())
/// ```
///
/// [`Error::OutOfDomain`]: crate::Error::OutOfDomain
pub struct ScrambledSequence<Q> {
    inner: Q,
    orb: OrbOfConfusion,
}

impl<Q> ScrambledSequence<Q>
where
    Q: NumberSequence,
{
    /// Wraps `inner` with an already-built transform.
    pub fn new(inner: Q, orb: OrbOfConfusion) -> Self {
        Self { inner, orb }
    }

    /// Wraps `inner` with the transform over `[0, upper_bound)` selected by
    /// the partitions and seeds of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a bound [`OrbOfConfusion::new`]
    /// rejects.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn from_config(inner: Q, upper_bound: u64, config: &SequenceConfig) -> Result<Self> {
        let orb = OrbOfConfusion::new(upper_bound, &config.partitions, config.seed1, config.seed2)?;
        Ok(Self::new(inner, orb))
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    pub fn orb(&self) -> &OrbOfConfusion {
        &self.orb
    }

    pub fn upper_bound(&self) -> u64 {
        self.orb.upper_bound()
    }

    /// Recovers the raw id a scrambled id was issued from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `id` is not below the bound.
    ///
    /// [`Error::OutOfDomain`]: crate::Error::OutOfDomain
    pub fn unscramble(&self, id: u64) -> Result<u64> {
        self.orb.invert(id)
    }
}

impl<Q> NumberSequence for ScrambledSequence<Q>
where
    Q: NumberSequence,
{
    fn try_next_id(&self) -> Result<u64> {
        let raw = self.inner.try_next_id()?;
        self.orb.transform(raw)
    }

    fn sequence_name(&self) -> String {
        format!(
            "{}~scrambled({})",
            self.inner.sequence_name(),
            self.orb.upper_bound()
        )
    }
}

impl<Q> core::fmt::Debug for ScrambledSequence<Q>
where
    Q: NumberSequence,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrambledSequence")
            .field("name", &self.sequence_name())
            .field("upper_bound", &self.orb.upper_bound())
            .finish_non_exhaustive()
    }
}
