use std::sync::Arc;

use crate::Result;

/// A named source of unique ids.
///
/// Implementations are safe to share across threads. Raw sequences return
/// strictly increasing values; decorated ones (see [`ScrambledSequence`])
/// only promise uniqueness.
///
/// [`ScrambledSequence`]: crate::ScrambledSequence
pub trait NumberSequence: Send + Sync {
    /// Returns the next id.
    ///
    /// # Errors
    ///
    /// Propagates every failure of the underlying counter, allocator or
    /// transform. Only [`Error::is_retryable`] errors are worth retrying.
    ///
    /// [`Error::is_retryable`]: crate::Error::is_retryable
    fn try_next_id(&self) -> Result<u64>;

    /// A diagnostic name for the sequence. Decorators annotate the name of
    /// what they wrap; nothing should parse it.
    fn sequence_name(&self) -> String;
}

impl<Q> NumberSequence for Arc<Q>
where
    Q: NumberSequence + ?Sized,
{
    fn try_next_id(&self) -> Result<u64> {
        (**self).try_next_id()
    }

    fn sequence_name(&self) -> String {
        (**self).sequence_name()
    }
}

impl<Q> NumberSequence for Box<Q>
where
    Q: NumberSequence + ?Sized,
{
    fn try_next_id(&self) -> Result<u64> {
        (**self).try_next_id()
    }

    fn sequence_name(&self) -> String {
        (**self).sequence_name()
    }
}
