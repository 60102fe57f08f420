use core::time::Duration;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `orbseq` can emit.
///
/// Every error is returned synchronously to the caller. Only the store
/// variants are worth retrying; see [`Error::is_retryable`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A parameter was rejected at construction or call time: a zero or
    /// oversized bound, malformed partitions, an empty sequence name, a zero
    /// block size, or a scrambled sequence re-declared with another bound.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the rejected parameter.
        reason: String,
    },

    /// A value handed to the bijection lies outside `[0, upper_bound)`.
    ///
    /// Signed inputs are carried as-is so negative values show up in the
    /// message.
    #[error("value {value} is outside the domain [0, {upper_bound})")]
    OutOfDomain {
        /// The rejected input.
        value: i128,
        /// The exclusive bound of the domain.
        upper_bound: u64,
    },

    /// The next allocation for `sequence` would pass [`MAX_ID`].
    ///
    /// [`MAX_ID`]: crate::MAX_ID
    #[error("sequence `{sequence}` exhausted the id space")]
    CounterOverflow {
        /// Name of the exhausted sequence.
        sequence: String,
    },

    /// The counter store could not be reached. Safe to retry.
    #[error("counter store unavailable for `{sequence}`: {reason}")]
    StoreUnavailable {
        /// Sequence whose block was being reserved.
        sequence: String,
        /// Store-specific detail.
        reason: String,
    },

    /// The counter store did not answer within the caller's timeout. Safe to
    /// retry: stores never apply partial increments.
    #[error("counter store timed out after {timeout:?} for `{sequence}`")]
    StoreTimeout {
        /// Sequence whose block was being reserved.
        sequence: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A thread panicked while holding one of the crate's locks.
    ///
    /// With the `parking-lot` feature mutexes do not poison, so this variant
    /// does not exist.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` for transient store failures, where retrying the same
    /// call can neither duplicate nor skip a value.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::StoreTimeout { .. }
        )
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_domain(value: impl Into<i128>, upper_bound: u64) -> Self {
        Self::OutOfDomain {
            value: value.into(),
            upper_bound,
        }
    }

    pub(crate) fn overflow(sequence: &str) -> Self {
        Self::CounterOverflow {
            sequence: sequence.to_owned(),
        }
    }
}

#[cfg(not(feature = "parking-lot"))]
// Collapse every poisoned guard into `LockPoisoned`
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
