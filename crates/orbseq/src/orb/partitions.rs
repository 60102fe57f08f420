use crate::{Error, Result};

/// Most partitions a domain may be sliced into.
pub const MAX_PARTITIONS: usize = 64;

/// An ordered, mixed-radix slicing of the scrambling domain.
///
/// Partition `i` has `sizes()[i]` possible digit values, least significant
/// partition first. A value `x` decomposes as
/// `x = d0 + s0 * (d1 + s1 * (d2 + ...))`, and each digit is permuted in its
/// own sub-domain by [`OrbOfConfusion`].
///
/// Bit-aligned partitions (`2^w` values each) and decimal digit groups
/// (`10^k` values each) are the common shapes, but any size `>= 2` works.
///
/// [`OrbOfConfusion`]: crate::OrbOfConfusion
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<u64>", into = "Vec<u64>")
)]
pub struct Partitions {
    sizes: Vec<u64>,
}

impl Partitions {
    /// Bit widths of [`Partitions::default_partitions`]: 63 bits, the
    /// non-negative range of an `i64`.
    pub const DEFAULT_BIT_WIDTHS: [u32; 8] = [8, 8, 8, 8, 8, 8, 8, 7];

    /// Creates partitions from explicit sizes, least significant first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `sizes` is empty, longer than
    /// [`MAX_PARTITIONS`], or holds a size below 2.
    pub fn from_sizes(sizes: impl Into<Vec<u64>>) -> Result<Self> {
        let sizes = sizes.into();
        if sizes.is_empty() {
            return Err(Error::invalid_config("partitions must not be empty"));
        }
        if sizes.len() > MAX_PARTITIONS {
            return Err(Error::invalid_config(format!(
                "{} partitions exceed the maximum of {MAX_PARTITIONS}",
                sizes.len()
            )));
        }
        if let Some(size) = sizes.iter().find(|size| **size < 2) {
            return Err(Error::invalid_config(format!(
                "partition size {size} is below 2"
            )));
        }
        Ok(Self { sizes })
    }

    /// Creates bit-aligned partitions, one of `2^width` values per entry.
    ///
    /// # Example
    /// ```
    /// use orbseq::Partitions;
    ///
    /// // A 32-bit domain as four bytes.
    /// let partitions = Partitions::bits(&[8, 8, 8, 8])?;
    /// assert_eq!(partitions.capacity(), 1 << 32);
    /// # Ok::<(), orbseq::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a width outside `1..=63`, or
    /// anything [`Partitions::from_sizes`] rejects.
    pub fn bits(widths: &[u32]) -> Result<Self> {
        let sizes = widths
            .iter()
            .map(|&width| match width {
                1..=63 => Ok(1u64 << width),
                _ => Err(Error::invalid_config(format!(
                    "bit width {width} is outside 1..=63"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_sizes(sizes)
    }

    /// Creates decimal partitions, one of `10^digits` values per entry.
    ///
    /// # Example
    /// ```
    /// use orbseq::Partitions;
    ///
    /// // Nine decimal digits in groups of three.
    /// let partitions = Partitions::decimal(&[3, 3, 3])?;
    /// assert_eq!(partitions.sizes(), &[1000, 1000, 1000]);
    /// # Ok::<(), orbseq::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a group outside `1..=19`, or
    /// anything [`Partitions::from_sizes`] rejects.
    pub fn decimal(digits: &[u32]) -> Result<Self> {
        let sizes = digits
            .iter()
            .map(|&digits| match digits {
                1..=19 => Ok(10u64.pow(digits)),
                _ => Err(Error::invalid_config(format!(
                    "decimal group of {digits} digits is outside 1..=19"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_sizes(sizes)
    }

    /// Eight bit-aligned partitions covering 63 bits.
    pub fn default_partitions() -> Self {
        Self {
            sizes: Self::DEFAULT_BIT_WIDTHS
                .iter()
                .map(|width| 1u64 << width)
                .collect(),
        }
    }

    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Number of distinct values the partitions can address, saturating at
    /// `u128::MAX`.
    pub fn capacity(&self) -> u128 {
        self.sizes
            .iter()
            .fold(1u128, |acc, size| acc.saturating_mul(u128::from(*size)))
    }

    /// Trims the partitions to the smallest prefix covering `upper_bound`.
    ///
    /// The last kept partition shrinks to `ceil(upper_bound / covered)`, so
    /// the resulting domain is always below `2 * upper_bound`. A single
    /// partition is split into two near-square halves so there is always
    /// another digit to mix against. An `upper_bound` of 1 needs no
    /// partitions at all.
    pub(crate) fn fit(&self, upper_bound: u64) -> Result<Vec<u64>> {
        debug_assert!(upper_bound > 0);
        if upper_bound == 1 {
            return Ok(Vec::new());
        }

        let target = u128::from(upper_bound);
        let mut covered = 1u128;
        let mut fitted = Vec::with_capacity(self.sizes.len());

        for &size in &self.sizes {
            let size = u128::from(size);
            if covered * size >= target {
                // `covered < target <= u64::MAX`, so the quotient fits.
                fitted.push(target.div_ceil(covered) as u64);
                return Ok(split_single(fitted, upper_bound));
            }
            covered *= size;
            fitted.push(size as u64);
        }

        Err(Error::invalid_config(format!(
            "partitions address {covered} values, fewer than the upper bound {upper_bound}"
        )))
    }
}

fn split_single(fitted: Vec<u64>, upper_bound: u64) -> Vec<u64> {
    if fitted.len() > 1 || upper_bound < 4 {
        return fitted;
    }
    let mut low = upper_bound.isqrt();
    if low * low < upper_bound {
        low += 1;
    }
    vec![low, upper_bound.div_ceil(low)]
}

impl Default for Partitions {
    fn default() -> Self {
        Self::default_partitions()
    }
}

impl TryFrom<Vec<u64>> for Partitions {
    type Error = Error;

    fn try_from(sizes: Vec<u64>) -> Result<Self> {
        Self::from_sizes(sizes)
    }
}

impl From<Partitions> for Vec<u64> {
    fn from(partitions: Partitions) -> Self {
        partitions.sizes
    }
}

/// Returns [`Partitions::default_partitions`], sized for 63-bit positive
/// `i64` domains.
pub fn create_default_partitions() -> Partitions {
    Partitions::default_partitions()
}
