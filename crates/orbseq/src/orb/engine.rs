use crate::{Error, MAX_ID, Partitions, Result, orb::MAX_PARTITIONS};

/// Largest `upper_bound` an [`OrbOfConfusion`] accepts: every value up to
/// and including [`MAX_ID`].
pub const MAX_UPPER_BOUND: u64 = MAX_ID + 1;

/// Mixing rounds applied over all partitions.
pub const ROUNDS: usize = 4;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Splitmix64 finalizer.
#[inline]
const fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Inverse of `a` modulo `n`. `a` and `n` must be coprime.
fn mod_inverse(a: u64, n: u64) -> u64 {
    let (mut t, mut next_t) = (0i128, 1i128);
    let (mut r, mut next_r) = (i128::from(n), i128::from(a));
    while next_r != 0 {
        let q = r / next_r;
        (t, next_t) = (next_t, t - q * next_t);
        (r, next_r) = (next_r, r - q * next_r);
    }
    debug_assert_eq!(r, 1, "{a} has no inverse modulo {n}");
    t.rem_euclid(i128::from(n)) as u64
}

#[inline]
fn mul_mod(a: u64, b: u64, n: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(n)) as u64
}

#[inline]
fn add_mod(a: u64, b: u64, n: u64) -> u64 {
    ((u128::from(a) + u128::from(b)) % u128::from(n)) as u64
}

#[inline]
fn sub_mod(a: u64, b: u64, n: u64) -> u64 {
    add_mod(a, n - b, n)
}

/// The keyed affine map `d -> d * multiplier + offset (mod size)` of one
/// partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Radix {
    size: u64,
    multiplier: u64,
    inverse: u64,
    offset: u64,
}

impl Radix {
    fn new(size: u64, key: u64) -> Self {
        debug_assert!(size >= 2);
        let mut multiplier = key % size;
        if multiplier == 0 {
            multiplier = 1;
        }
        while gcd(multiplier, size) != 1 {
            multiplier = multiplier % (size - 1) + 1;
        }
        Self {
            size,
            multiplier,
            inverse: mod_inverse(multiplier, size),
            offset: mix64(key) % size,
        }
    }

    #[inline]
    fn forward(&self, digit: u64, tweak: u64) -> u64 {
        let scaled = mul_mod(digit, self.multiplier, self.size);
        let affine = add_mod(scaled, self.offset, self.size);
        add_mod(affine, tweak, self.size)
    }

    #[inline]
    fn backward(&self, digit: u64, tweak: u64) -> u64 {
        let affine = sub_mod(sub_mod(digit, tweak, self.size), self.offset, self.size);
        mul_mod(affine, self.inverse, self.size)
    }
}

/// A keyed, deterministic permutation of `[0, upper_bound)`.
///
/// The domain is sliced into mixed-radix [`Partitions`], trimmed so the
/// covering domain stays below `2 * upper_bound`. Each of [`ROUNDS`] rounds
/// walks the partitions in order and updates one digit at a time:
///
/// ```text
/// d_i <- d_i * m_i + c_i + F(seed2, round, i, other digits)   (mod s_i)
/// ```
///
/// `m_i` is coprime to `s_i` and, like `c_i`, is derived from `seed1`. `F`
/// never reads `d_i`, so every step can be undone by subtracting the same
/// tweak and multiplying by `m_i^-1`. That makes the whole pass a bijection
/// on the covering domain, whatever `F` is; cycle-walking then restricts it
/// to `[0, upper_bound)`.
///
/// The transform is stateless: two engines built from the same bound,
/// partitions and seeds agree on every input, and a single engine can be
/// shared freely across threads.
///
/// This obfuscates issuance order. It is not a cipher.
///
/// # Example
/// ```
/// use orbseq::{OrbOfConfusion, Partitions};
///
/// let orb = OrbOfConfusion::new(100_000, &Partitions::default(), 17, 42)?;
/// let scrambled = orb.transform(5)?;
/// assert!(scrambled < 100_000);
/// assert_eq!(orb.invert(scrambled)?, 5);
/// assert!(orb.transform(100_000).is_err());
/// # Ok::<(), orbseq::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrbOfConfusion {
    upper_bound: u64,
    domain: u64,
    seed2: u64,
    radices: Vec<Radix>,
}

impl OrbOfConfusion {
    /// Builds the permutation of `[0, upper_bound)` selected by `partitions`,
    /// `seed1` and `seed2`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `upper_bound` is zero, exceeds
    /// [`MAX_UPPER_BOUND`], or is larger than the partitions can address.
    pub fn new(upper_bound: u64, partitions: &Partitions, seed1: u64, seed2: u64) -> Result<Self> {
        if upper_bound == 0 {
            return Err(Error::invalid_config("upper bound must be greater than 0"));
        }
        if upper_bound > MAX_UPPER_BOUND {
            return Err(Error::invalid_config(format!(
                "upper bound {upper_bound} exceeds the maximum of {MAX_UPPER_BOUND}"
            )));
        }

        let sizes = partitions.fit(upper_bound)?;
        debug_assert!(sizes.len() <= MAX_PARTITIONS);

        let radices = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let key = mix64(seed1 ^ (i as u64 + 1).wrapping_mul(GOLDEN_GAMMA));
                Radix::new(size, key)
            })
            .collect::<Vec<_>>();
        // The fitted domain is below `2 * upper_bound <= 2^64`.
        let domain = sizes.iter().product();

        Ok(Self {
            upper_bound,
            domain,
            seed2,
            radices,
        })
    }

    /// Builds an engine over a signed bound, for hosts that carry ids as
    /// `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `upper_bound` is not positive, plus
    /// everything [`OrbOfConfusion::new`] rejects.
    pub fn new_signed(
        upper_bound: i64,
        partitions: &Partitions,
        seed1: u64,
        seed2: u64,
    ) -> Result<Self> {
        let Ok(upper_bound) = u64::try_from(upper_bound) else {
            return Err(Error::invalid_config(format!(
                "upper bound {upper_bound} is negative"
            )));
        };
        Self::new(upper_bound, partitions, seed1, seed2)
    }

    /// The exclusive bound of the permuted domain.
    pub fn upper_bound(&self) -> u64 {
        self.upper_bound
    }

    /// Size of the covering domain the rounds operate on, in
    /// `[upper_bound, 2 * upper_bound)`.
    pub fn domain_size(&self) -> u64 {
        self.domain
    }

    /// The partition sizes after fitting to the bound.
    pub fn partition_sizes(&self) -> Vec<u64> {
        self.radices.iter().map(|radix| radix.size).collect()
    }

    /// Maps `raw` to its scrambled image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `raw >= upper_bound`.
    pub fn transform(&self, raw: u64) -> Result<u64> {
        self.check(raw)?;
        let mut value = self.permute(raw);
        while value >= self.upper_bound {
            value = self.permute(value);
        }
        Ok(value)
    }

    /// Maps a scrambled value back to the raw value it came from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `scrambled >= upper_bound`.
    pub fn invert(&self, scrambled: u64) -> Result<u64> {
        self.check(scrambled)?;
        let mut value = self.unpermute(scrambled);
        while value >= self.upper_bound {
            value = self.unpermute(value);
        }
        Ok(value)
    }

    /// [`OrbOfConfusion::transform`] for `i64` callers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `raw` is negative or
    /// `raw >= upper_bound`.
    pub fn transform_signed(&self, raw: i64) -> Result<i64> {
        let Ok(unsigned) = u64::try_from(raw) else {
            return Err(Error::out_of_domain(raw, self.upper_bound));
        };
        // Images stay below `upper_bound <= 2^63`.
        Ok(self.transform(unsigned)? as i64)
    }

    #[inline]
    fn check(&self, value: u64) -> Result<()> {
        if value >= self.upper_bound {
            return Err(Error::out_of_domain(value, self.upper_bound));
        }
        Ok(())
    }

    fn permute(&self, value: u64) -> u64 {
        let mut buf = [0u64; MAX_PARTITIONS];
        let digits = self.decompose(value, &mut buf);

        for round in 0..ROUNDS {
            for (i, radix) in self.radices.iter().enumerate() {
                let tweak = self.tweak(round, i, digits) % radix.size;
                digits[i] = radix.forward(digits[i], tweak);
            }
        }
        self.compose(digits)
    }

    fn unpermute(&self, value: u64) -> u64 {
        let mut buf = [0u64; MAX_PARTITIONS];
        let digits = self.decompose(value, &mut buf);

        for round in (0..ROUNDS).rev() {
            for (i, radix) in self.radices.iter().enumerate().rev() {
                let tweak = self.tweak(round, i, digits) % radix.size;
                digits[i] = radix.backward(digits[i], tweak);
            }
        }
        self.compose(digits)
    }

    /// Cross-partition mixing term for digit `index`. Reads every digit but
    /// `index`.
    #[inline]
    fn tweak(&self, round: usize, index: usize, digits: &[u64]) -> u64 {
        let lane = ((round as u64) << 32) | index as u64;
        let mut hash = self.seed2 ^ mix64(lane.wrapping_add(GOLDEN_GAMMA));
        for (j, digit) in digits.iter().enumerate() {
            if j != index {
                let salt = (j as u64 + 1).wrapping_mul(GOLDEN_GAMMA);
                hash = mix64(hash ^ digit.wrapping_add(salt));
            }
        }
        mix64(hash)
    }

    fn decompose<'a>(&self, mut value: u64, buf: &'a mut [u64; MAX_PARTITIONS]) -> &'a mut [u64] {
        let digits = &mut buf[..self.radices.len()];
        for (digit, radix) in digits.iter_mut().zip(&self.radices) {
            *digit = value % radix.size;
            value /= radix.size;
        }
        debug_assert_eq!(value, 0);
        digits
    }

    fn compose(&self, digits: &[u64]) -> u64 {
        digits
            .iter()
            .zip(&self.radices)
            .rev()
            .fold(0, |acc, (digit, radix)| acc * radix.size + digit)
    }
}
