//! Shuffle generation
//!
//! Produces uniformly random permutations of `0..n` with an in-place
//! Fisher-Yates pass. The generator owns its random source: production code
//! uses the thread-local OS-seeded RNG, while tests and tooling can pin a
//! ChaCha8 seed to get reproducible output.
//!
//! # Example
//!
//! ```
//! use daily_shuffle::shuffle::{is_permutation, ShuffleGenerator, LITE_SIZE};
//!
//! let mut generator = ShuffleGenerator::new();
//! let lite = generator.generate(LITE_SIZE).unwrap();
//! assert!(is_permutation(&lite, LITE_SIZE));
//! ```

use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// Length of the "lite" deck
pub const LITE_SIZE: usize = 24;

/// Length of the "classic" deck
pub const CLASSIC_SIZE: usize = 52;

/// Random permutation generator
#[derive(Debug, Clone)]
pub struct ShuffleGenerator<R: Rng = ThreadRng> {
    rng: R,
}

impl ShuffleGenerator<ThreadRng> {
    /// Generator backed by the thread-local RNG
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for ShuffleGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleGenerator<ChaCha8Rng> {
    /// Reproducible generator: equal seeds yield equal sequences
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> ShuffleGenerator<R> {
    /// Wrap an arbitrary random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Return `0..n` in uniformly random order.
    ///
    /// Fails with [`Error::InvalidArgument`] when `n` is zero.
    pub fn generate(&mut self, n: usize) -> Result<Vec<u32>> {
        if n == 0 {
            return Err(Error::invalid_argument("shuffle size must be positive"));
        }

        let mut values = identity(n)?;
        for i in (1..values.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            values.swap(i, j);
        }
        Ok(values)
    }
}

/// `0..n` in natural order
///
/// Fails with [`Error::InvalidArgument`] when `n` does not fit in `u32`.
pub fn identity(n: usize) -> Result<Vec<u32>> {
    let n = u32::try_from(n)
        .map_err(|_| Error::invalid_argument(format!("shuffle size {n} exceeds u32")))?;
    Ok((0..n).collect())
}

/// Check that `values` holds each of `0..n` exactly once
pub fn is_permutation(values: &[u32], n: usize) -> bool {
    if values.len() != n {
        return false;
    }

    let mut seen = vec![false; n];
    for &value in values {
        let idx = value as usize;
        if idx >= n || seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}
