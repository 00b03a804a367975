use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

use crate::real;

/// Seeded per-thread random source. Each worker owns one; nothing about it is
/// shared.
pub struct Rng(StdRng);

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng(StdRng::seed_from_u64(seed))
    }

    /// Uniform in `[0, 1)`.
    pub fn rand_real(&mut self) -> real {
        self.0.gen::<real>()
    }

    /// Uniform in `[lo, hi)`.
    pub fn uniform(&mut self, lo: real, hi: real) -> real {
        lo + (hi - lo) * self.rand_real()
    }

    /// Uniform in `0..n`. Panics if `n == 0`.
    pub fn rand_index(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }
}
