//! Deterministic random number generation.
//!
//! RULE: Nothing in the synthesizer may call any platform RNG.
//! All randomness flows through the single GenRng created from the
//! master seed in the run configuration. Reproducibility depends on
//! every phase drawing from this one stream in the same sequential
//! order, so no phase may construct its own generator.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The master deterministic RNG for a whole synthesis run.
pub struct GenRng {
    inner: Pcg64Mcg,
}

impl GenRng {
    pub fn new(master_seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(master_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Roll a float uniformly in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Roll an integer uniformly in [lo, hi). Panics if lo >= hi.
    pub fn randrange(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo < hi, "empty range [{lo}, {hi})");
        lo + self.next_u64_below((hi - lo) as u64) as i64
    }

    /// Pick one element of a non-empty slice uniformly.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "choice on empty slice");
        &items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Fisher-Yates shuffle, in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u64_below((i + 1) as u64) as usize;
            items.swap(i, j);
        }
    }

    /// Draw n distinct elements uniformly without replacement.
    /// Partial Fisher-Yates over a copy of the pool. Panics if n > pool size.
    pub fn sample<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        assert!(n <= items.len(), "sample larger than population");
        let mut pool: Vec<T> = items.to_vec();
        for i in 0..n {
            let j = i + self.next_u64_below((pool.len() - i) as u64) as usize;
            pool.swap(i, j);
        }
        pool.truncate(n);
        pool
    }
}
