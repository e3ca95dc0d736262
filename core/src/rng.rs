//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through CallRng instances derived
//! from the single master seed of the batch.
//!
//! Each call gets its own RNG stream, seeded deterministically
//! from (master_seed XOR call_index). This means:
//!   - A call's output does not depend on which thread produced it.
//!   - Any single call can be replayed in isolation from its index.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The deterministic RNG handle owned by one call generation.
/// Sampler, engine and deriver all draw from the same handle, in that order.
pub struct CallRng {
    pub call_index: u64,
    inner: Pcg64Mcg,
}

impl CallRng {
    /// Create a call RNG from the master seed and the call's position
    /// in the batch.
    pub fn new(master_seed: u64, call_index: u64) -> Self {
        let derived_seed = master_seed ^ (call_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            call_index,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
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

    /// Roll a u64 in [lo, hi], both ends inclusive.
    pub fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        lo + self.next_u64_below(hi - lo + 1)
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly. Panics on an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Sixteen random bytes, for identifiers.
    pub fn next_bytes16(&mut self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.next_u64().to_le_bytes());
        out[8..].copy_from_slice(&self.next_u64().to_le_bytes());
        out
    }
}

/// Hands out one RNG stream per call index for a single batch.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_call(&self, call_index: u64) -> CallRng {
        CallRng::new(self.master_seed, call_index)
    }
}
