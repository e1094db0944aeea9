//! Seeded sequence generator for puzzle generation.
//!
//! A 32-bit Mersenne Twister whose output is narrowed to `{0, 1, 2, 3}` at
//! the point of extraction. Shared puzzle links carry only the seed, so the
//! sequence must stay bit-exact across releases, including the seeding step
//! of the browser build, which multiplies in double precision.
//!
//! Fresh seeds come from the `rand` crate's `SmallRng`, with entropy sourced
//! from `getrandom` (browser crypto API on wasm32).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const STATE_LEN: usize = 624;
const SHIFT_LEN: usize = 397;
const INIT_MULTIPLIER: f64 = 1_812_433_253.0;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// Upper bound (inclusive) for freshly drawn seeds.
pub const MAX_FRESH_SEED: u32 = 10_000_000;

/// Mersenne Twister producing draws in `0..4`.
#[derive(Clone)]
pub struct SequenceRng {
    state: [u32; STATE_LEN],
    index: usize,
}

impl SequenceRng {
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; STATE_LEN];
        state[0] = seed;
        for i in 1..STATE_LEN {
            let prev = state[i - 1];
            // The mixed word is reinterpreted as signed and multiplied as a
            // double; the product is then reduced modulo 2^32.
            let s = (prev ^ (prev >> 30)) as i32;
            let product = INIT_MULTIPLIER * f64::from(s) + i as f64;
            state[i] = product as i64 as u32;
        }
        Self { state, index: 0 }
    }

    fn twist(&mut self) {
        for i in 0..STATE_LEN {
            let y = (self.state[i] & UPPER_MASK) | (self.state[(i + 1) % STATE_LEN] & LOWER_MASK);
            let mut next = self.state[(i + SHIFT_LEN) % STATE_LEN] ^ (y >> 1);
            if y & 1 != 0 {
                next ^= MATRIX_A;
            }
            self.state[i] = next;
        }
        self.index = 0;
    }

    /// Next full-width tempered word.
    pub fn extract(&mut self) -> u32 {
        if self.index == 0 {
            self.twist();
        }
        let mut y = self.state[self.index];
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        self.index = (self.index + 1) % STATE_LEN;
        y
    }

    /// Next draw in `0..4`.
    #[inline(always)]
    pub fn next(&mut self) -> u32 {
        self.extract() % 4
    }

    /// Choose an index in `[0, len)` by reducing a `0..4` draw.
    ///
    /// For `len > 4` only the first four indices are reachable; callers pick
    /// among at most four grid neighbours, or among grid rows and columns.
    #[inline(always)]
    pub fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick from an empty range");
        self.next() as usize % len.max(1)
    }
}

/// Draw a fresh non-zero seed from system entropy.
pub fn fresh_seed() -> u32 {
    SmallRng::from_os_rng().random_range(1..=MAX_FRESH_SEED)
}
