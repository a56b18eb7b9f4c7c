//! Seeded tile permutation generator.
//!
//! State is a single u64 advanced by [`xorshift_mul`]. A Feistel-style mix of
//! index pairs, keyed by the seed's entropy pool, does a first round of swaps;
//! a Fisher-Yates pass biased by the same pool finishes the shuffle. The
//! permutation is computed once, in [`TileRandomizer::new`], and the PRNG
//! keeps going from wherever that left it.

use unpanel_core::Seed;
use unpanel_crypto::{derive_entropy_pool, hash_seed_state, EntropyPool};

use crate::arith::{add_mod, shift_mix_low32, xorshift_mul, ROUND_MULTIPLIER};
use crate::DEFAULT_FEISTEL_ROUNDS;

/// Nibble substitution table used by each Feistel round
const SBOX: [u8; 16] = [
    163, 95, 137, 13, 55, 193, 107, 228, 114, 185, 22, 243, 68, 218, 158, 40,
];

#[derive(Debug, Clone)]
pub struct TileRandomizer {
    state: u64,
    pool: EntropyPool,
    order: Vec<usize>,
    rounds: usize,
}

impl TileRandomizer {
    /// Derive state and entropy from `seed`, then shuffle `[0, total)`.
    pub fn new(seed: Seed, total: usize) -> Self {
        Self::with_rounds(seed, total, DEFAULT_FEISTEL_ROUNDS)
    }

    pub fn with_rounds(seed: Seed, total: usize, rounds: usize) -> Self {
        let mut randomizer = Self {
            state: hash_seed_state(seed),
            pool: derive_entropy_pool(seed),
            order: (0..total).collect(),
            rounds,
        };
        randomizer.permute();
        randomizer
    }

    /// Next PRNG output. Advances the state.
    pub fn next_u64(&mut self) -> u64 {
        self.state = xorshift_mul(self.state);
        self.state
    }

    /// The shuffled tile order produced at construction.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn into_order(self) -> Vec<usize> {
        self.order
    }

    fn round(&mut self, value: u64, tweak: u8) -> u64 {
        let n = value ^ self.next_u64() ^ u64::from(tweak);
        let mut n = shift_mix_low32(n).wrapping_mul(ROUND_MULTIPLIER);
        n ^= u32::from(sbox(n as u8));
        n ^= n >> 13;
        u64::from(n)
    }

    fn feistel_mix(&mut self, mut a: u64, mut b: u64) -> (u64, u64) {
        for r in 0..self.rounds {
            let tweak = self.pool.byte_at(r);
            a ^= self.round(b, tweak);
            let tweak2 = tweak ^ (r.wrapping_mul(31) & 0xFF) as u8;
            b ^= self.round(a, tweak2);
        }
        (a, b)
    }

    fn permute(&mut self) {
        let total = self.order.len();
        let half = total / 2;

        for t in 0..half {
            let (a, b) = self.feistel_mix(t as u64, (t + half) as u64);
            let i = (a % total as u64) as usize;
            let j = (b % total as u64) as usize;
            self.order.swap(i, j);
        }

        for e in (1..total).rev() {
            let ent = u64::from(self.pool.byte_at(e));
            let next = self.next_u64();
            let idx = add_mod(next, ent, e as u64 + 1) as usize;
            self.order.swap(e, idx);
        }
    }
}

fn sbox(byte: u8) -> u8 {
    SBOX[(byte & 0xF) as usize] ^ SBOX[(byte >> 4) as usize]
}
