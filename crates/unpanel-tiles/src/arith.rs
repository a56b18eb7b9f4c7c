//! Fixed-width unsigned arithmetic.
//!
//! The transport's generators were specified over unbounded integers and then
//! masked to 64 or 32 bits. These helpers give the same results with native
//! wrapping operations.

/// Multiplier applied after each xorshift step
pub const PRNG_MULTIPLIER: u64 = 0x27BB_2EE6_87B0_B0FD;

/// Multiplier applied inside each Feistel round (mod 2^32)
pub const ROUND_MULTIPLIER: u32 = 0x045D_9F3B;

/// One xorshift64 step (11, 19, 7) followed by a multiply mod 2^64.
#[inline]
pub fn xorshift_mul(mut state: u64) -> u64 {
    state ^= state << 11;
    state ^= state >> 19;
    state ^= state << 7;
    state.wrapping_mul(PRNG_MULTIPLIER)
}

/// `((n << 5) | (n >> 3)) mod 2^32`, computed on the full 64-bit input.
///
/// Not a true rotation: the bits shifted out of the low word by `<< 5` are
/// lost, while `>> 3` pulls bits down from the high word.
#[inline]
pub fn shift_mix_low32(n: u64) -> u32 {
    ((n << 5) | (n >> 3)) as u32
}

/// `(a + b) mod m` without overflowing at 2^64.
#[inline]
pub fn add_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) + u128::from(b)) % u128::from(m)) as u64
}
