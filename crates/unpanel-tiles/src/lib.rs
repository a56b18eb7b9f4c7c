//! unpanel-tiles: seeded tile permutation and scrambled-buffer reassembly
//!
//! # Overview
//! - `arith`: fixed-width wraparound primitives shared by the generators
//! - `randomizer`: xorshift-multiply PRNG + Feistel mixing → base permutation
//! - `scrambler`: seeded tile dependency DAG, Kahn ordering, final mapping
//! - `reassemble`: split a buffer into tiles and reorder it by a mapping
//!
//! Everything is a pure function of `(seed, grid_size)`; nothing is cached
//! between pages.

pub mod arith;
pub mod randomizer;
pub mod reassemble;
pub mod scrambler;

pub use randomizer::TileRandomizer;
pub use reassemble::{reassemble, scramble, unscramble, Direction};
pub use scrambler::{DependencyGraph, Scrambler};

/// Tiles per grid side in the protected transport
pub const DEFAULT_GRID_SIZE: usize = 10;

/// Feistel rounds per index pair
pub const DEFAULT_FEISTEL_ROUNDS: usize = 4;
