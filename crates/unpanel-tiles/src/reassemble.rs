//! Byte-level tile reassembly.
//!
//! A buffer of `total` bytes is cut into `pieces = mapping.len()` tiles of
//! `total / pieces` bytes. The `total % pieces` leftover bytes are not tiled:
//! a scrambled buffer carries them at the front and a restored buffer at the
//! back.
//!
//! ```text
//! scrambled: [rem bytes][tile 0][tile 1]...[tile n-1]
//! restored:  [slot 0][slot 1]...[slot n-1][rem bytes]
//! ```

use unpanel_core::{TileMapping, UnpanelError, UnpanelResult};

/// Which way to move tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `slot[position] = tile[source]`; leftover bytes move front → back.
    Unscramble,
    /// `slot[source] = tile[position]`; leftover bytes move back → front.
    Scramble,
}

/// Restore a scrambled buffer.
pub fn unscramble(data: &[u8], mapping: &TileMapping) -> UnpanelResult<Vec<u8>> {
    reassemble(data, mapping, Direction::Unscramble)
}

/// Scramble a buffer; the inverse of [`unscramble`] for the same mapping.
pub fn scramble(data: &[u8], mapping: &TileMapping) -> UnpanelResult<Vec<u8>> {
    reassemble(data, mapping, Direction::Scramble)
}

/// Split `data` into `mapping.len()` tiles and reorder them.
///
/// Fails only if the mapping is empty or not a bijection.
pub fn reassemble(
    data: &[u8],
    mapping: &TileMapping,
    direction: Direction,
) -> UnpanelResult<Vec<u8>> {
    let pieces = mapping.len();
    if pieces == 0 {
        return Err(UnpanelError::InvalidMapping("mapping has no tiles".into()));
    }
    if !mapping.is_bijection() {
        return Err(UnpanelError::InvalidMapping(format!(
            "mapping over {pieces} tiles is not a permutation"
        )));
    }

    let tile_len = data.len() / pieces;
    let rem = data.len() % pieces;
    let span = |i: usize| i * tile_len..(i + 1) * tile_len;
    let empty: &[u8] = &[];

    let mut out = Vec::with_capacity(data.len());
    match direction {
        Direction::Unscramble => {
            let (leftover, body) = data.split_at(rem);
            let mut slots = vec![empty; pieces];
            for &(position, source) in mapping.pairs() {
                slots[position] = &body[span(source)];
            }
            slots.iter().for_each(|s| out.extend_from_slice(s));
            out.extend_from_slice(leftover);
        }
        Direction::Scramble => {
            let (body, leftover) = data.split_at(data.len() - rem);
            let mut slots = vec![empty; pieces];
            for &(position, source) in mapping.pairs() {
                slots[source] = &body[span(position)];
            }
            out.extend_from_slice(leftover);
            slots.iter().for_each(|s| out.extend_from_slice(s));
        }
    }
    Ok(out)
}
