use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-page 64-bit seed driving every pseudo-random draw for that page.
///
/// `Display` renders the base-10 form; that text (not the raw bytes) is what
/// gets hashed when deriving the PRNG state and entropy pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(pub u64);

impl Seed {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Seed {
    fn from(v: u64) -> Self {
        Seed(v)
    }
}

/// Final `position -> source tile` mapping consumed by the reassembler.
///
/// Pairs are stored in position order: `pairs()[p] == (p, source)` means the
/// tile found at `source` in the scrambled buffer belongs at `p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMapping {
    pairs: Vec<(usize, usize)>,
}

impl TileMapping {
    /// Build a mapping from `sources[position]`.
    pub fn from_sources(sources: Vec<usize>) -> Self {
        Self {
            pairs: sources.into_iter().enumerate().collect(),
        }
    }

    pub fn identity(len: usize) -> Self {
        Self::from_sources((0..len).collect())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn source_for(&self, position: usize) -> Option<usize> {
        self.pairs.get(position).map(|&(_, src)| src)
    }

    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|&(_, src)| src)
    }

    /// True if every index in `[0, len)` occurs exactly once as a position
    /// and exactly once as a source.
    pub fn is_bijection(&self) -> bool {
        let n = self.pairs.len();
        let mut seen_pos = vec![false; n];
        let mut seen_src = vec![false; n];
        for &(pos, src) in &self.pairs {
            if pos >= n || src >= n || seen_pos[pos] || seen_src[src] {
                return false;
            }
            seen_pos[pos] = true;
            seen_src[src] = true;
        }
        true
    }

    /// The mapping that undoes this one.
    pub fn inverse(&self) -> Self {
        let mut sources = vec![0usize; self.pairs.len()];
        for &(pos, src) in &self.pairs {
            if let Some(slot) = sources.get_mut(src) {
                *slot = pos;
            }
        }
        Self::from_sources(sources)
    }
}

/// One page image as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub series_id: String,
    pub chapter_id: String,
    /// 1-based page index from the image URL's query string
    pub page_index: u32,
}

impl PageRequest {
    pub fn new(
        series_id: impl Into<String>,
        chapter_id: impl Into<String>,
        page_index: u32,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            chapter_id: chapter_id.into(),
            page_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_displays_as_decimal() {
        assert_eq!(Seed(0).to_string(), "0");
        assert_eq!(Seed(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn identity_is_bijection() {
        let m = TileMapping::identity(100);
        assert_eq!(m.len(), 100);
        assert!(m.is_bijection());
        assert_eq!(m.source_for(42), Some(42));
        assert_eq!(m.source_for(100), None);
    }

    #[test]
    fn duplicate_source_is_not_bijection() {
        let m = TileMapping::from_sources(vec![0, 1, 1]);
        assert!(!m.is_bijection());
    }

    #[test]
    fn out_of_range_source_is_not_bijection() {
        let m = TileMapping::from_sources(vec![0, 3, 1]);
        assert!(!m.is_bijection());
    }

    #[test]
    fn empty_mapping() {
        let m = TileMapping::from_sources(vec![]);
        assert!(m.is_empty());
        assert!(m.is_bijection());
    }

    proptest! {
        #[test]
        fn inverse_undoes_mapping(perm in Just((0usize..64).collect::<Vec<_>>()).prop_shuffle()) {
            let m = TileMapping::from_sources(perm);
            let inv = m.inverse();
            prop_assert!(inv.is_bijection());
            for &(pos, src) in m.pairs() {
                prop_assert_eq!(inv.source_for(src), Some(pos));
            }
        }
    }
}
