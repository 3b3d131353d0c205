//! Canonical position keys and the visited set used for duplicate pruning.
//!
//! Positions from the grid puzzles reduce to a handful of small fields per
//! cell, so keys are bit-packed: one bit per peg hole, and for sudoku
//! cells and bridge slots just enough bits for the largest value. Keys of
//! up to 128 bits stay inline.

use std::collections::HashSet;
use std::hash::Hash;

use smallvec::SmallVec;

const WORD_BITS: usize = 64;

/// A bit-packed canonical key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitKey {
    words: SmallVec<[u64; 2]>,
    len: usize,
}

impl BitKey {
    /// Number of bits pushed into the key
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read back the bit at `index`
    pub fn bit(&self, index: usize) -> bool {
        index < self.len && self.words[index / WORD_BITS] >> (index % WORD_BITS) & 1 == 1
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

/// Appends fixed-width fields into a [`BitKey`]
#[derive(Debug, Default)]
pub struct BitKeyBuilder {
    key: BitKey,
}

impl BitKeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        let mut words = SmallVec::new();
        words.reserve(bits.div_ceil(WORD_BITS));
        Self {
            key: BitKey { words, len: 0 },
        }
    }

    pub fn bit(&mut self, set: bool) -> &mut Self {
        self.push(set as u64, 1)
    }

    /// Append the low `width` bits of `value`. `width` is at most 64.
    pub fn push(&mut self, value: u64, width: usize) -> &mut Self {
        debug_assert!(width <= WORD_BITS);
        debug_assert!(width == WORD_BITS || value >> width == 0);
        for i in 0..width {
            let index = self.key.len + i;
            if index % WORD_BITS == 0 {
                self.key.words.push(0);
            }
            if value >> i & 1 == 1 {
                self.key.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
            }
        }
        self.key.len += width;
        self
    }

    pub fn finish(self) -> BitKey {
        self.key
    }
}

/// Bits needed to store values in `0..=max`
pub fn bits_for(max: u64) -> usize {
    (WORD_BITS - max.leading_zeros() as usize).max(1)
}

/// Keys of positions already explored during one search call
#[derive(Debug)]
pub struct VisitedSet<K> {
    seen: HashSet<K>,
}

impl<K: Eq + Hash> VisitedSet<K> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.seen.insert(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<K: Eq + Hash> Default for VisitedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_round_trip_across_word_boundary() {
        let mut builder = BitKeyBuilder::new();
        for i in 0..130 {
            builder.bit(i % 3 == 0);
        }
        let key = builder.finish();

        assert_eq!(key.len(), 130);
        for i in 0..130 {
            assert_eq!(key.bit(i), i % 3 == 0, "bit {}", i);
        }
        assert!(!key.bit(130));
        assert_eq!(key.count_ones(), 44);
    }

    #[test]
    fn test_fields_straddling_words() {
        let mut builder = BitKeyBuilder::new();
        builder.push(0, 62).push(0b1011, 4);
        let key = builder.finish();

        assert!(key.bit(62));
        assert!(key.bit(63));
        assert!(!key.bit(64));
        assert!(key.bit(65));
    }

    #[test]
    fn test_length_is_part_of_identity() {
        let mut short = BitKeyBuilder::new();
        short.bit(false);
        let mut long = BitKeyBuilder::new();
        long.bit(false).bit(false);

        assert_ne!(short.finish(), long.finish());
    }

    #[test]
    fn test_bits_for() {
        assert_eq!(bits_for(0), 1);
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(9), 4);
        assert_eq!(bits_for(16), 5);
    }

    #[test]
    fn test_visited_set_first_sight() {
        let mut visited = VisitedSet::new();
        assert!(visited.insert(7u64));
        assert!(!visited.insert(7u64));
        assert!(visited.contains(&7));
        assert_eq!(visited.len(), 1);
    }
}
