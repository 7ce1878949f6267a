//! Heap-allocated bitset sized from program metadata.
//!
//! Bits live in `u64` words. Padding bits (indices at or beyond the logical
//! length) always stay zero, so counting and iteration never see phantom
//! members.

/// Number of `u64` words needed to store `n` bits.
pub const fn words_for_bits(n: usize) -> usize {
    n.div_ceil(64)
}

/// Bitset with a capacity fixed at construction.
///
/// All indexing operations panic when `idx >= bit_length`. Programs are
/// validated against their declared capacities, so an out-of-range index
/// is a bug in the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicBitSet {
    words: Vec<u64>,
    bit_length: usize,
}

impl DynamicBitSet {
    /// Creates an empty bitset with room for `bit_length` bits. May be zero.
    pub fn empty(bit_length: usize) -> Self {
        Self {
            words: vec![0u64; words_for_bits(bit_length)],
            bit_length,
        }
    }

    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Counts set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[inline]
    pub fn is_set(&self, idx: usize) -> bool {
        assert!(idx < self.bit_length, "bit index out of bounds");
        (self.words[idx / 64] & (1u64 << (idx % 64))) != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        assert!(idx < self.bit_length, "bit index out of bounds");
        self.words[idx / 64] |= 1u64 << (idx % 64);
    }

    #[inline]
    pub fn unset(&mut self, idx: usize) {
        assert!(idx < self.bit_length, "bit index out of bounds");
        self.words[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Sets the bit at `idx` and returns its previous value.
    #[inline]
    pub fn test_and_set(&mut self, idx: usize) -> bool {
        assert!(idx < self.bit_length, "bit index out of bounds");
        let word = &mut self.words[idx / 64];
        let mask = 1u64 << (idx % 64);
        let was_set = *word & mask != 0;
        *word |= mask;
        was_set
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Iterates set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(word_idx * 64 + bit)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_query() {
        let mut bits = DynamicBitSet::empty(130);
        bits.set(0);
        bits.set(64);
        bits.set(129);

        assert!(bits.is_set(0));
        assert!(bits.is_set(64));
        assert!(bits.is_set(129));
        assert!(!bits.is_set(1));
        assert_eq!(bits.count(), 3);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0, 64, 129]);

        bits.unset(64);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0, 129]);
    }

    #[test]
    fn test_and_set_reports_previous() {
        let mut bits = DynamicBitSet::empty(8);
        assert!(!bits.test_and_set(3));
        assert!(bits.test_and_set(3));
        assert!(bits.is_set(3));
    }

    #[test]
    fn clear_resets_everything() {
        let mut bits = DynamicBitSet::empty(70);
        bits.set(5);
        bits.set(69);
        bits.clear();
        assert!(bits.is_empty());
        assert_eq!(bits.bit_length(), 70);
    }

    #[test]
    fn zero_length() {
        let bits = DynamicBitSet::empty(0);
        assert!(bits.is_empty());
        assert_eq!(bits.iter().count(), 0);
    }

    #[test]
    #[should_panic(expected = "bit index out of bounds")]
    fn out_of_bounds_panics() {
        let mut bits = DynamicBitSet::empty(4);
        bits.set(4);
    }
}
