//! Fixed-width bit set used as the backing store of state sets.
//!
//! Unlike a growable set, the width is fixed at construction time: every bit
//! index must be below [`BitSet::width`]. Bits past the width in the last word
//! are kept cleared, so two sets of the same width are equal exactly when their
//! words are equal.

/// A fixed-width bit set backed by a vector of u64 words.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of addressable bits
    width: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty bit set able to hold indices `0..width`.
    pub fn new(width: usize) -> Self {
        Self {
            words: vec![0; Self::words_for(width)],
            width,
        }
    }

    /// Creates a bit set with all indices `0..width` set.
    pub fn full(width: usize) -> Self {
        let mut bs = Self {
            words: vec![u64::MAX; Self::words_for(width)],
            width,
        };
        bs.clear_padding();
        bs
    }

    fn words_for(width: usize) -> usize {
        width.div_ceil(Self::BITS_PER_WORD)
    }

    /// Returns the number of addressable bits.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns true if every addressable bit is set.
    pub fn is_full(&self) -> bool {
        self.len() == self.width
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(&self, index: usize) -> (usize, usize) {
        assert!(index < self.width, "bit index {} out of range for width {}", index, self.width);
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Zeroes the bits past `width` in the last word.
    fn clear_padding(&mut self) {
        let tail = self.width % Self::BITS_PER_WORD;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        (self.words[word_idx] >> bit_idx) & 1 == 1
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        self.words[word_idx] |= mask;
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_set = self.words[word_idx] & mask != 0;
        self.words[word_idx] &= !mask;
        was_set
    }

    /// Clears all bits.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Sets all addressable bits.
    pub fn fill(&mut self) {
        self.words.fill(u64::MAX);
        self.clear_padding();
    }

    fn assert_same_width(&self, other: &BitSet) {
        assert_eq!(
            self.width, other.width,
            "bit sets of different width cannot be combined"
        );
    }

    /// In-place union: `self |= other`.
    pub fn union_with(&mut self, other: &BitSet) {
        self.assert_same_width(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    /// In-place intersection: `self &= other`.
    pub fn intersect_with(&mut self, other: &BitSet) {
        self.assert_same_width(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// In-place difference: `self &= !other`.
    pub fn difference_with(&mut self, other: &BitSet) {
        self.assert_same_width(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
    }

    /// In-place complement within `0..width`.
    pub fn complement(&mut self) {
        for w in &mut self.words {
            *w = !*w;
        }
        self.clear_padding();
    }

    /// Returns true if every bit set in `self` is also set in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.assert_same_width(other);
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Returns an iterator over all set bit indices, in ascending order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}
