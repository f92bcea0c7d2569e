use std::collections::HashMap;

use alloy_primitives::U256;

/// A growable bit-set indexed by absolute queue index, stored as one 256-bit
/// word per 256 indices so the allocation stays proportional to the touched
/// range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagedBitmap {
    words: HashMap<u64, U256>,
}

impl PagedBitmap {
    /// Returns a new empty [`PagedBitmap`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bit at the given index.
    pub fn get(&self, index: u64) -> bool {
        self.words
            .get(&(index / 256))
            .is_some_and(|word| word.bit((index % 256) as usize))
    }

    /// Sets the bit at the given index.
    pub fn set(&mut self, index: u64) {
        let word = self.words.entry(index / 256).or_default();
        *word |= U256::from(1) << ((index % 256) as usize);
    }

    /// Applies the low `count` bits of `bits` starting at `start`: bit `i` of
    /// `bits` is ORed into position `start + i`.
    pub fn apply_word(&mut self, start: u64, count: u64, bits: U256) {
        for i in 0..count {
            if bits.bit(i as usize) {
                self.set(start + i);
            }
        }
    }

    /// Clears all bits in `start..end`.
    pub fn clear_range(&mut self, start: u64, end: u64) {
        for index in start..end {
            if let Some(word) = self.words.get_mut(&(index / 256)) {
                *word &= !(U256::from(1) << ((index % 256) as usize));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_set_and_get_across_word_boundaries() {
        let mut bitmap = PagedBitmap::new();
        for index in [0u64, 1, 255, 256, 511, 1 << 20] {
            assert!(!bitmap.get(index));
            bitmap.set(index);
            assert!(bitmap.get(index));
        }
        assert!(!bitmap.get(2));
        assert!(!bitmap.get(257));
    }

    #[test]
    fn test_should_apply_unaligned_word() {
        let mut bitmap = PagedBitmap::new();
        // bits 0 and 2 of the word land at 250 and 252.
        bitmap.apply_word(250, 10, U256::from(0b101));
        assert!(bitmap.get(250));
        assert!(!bitmap.get(251));
        assert!(bitmap.get(252));
        assert!(!bitmap.get(253));
    }

    #[test]
    fn test_should_clear_range() {
        let mut bitmap = PagedBitmap::new();
        bitmap.apply_word(0, 256, U256::MAX);
        bitmap.clear_range(10, 200);
        assert!(bitmap.get(9));
        assert!(!bitmap.get(10));
        assert!(!bitmap.get(199));
        assert!(bitmap.get(200));
    }
}
