//! Packed bit vector backing presence and position arrays.
//!
//! `BitVec` stores bits in `u64` words, little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! Mutation takes `&mut self`. A filter's check-then-commit insert therefore
//! runs under one exclusive borrow, and no other writer can interleave
//! between the conflict scan and the commit.
//!
//! # Examples
//!
//! ```
//! use bloomcascade::core::bitvec::BitVec;
//!
//! let mut bv = BitVec::new(100).unwrap();
//! bv.set(42);
//! assert!(bv.get(42));
//! assert!(!bv.get(43));
//! assert_eq!(bv.count_ones(), 1);
//! ```

use crate::error::{CascadeError, Result};

const WORD_BITS: usize = 64;

/// Fixed-length packed bit array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    blocks: Box<[u64]>,
    len: usize,
}

impl BitVec {
    /// Allocate `num_bits` zeroed bits.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidFilterSize`] if `num_bits == 0`.
    pub fn new(num_bits: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(CascadeError::invalid_filter_size(num_bits));
        }

        let num_blocks = (num_bits + WORD_BITS - 1) / WORD_BITS;
        Ok(Self {
            blocks: vec![0u64; num_blocks].into_boxed_slice(),
            len: num_bits,
        })
    }

    /// Number of addressable bits.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false for a constructed vector; kept for API symmetry.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(
            index < self.len,
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len
        );
        self.blocks[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Read bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len
        );
        (self.blocks[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Reset every bit to zero.
    pub fn clear(&mut self) {
        self.blocks.fill(0);
    }

    /// Population count over the whole vector.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.blocks.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Population count over the half-open range `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::IndexOutOfRange`] if `start > end` or
    /// `end > len`.
    pub fn count_ones_in(&self, start: usize, end: usize) -> Result<usize> {
        if start > end || end > self.len {
            return Err(CascadeError::index_out_of_range(end.max(start), self.len + 1));
        }
        if start == end {
            return Ok(0);
        }

        let first = start / WORD_BITS;
        let last = (end - 1) / WORD_BITS;
        let head_mask = u64::MAX << (start % WORD_BITS);
        let tail_shift = WORD_BITS - 1 - (end - 1) % WORD_BITS;
        let tail_mask = u64::MAX >> tail_shift;

        if first == last {
            return Ok((self.blocks[first] & head_mask & tail_mask).count_ones() as usize);
        }

        let mut total = (self.blocks[first] & head_mask).count_ones() as usize;
        total += self.blocks[first + 1..last]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum::<usize>();
        total += (self.blocks[last] & tail_mask).count_ones() as usize;
        Ok(total)
    }

    /// Bytes held by this vector, including the header.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.blocks.len() * std::mem::size_of::<u64>() + std::mem::size_of::<Self>()
    }

    /// Number of backing `u64` words.
    #[must_use]
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let bv = BitVec::new(100).unwrap();
        assert_eq!(bv.len(), 100);
        assert_eq!(bv.num_blocks(), 2);
        assert_eq!(bv.count_ones(), 0);
    }

    #[test]
    fn test_new_zero_bits_error() {
        assert!(matches!(
            BitVec::new(0),
            Err(CascadeError::InvalidFilterSize { size: 0 })
        ));
    }

    #[test]
    fn test_set_get() {
        let mut bv = BitVec::new(128).unwrap();
        assert!(!bv.get(0));
        bv.set(0);
        bv.set(63);
        bv.set(64);
        bv.set(127);
        assert!(bv.get(0));
        assert!(bv.get(63));
        assert!(bv.get(64));
        assert!(bv.get(127));
        assert!(!bv.get(1));
        assert_eq!(bv.count_ones(), 4);
    }

    #[test]
    fn test_set_idempotent() {
        let mut bv = BitVec::new(64).unwrap();
        bv.set(10);
        bv.set(10);
        assert_eq!(bv.count_ones(), 1);
    }

    #[test]
    fn test_clear() {
        let mut bv = BitVec::new(64).unwrap();
        bv.set(10);
        bv.set(20);
        bv.clear();
        assert_eq!(bv.count_ones(), 0);
        assert!(!bv.get(10));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let bv = BitVec::new(100).unwrap();
        let _ = bv.get(100);
    }

    #[test]
    fn test_count_ones_in_single_word() {
        let mut bv = BitVec::new(64).unwrap();
        for i in [3, 4, 5, 40] {
            bv.set(i);
        }
        assert_eq!(bv.count_ones_in(0, 64).unwrap(), 4);
        assert_eq!(bv.count_ones_in(4, 6).unwrap(), 2);
        assert_eq!(bv.count_ones_in(6, 40).unwrap(), 0);
        assert_eq!(bv.count_ones_in(6, 41).unwrap(), 1);
        assert_eq!(bv.count_ones_in(10, 10).unwrap(), 0);
    }

    #[test]
    fn test_count_ones_in_spans_words() {
        let mut bv = BitVec::new(300).unwrap();
        for i in (0..300).step_by(3) {
            bv.set(i);
        }
        for (start, end) in [(0, 300), (1, 299), (62, 130), (64, 128), (100, 257)] {
            let expected = (start..end).filter(|i| i % 3 == 0).count();
            assert_eq!(bv.count_ones_in(start, end).unwrap(), expected, "[{start}, {end})");
        }
    }

    #[test]
    fn test_count_ones_in_rejects_bad_range() {
        let bv = BitVec::new(100).unwrap();
        assert!(bv.count_ones_in(50, 40).is_err());
        assert!(bv.count_ones_in(0, 101).is_err());
    }

    #[test]
    fn test_memory_usage() {
        let bv = BitVec::new(1000).unwrap();
        assert!(bv.memory_usage() >= 16 * 8);
    }
}
