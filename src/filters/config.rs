//! Filter configuration and layout resolution.

use crate::core::params::{
    chunk_count, hash_count_for_size, size_for_fixed_hash_count, size_for_target_rate,
    validate_position_bits,
};
use crate::error::{CascadeError, Result};

/// Resolved `(m, k)` plus the derived chunk count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterLayout {
    /// Bits per array (`m`).
    pub bit_count: usize,
    /// Hash functions (`k`).
    pub hash_count: usize,
    /// Position arrays, `⌈position_bits / k⌉`.
    pub chunk_count: usize,
}

/// Parameters a [`PositionalBloomFilter`](super::PositionalBloomFilter) is
/// sized from.
///
/// With `hash_count == None` the filter uses the optimal `k` for the sized
/// array. With a fixed `k` the array grows to keep the target rate, which
/// trades bits per array for fewer position chunks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Expected number of tokens.
    pub expected_elements: usize,
    /// Target false positive rate, in `(0, 1)`.
    pub false_positive_rate: f64,
    /// Width of stored position codes.
    pub position_bits: u32,
    /// Fixed hash function count, or `None` for the optimal count.
    pub hash_count: Option<usize>,
}

impl FilterConfig {
    /// Config with the optimal hash count.
    #[must_use]
    pub const fn new(expected_elements: usize, false_positive_rate: f64, position_bits: u32) -> Self {
        Self {
            expected_elements,
            false_positive_rate,
            position_bits,
            hash_count: None,
        }
    }

    /// Fix the hash function count.
    #[must_use]
    pub const fn with_hash_count(mut self, hash_count: usize) -> Self {
        self.hash_count = Some(hash_count);
        self
    }

    /// Same config sized for a different element count.
    #[must_use]
    pub const fn with_expected_elements(mut self, expected_elements: usize) -> Self {
        self.expected_elements = expected_elements;
        self
    }

    /// Compute the array layout.
    ///
    /// # Errors
    ///
    /// Any sizing error, or [`CascadeError::InvalidPositionWidth`].
    pub fn layout(&self) -> Result<FilterLayout> {
        validate_position_bits(self.position_bits)?;

        let (bit_count, hash_count) = match self.hash_count {
            Some(0) => return Err(CascadeError::invalid_hash_count(0)),
            Some(k) => (
                size_for_fixed_hash_count(self.expected_elements, self.false_positive_rate, k)?,
                k,
            ),
            None => {
                let m = size_for_target_rate(self.expected_elements, self.false_positive_rate)?;
                (m, hash_count_for_size(self.expected_elements, m)?)
            }
        };

        Ok(FilterLayout {
            bit_count,
            hash_count,
            chunk_count: chunk_count(self.position_bits, hash_count)?,
        })
    }

    /// Check that a layout can be computed.
    ///
    /// # Errors
    ///
    /// See [`Self::layout`].
    pub fn validate(&self) -> Result<()> {
        self.layout().map(|_| ())
    }
}
