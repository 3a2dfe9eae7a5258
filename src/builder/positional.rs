//! Builder for positional Bloom filters.
//!
//! # Type-State Pattern
//!
//! ```text
//! Initial → WithElements → Complete → PositionalBloomFilter<S, H>
//!     ↓            ↓              ↓
//!   .expected_elements()  .false_positive_rate()  .build()
//! ```
//!
//! `position_bits` and `hash_count` are optional and may be set in any state
//! after `expected_elements`.
//!
//! # Examples
//!
//! ```
//! use bloomcascade::builder::PositionalFilterBuilder;
//! use bloomcascade::filters::PositionalBloomFilter;
//!
//! let filter: PositionalBloomFilter = PositionalFilterBuilder::new()
//!     .expected_elements(1_000)
//!     .false_positive_rate(0.001)
//!     .position_bits(10)
//!     .hash_count(10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(filter.bit_count(), 14378);
//! assert_eq!(filter.chunk_count(), 1);
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use bloomcascade::builder::PositionalFilterBuilder;
//! use bloomcascade::filters::PositionalBloomFilter;
//!
//! let result: Result<PositionalBloomFilter, _> = PositionalFilterBuilder::new()
//!     .expected_elements(0)
//!     .false_positive_rate(0.01)
//!     .build();
//!
//! assert!(result.is_err());
//! ```

use crate::error::Result;
use crate::filters::{FilterConfig, PositionalBloomFilter};
use crate::hash::{SlotStrategy, TokenHasher};
use std::marker::PhantomData;

/// Position width used when none is given.
pub const DEFAULT_POSITION_BITS: u32 = 20;

/// Type-state marker: nothing set.
pub struct Initial;

/// Type-state marker: element count set.
pub struct WithElements;

/// Type-state marker: all required parameters set.
pub struct Complete;

/// Builder for [`PositionalBloomFilter`] with type-state guarantees.
#[derive(Debug, Clone)]
pub struct PositionalFilterBuilder<State> {
    config: FilterConfig,
    _state: PhantomData<State>,
}

impl PositionalFilterBuilder<Initial> {
    /// Create a builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FilterConfig::new(0, 0.0, DEFAULT_POSITION_BITS),
            _state: PhantomData,
        }
    }

    /// Expected number of tokens (required, must be > 0).
    #[must_use]
    pub fn expected_elements(self, count: usize) -> PositionalFilterBuilder<WithElements> {
        self.transition(self.config.with_expected_elements(count))
    }
}

impl Default for PositionalFilterBuilder<Initial> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> PositionalFilterBuilder<State> {
    fn transition<Next>(&self, config: FilterConfig) -> PositionalFilterBuilder<Next> {
        PositionalFilterBuilder {
            config,
            _state: PhantomData,
        }
    }
}

impl PositionalFilterBuilder<WithElements> {
    /// Target false positive rate (required, in `(0, 1)`).
    #[must_use]
    pub fn false_positive_rate(self, fp_rate: f64) -> PositionalFilterBuilder<Complete> {
        let mut config = self.config;
        config.false_positive_rate = fp_rate;
        self.transition(config)
    }

    /// Position code width (optional, defaults to [`DEFAULT_POSITION_BITS`]).
    #[must_use]
    pub fn position_bits(mut self, bits: u32) -> Self {
        self.config.position_bits = bits;
        self
    }

    /// Fix the hash function count (optional, defaults to optimal).
    #[must_use]
    pub fn hash_count(mut self, k: usize) -> Self {
        self.config.hash_count = Some(k);
        self
    }
}

impl PositionalFilterBuilder<Complete> {
    /// Position code width (optional, defaults to [`DEFAULT_POSITION_BITS`]).
    #[must_use]
    pub fn position_bits(mut self, bits: u32) -> Self {
        self.config.position_bits = bits;
        self
    }

    /// Fix the hash function count (optional, defaults to optimal).
    #[must_use]
    pub fn hash_count(mut self, k: usize) -> Self {
        self.config.hash_count = Some(k);
        self
    }

    /// The validated configuration, without allocating a filter.
    ///
    /// # Errors
    ///
    /// Any sizing error for the collected parameters.
    pub fn config(&self) -> Result<FilterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build a filter with the default hasher.
    ///
    /// # Errors
    ///
    /// Returns an error if `expected_elements == 0`, the rate is outside
    /// `(0, 1)`, the position width is outside `[1, 64]`, or the strategy
    /// rejects the resulting layout.
    pub fn build<S, H>(self) -> Result<PositionalBloomFilter<S, H>>
    where
        S: SlotStrategy,
        H: TokenHasher + Default,
    {
        PositionalBloomFilter::from_config(&self.config)
    }

    /// Build a filter with an explicit hasher.
    ///
    /// # Errors
    ///
    /// See [`Self::build`].
    pub fn build_with_hasher<S, H>(self, hasher: H) -> Result<PositionalBloomFilter<S, H>>
    where
        S: SlotStrategy,
        H: TokenHasher,
    {
        PositionalBloomFilter::with_hasher(&self.config, hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CascadeError;
    use crate::hash::{Murmur3Hasher, UniformSlots};

    #[test]
    fn test_builder_minimal() {
        let filter: PositionalBloomFilter = PositionalFilterBuilder::new()
            .expected_elements(1000)
            .false_positive_rate(0.01)
            .build()
            .unwrap();

        assert_eq!(filter.position_bits(), DEFAULT_POSITION_BITS);
        assert_eq!(filter.hash_count(), 7);
        assert_eq!(filter.accepted_count(), 0);
    }

    #[test]
    fn test_builder_optional_before_rate() {
        let config = PositionalFilterBuilder::new()
            .expected_elements(1000)
            .position_bits(10)
            .hash_count(10)
            .false_positive_rate(0.001)
            .config()
            .unwrap();

        assert_eq!(config.position_bits, 10);
        assert_eq!(config.hash_count, Some(10));
        assert_eq!(config.layout().unwrap().bit_count, 14378);
    }

    #[test]
    fn test_builder_uniform_with_hasher() {
        let mut filter: PositionalBloomFilter<UniformSlots, Murmur3Hasher> =
            PositionalFilterBuilder::new()
                .expected_elements(100)
                .false_positive_rate(0.01)
                .position_bits(8)
                .build_with_hasher(Murmur3Hasher::new())
                .unwrap();

        assert!(filter.insert_with_position("ACGT", 255, 0).unwrap().is_accepted());
        assert_eq!(filter.retrieve_position("ACGT", 0), Some(255));
    }

    #[test]
    fn test_builder_invalid_rate() {
        let result: Result<PositionalBloomFilter> = PositionalFilterBuilder::new()
            .expected_elements(100)
            .false_positive_rate(1.5)
            .build();

        assert!(matches!(
            result,
            Err(CascadeError::FalsePositiveRateOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_builder_invalid_width() {
        let result = PositionalFilterBuilder::new()
            .expected_elements(100)
            .false_positive_rate(0.01)
            .position_bits(65)
            .config();

        assert!(matches!(result, Err(CascadeError::InvalidPositionWidth { bits: 65 })));
    }
}
