//! Error types for bloomcascade operations.
//!
//! Construction errors (bad sizes, rates, hash counts or position widths) are
//! fatal for the filter being built. Insert-time rejections are routine and
//! travel as [`crate::filters::Rejection`] values; they convert into the
//! matching variant here for callers that prefer `?` propagation.
//!
//! # Error Propagation
//!
//! ```
//! use bloomcascade::{CascadeError, Result};
//! use bloomcascade::core::params::{hash_count_for_size, size_for_target_rate};
//!
//! fn sizing(n: usize, fp: f64) -> Result<(usize, usize)> {
//!     let m = size_for_target_rate(n, fp)?;
//!     let k = hash_count_for_size(n, m)?;
//!     Ok((m, k))
//! }
//! # assert!(sizing(1000, 0.01).is_ok());
//! # assert!(matches!(sizing(0, 0.01), Err(CascadeError::InvalidElementCount { .. })));
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CascadeError>;

/// Errors produced by filters, sizing functions and the cascade driver.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeError {
    /// Generic configuration problem detected at construction time.
    InvalidConfiguration {
        /// Human-readable description.
        message: String,
    },

    /// False positive rate outside `(0, 1)`.
    FalsePositiveRateOutOfBounds {
        /// Offending rate.
        fp_rate: f64,
    },

    /// Element count of zero.
    InvalidElementCount {
        /// Offending count.
        count: usize,
    },

    /// Hash count of zero, or larger than the bit array can hold.
    InvalidHashCount {
        /// Offending count.
        count: usize,
    },

    /// Bit array size of zero or beyond addressable memory.
    InvalidFilterSize {
        /// Offending size in bits.
        size: usize,
    },

    /// Position code width outside `[1, 64]`.
    InvalidPositionWidth {
        /// Offending width in bits.
        bits: u32,
    },

    /// Position does not fit in the configured position width.
    PositionOutOfRange {
        /// Position that was refused.
        position: u64,
        /// Configured width.
        position_bits: u32,
    },

    /// Partial collision whose overlapping position bit disagrees.
    InsertionConflict {
        /// Position chunk holding the disagreeing bit.
        chunk: usize,
        /// Hash slot holding the disagreeing bit.
        slot: usize,
        /// Global bit index (in the presence array) of the disagreement.
        bit_index: usize,
    },

    /// Token is not present in the filter.
    NotFound,

    /// Slot number or bit index outside its valid range.
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Exclusive upper bound.
        length: usize,
    },

    /// Token cannot be written as one line of a token stream: it is empty,
    /// holds `\n`, or ends in `\r`.
    UnwritableToken {
        /// Offset of the token in its set.
        offset: usize,
    },

    /// Reading or writing a token stream failed.
    Io {
        /// Rendered I/O error.
        message: String,
    },
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { message } => {
                write!(f, "Invalid filter configuration: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidElementCount { count } => {
                write!(
                    f,
                    "Invalid element count: {}. Expected elements must be greater than 0.",
                    count
                )
            }
            Self::InvalidHashCount { count } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be at least 1 and no larger than the bit array.",
                    count
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be positive and within memory limits.",
                    size
                )
            }
            Self::InvalidPositionWidth { bits } => {
                write!(
                    f,
                    "Invalid position width: {} bits. Must be in range [1, 64].",
                    bits
                )
            }
            Self::PositionOutOfRange {
                position,
                position_bits,
            } => {
                write!(
                    f,
                    "Position {} does not fit in {} position bits",
                    position, position_bits
                )
            }
            Self::InsertionConflict {
                chunk,
                slot,
                bit_index,
            } => {
                write!(
                    f,
                    "Insertion conflict at bit {} (chunk {}, slot {}): existing position bit disagrees",
                    bit_index, chunk, slot
                )
            }
            Self::NotFound => write!(f, "Token not found in filter"),
            Self::IndexOutOfRange { index, length } => {
                write!(f, "Index {} out of range for length {}", index, length)
            }
            Self::UnwritableToken { offset } => {
                write!(
                    f,
                    "Token at offset {} cannot be written as a line: it is empty, holds a newline or ends in a carriage return",
                    offset
                )
            }
            Self::Io { message } => write!(f, "I/O error: {}.", message),
        }
    }
}

impl std::error::Error for CascadeError {}

impl From<std::io::Error> for CascadeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl CascadeError {
    /// Create an `InvalidConfiguration` error with a formatted message.
    #[must_use]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidElementCount` error.
    #[must_use]
    pub fn invalid_element_count(count: usize) -> Self {
        Self::InvalidElementCount { count }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize) -> Self {
        Self::InvalidHashCount { count }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create an `InvalidPositionWidth` error.
    #[must_use]
    pub fn invalid_position_width(bits: u32) -> Self {
        Self::InvalidPositionWidth { bits }
    }

    /// Create a `PositionOutOfRange` error.
    #[must_use]
    pub fn position_out_of_range(position: u64, position_bits: u32) -> Self {
        Self::PositionOutOfRange {
            position,
            position_bits,
        }
    }

    /// Create an `InsertionConflict` error.
    #[must_use]
    pub fn insertion_conflict(chunk: usize, slot: usize, bit_index: usize) -> Self {
        Self::InsertionConflict {
            chunk,
            slot,
            bit_index,
        }
    }

    /// Create an `UnwritableToken` error.
    #[must_use]
    pub fn unwritable_token(offset: usize) -> Self {
        Self::UnwritableToken { offset }
    }

    /// Create an `IndexOutOfRange` error.
    #[must_use]
    pub fn index_out_of_range(index: usize, length: usize) -> Self {
        Self::IndexOutOfRange { index, length }
    }

    /// True for every error raised while validating sizes, rates, hash
    /// counts or position widths.
    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::FalsePositiveRateOutOfBounds { .. }
                | Self::InvalidElementCount { .. }
                | Self::InvalidHashCount { .. }
                | Self::InvalidFilterSize { .. }
                | Self::InvalidPositionWidth { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_configuration() {
        let err = CascadeError::invalid_configuration("partition size is zero");
        let display = format!("{err}");
        assert!(display.contains("Invalid filter configuration"));
        assert!(display.contains("partition size is zero"));
        assert!(display.ends_with('.'));
    }

    #[test]
    fn test_error_display_fp_rate_out_of_bounds() {
        let err = CascadeError::fp_rate_out_of_bounds(1.5);
        let display = format!("{err}");
        assert!(display.contains("1.5"));
        assert!(display.contains("(0, 1)"));
    }

    #[test]
    fn test_error_display_position_out_of_range() {
        let err = CascadeError::position_out_of_range(1024, 10);
        let display = format!("{err}");
        assert!(display.contains("1024"));
        assert!(display.contains("10 position bits"));
    }

    #[test]
    fn test_error_display_insertion_conflict() {
        let err = CascadeError::insertion_conflict(1, 3, 777);
        let display = format!("{err}");
        assert!(display.contains("777"));
        assert!(display.contains("chunk 1"));
        assert!(display.contains("slot 3"));
    }

    #[test]
    fn test_error_display_index_out_of_range() {
        let err = CascadeError::index_out_of_range(12, 10);
        let display = format!("{}", err);
        assert!(display.contains("12"));
        assert!(display.contains("10"));
    }

    #[test]
    fn test_error_display_unwritable_token() {
        let err = CascadeError::unwritable_token(2);
        let display = format!("{err}");
        assert!(display.contains("offset 2"));
        assert!(!err.is_invalid_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        let err: CascadeError = io.into();
        assert!(matches!(err, CascadeError::Io { ref message } if message.contains("missing.txt")));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(CascadeError::invalid_element_count(0).is_invalid_configuration());
        assert!(CascadeError::fp_rate_out_of_bounds(0.0).is_invalid_configuration());
        assert!(CascadeError::invalid_hash_count(0).is_invalid_configuration());
        assert!(CascadeError::invalid_filter_size(0).is_invalid_configuration());
        assert!(CascadeError::invalid_position_width(65).is_invalid_configuration());
        assert!(!CascadeError::position_out_of_range(1, 0).is_invalid_configuration());
        assert!(!CascadeError::insertion_conflict(0, 0, 0).is_invalid_configuration());
        assert!(!CascadeError::NotFound.is_invalid_configuration());
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> =
            Box::new(CascadeError::invalid_configuration("test"));
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(CascadeError::invalid_element_count(0))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
