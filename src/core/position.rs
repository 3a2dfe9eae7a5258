//! Fixed-width position codes.
//!
//! A position is stored as a `position_bits`-wide code, least significant bit
//! first. With `k` hash functions, code bit `b·k + i` lives in position chunk
//! `b` at the index produced by hash slot `i`:
//!
//! ```text
//! position_bits = 10, k = 4  →  3 chunks
//!
//! code bit:   0 1 2 3 | 4 5 6 7 | 8 9
//! chunk:      0 0 0 0 | 1 1 1 1 | 2 2
//! slot:       0 1 2 3 | 0 1 2 3 | 0 1
//! ```

use crate::core::params::validate_position_bits;
use crate::error::{CascadeError, Result};

/// Largest position representable in `position_bits` bits.
#[must_use]
#[inline]
pub const fn max_position(position_bits: u32) -> u64 {
    if position_bits >= 64 {
        u64::MAX
    } else {
        (1u64 << position_bits) - 1
    }
}

/// True if `position < 2^position_bits`.
#[must_use]
#[inline]
pub const fn fits(position: u64, position_bits: u32) -> bool {
    position <= max_position(position_bits)
}

/// A position value together with its code width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCode {
    value: u64,
    bits: u32,
}

impl PositionCode {
    /// Encode `position` as a `position_bits`-wide code.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::InvalidPositionWidth`] if the width is outside `[1, 64]`
    /// - [`CascadeError::PositionOutOfRange`] if `position >= 2^position_bits`
    pub fn encode(position: u64, position_bits: u32) -> Result<Self> {
        validate_position_bits(position_bits)?;
        if !fits(position, position_bits) {
            return Err(CascadeError::position_out_of_range(position, position_bits));
        }
        Ok(Self {
            value: position,
            bits: position_bits,
        })
    }

    /// Code bit `k`, least significant first.
    ///
    /// # Panics
    ///
    /// Panics if `k >= width`.
    #[must_use]
    #[inline]
    pub fn bit(&self, k: usize) -> bool {
        assert!(k < self.bits as usize, "code bit {} beyond width {}", k, self.bits);
        (self.value >> k) & 1 == 1
    }

    /// Code width in bits.
    #[must_use]
    #[inline]
    pub const fn width(&self) -> u32 {
        self.bits
    }

    /// Encoded position.
    #[must_use]
    #[inline]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Code bits, least significant first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bits as usize).map(move |k| self.bit(k))
    }
}

/// Encode `position` as a bit sequence, least significant bit first.
///
/// # Errors
///
/// See [`PositionCode::encode`].
///
/// # Examples
///
/// ```
/// use bloomcascade::core::position::encode_position;
///
/// let bits = encode_position(6, 4).unwrap();
/// assert_eq!(bits, vec![false, true, true, false]);
/// ```
pub fn encode_position(position: u64, position_bits: u32) -> Result<Vec<bool>> {
    Ok(PositionCode::encode(position, position_bits)?.bits().collect())
}

/// Reassemble a position from a least-significant-first bit sequence.
///
/// # Errors
///
/// Returns [`CascadeError::InvalidPositionWidth`] for an empty sequence or
/// one longer than 64 bits.
pub fn decode_position(bits: &[bool]) -> Result<u64> {
    if bits.is_empty() || bits.len() > 64 {
        return Err(CascadeError::invalid_position_width(bits.len() as u32));
    }
    Ok(bits
        .iter()
        .enumerate()
        .fold(0u64, |acc, (k, &bit)| if bit { acc | (1u64 << k) } else { acc }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_position() {
        assert_eq!(max_position(1), 1);
        assert_eq!(max_position(10), 1023);
        assert_eq!(max_position(63), (1u64 << 63) - 1);
        assert_eq!(max_position(64), u64::MAX);
    }

    #[test]
    fn test_fits() {
        assert!(fits(1023, 10));
        assert!(!fits(1024, 10));
        assert!(fits(u64::MAX, 64));
    }

    #[test]
    fn test_encode_is_lsb_first() {
        assert_eq!(
            encode_position(42, 8).unwrap(),
            vec![false, true, false, true, false, true, false, false]
        );
    }

    #[test]
    fn test_decode_matches_encode() {
        let bits = encode_position(42, 10).unwrap();
        assert_eq!(decode_position(&bits).unwrap(), 42);
        assert_eq!(decode_position(&[true, true, false, false]).unwrap(), 3);
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert!(matches!(
            encode_position(1024, 10),
            Err(CascadeError::PositionOutOfRange {
                position: 1024,
                position_bits: 10
            })
        ));
    }

    #[test]
    fn test_encode_rejects_bad_width() {
        assert!(encode_position(0, 0).is_err());
        assert!(encode_position(0, 65).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_width() {
        assert!(decode_position(&[]).is_err());
        assert!(decode_position(&[false; 65]).is_err());
    }

    #[test]
    fn test_full_width_code() {
        let code = PositionCode::encode(u64::MAX, 64).unwrap();
        assert!(code.bits().all(|b| b));
        assert_eq!(code.width(), 64);
    }
}
