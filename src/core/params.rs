//! Sizing policy for positional Bloom filters.
//!
//! Given:
//! - `n`: expected number of tokens
//! - `ε`: target false positive rate
//! - `k`: number of hash functions
//!
//! Sizing formulas:
//! - `m = ⌈-n × ln(ε) / (ln 2)²⌉` (bits, optimal k)
//! - `k = max(1, round((m/n) × ln 2))`
//! - `m = ⌈-(k × n) / ln(1 - ε^(1/k))⌉` (bits, caller-fixed k)
//!
//! Expected false positive rate:
//! - `p = (1 - e^(-kn/m))^k`
//!
//! Every position chunk is a full-size bit array, so the memory cost of a
//! filter is `m × (1 + ⌈positionBits / k⌉)` bits. A larger fixed `k` buys
//! fewer position chunks at the price of a larger `m`.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{CascadeError, Result};
use std::f64::consts::LN_2;

/// (ln 2)² ≈ 0.4804530139182014
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Widest supported position code.
pub const MAX_POSITION_BITS: u32 = 64;

/// Narrowest supported position code.
pub const MIN_POSITION_BITS: u32 = 1;

#[inline]
fn validate_rate(fp_rate: f64) -> Result<()> {
    // Written this way so NaN is rejected too.
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
        return Err(CascadeError::fp_rate_out_of_bounds(fp_rate));
    }
    Ok(())
}

#[inline]
fn checked_bits(m: f64) -> Result<usize> {
    if !m.is_finite() || m > (usize::MAX / 2) as f64 {
        return Err(CascadeError::invalid_configuration(format!(
            "calculated filter size {:.0} exceeds reasonable bounds",
            m
        )));
    }

    let m_final = m.ceil() as usize;
    if m_final == 0 {
        return Err(CascadeError::invalid_filter_size(0));
    }
    Ok(m_final)
}

/// Bit array size for `n` tokens at target rate `fp_rate`, assuming the
/// optimal hash count will be used.
///
/// # Errors
///
/// - [`CascadeError::InvalidElementCount`] if `n == 0`
/// - [`CascadeError::FalsePositiveRateOutOfBounds`] if `fp_rate ∉ (0, 1)`
/// - [`CascadeError::InvalidFilterSize`] if the result rounds to zero
///
/// # Examples
///
/// ```
/// use bloomcascade::core::params::size_for_target_rate;
///
/// assert_eq!(size_for_target_rate(1000, 0.01).unwrap(), 9586);
/// assert_eq!(size_for_target_rate(1000, 0.001).unwrap(), 14378);
/// ```
pub fn size_for_target_rate(n: usize, fp_rate: f64) -> Result<usize> {
    if n == 0 {
        return Err(CascadeError::invalid_element_count(n));
    }
    validate_rate(fp_rate)?;

    let m = -(n as f64) * fp_rate.ln() / LN2_SQUARED;
    checked_bits(m)
}

/// Optimal hash function count for `n` tokens in `m` bits.
///
/// Never returns less than one.
///
/// # Errors
///
/// - [`CascadeError::InvalidElementCount`] if `n == 0`
/// - [`CascadeError::InvalidFilterSize`] if `m == 0`
///
/// # Examples
///
/// ```
/// use bloomcascade::core::params::hash_count_for_size;
///
/// assert_eq!(hash_count_for_size(1000, 9586).unwrap(), 7);
/// assert_eq!(hash_count_for_size(100_000, 10).unwrap(), 1);
/// ```
pub fn hash_count_for_size(n: usize, m: usize) -> Result<usize> {
    if n == 0 {
        return Err(CascadeError::invalid_element_count(n));
    }
    if m == 0 {
        return Err(CascadeError::invalid_filter_size(m));
    }

    let k = ((m as f64 / n as f64) * LN_2).round() as usize;
    Ok(k.max(1))
}

/// Bit array size for `n` tokens at target rate `fp_rate` when the hash
/// count is fixed by the caller.
///
/// # Errors
///
/// - [`CascadeError::InvalidHashCount`] if `k == 0`
/// - [`CascadeError::InvalidElementCount`] if `n == 0`
/// - [`CascadeError::FalsePositiveRateOutOfBounds`] if `fp_rate ∉ (0, 1)`
/// - [`CascadeError::InvalidConfiguration`] if `ln(1 - ε^(1/k))` is zero
///
/// # Examples
///
/// ```
/// use bloomcascade::core::params::size_for_fixed_hash_count;
///
/// assert_eq!(size_for_fixed_hash_count(1000, 0.001, 10).unwrap(), 14378);
/// ```
pub fn size_for_fixed_hash_count(n: usize, fp_rate: f64, k: usize) -> Result<usize> {
    if k == 0 {
        return Err(CascadeError::invalid_hash_count(k));
    }
    if n == 0 {
        return Err(CascadeError::invalid_element_count(n));
    }
    validate_rate(fp_rate)?;

    let k_f64 = k as f64;
    let denominator = (1.0 - fp_rate.powf(1.0 / k_f64)).ln();
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(CascadeError::invalid_configuration(format!(
            "rate {} with {} hash functions gives a zero log denominator",
            fp_rate, k
        )));
    }

    let m = -(k_f64 * n as f64) / denominator;
    checked_bits(m)
}

/// Theoretical false positive rate after inserting `n` tokens into `m` bits
/// with `k` hash functions: `(1 - e^(-kn/m))^k`.
///
/// # Errors
///
/// - [`CascadeError::InvalidFilterSize`] if `m == 0`
/// - [`CascadeError::InvalidHashCount`] if `k == 0`
pub fn expected_fp_rate(m: usize, n: usize, k: usize) -> Result<f64> {
    if m == 0 {
        return Err(CascadeError::invalid_filter_size(m));
    }
    if k == 0 {
        return Err(CascadeError::invalid_hash_count(k));
    }
    if n == 0 {
        return Ok(0.0);
    }

    let k_f64 = k as f64;
    let prob_bit_one = 1.0 - (-(k_f64 * n as f64) / m as f64).exp();
    Ok(prob_bit_one.powf(k_f64).clamp(0.0, 1.0))
}

/// False positive rate implied by an observed presence fill ratio:
/// `fill^k`.
#[must_use]
pub fn fp_rate_from_fill(fill_ratio: f64, k: usize) -> f64 {
    fill_ratio.clamp(0.0, 1.0).powi(k as i32)
}

/// Bits per token for a target rate under optimal `k`:
/// `-ln(ε) / (ln 2)²`.
///
/// # Errors
///
/// Returns an error if `fp_rate ∉ (0, 1)`.
pub fn bits_per_element(fp_rate: f64) -> Result<f64> {
    validate_rate(fp_rate)?;
    Ok(-fp_rate.ln() / LN2_SQUARED)
}

/// Number of position bit arrays needed to hold a `position_bits`-wide code
/// when each array carries `k` bits of it: `⌈position_bits / k⌉`.
///
/// # Errors
///
/// - [`CascadeError::InvalidHashCount`] if `k == 0`
/// - [`CascadeError::InvalidPositionWidth`] if the width is outside `[1, 64]`
pub fn chunk_count(position_bits: u32, k: usize) -> Result<usize> {
    if k == 0 {
        return Err(CascadeError::invalid_hash_count(k));
    }
    validate_position_bits(position_bits)?;
    Ok((position_bits as usize + k - 1) / k)
}

/// Checks a position code width.
///
/// # Errors
///
/// Returns [`CascadeError::InvalidPositionWidth`] outside `[1, 64]`.
pub fn validate_position_bits(position_bits: u32) -> Result<()> {
    if !(MIN_POSITION_BITS..=MAX_POSITION_BITS).contains(&position_bits) {
        return Err(CascadeError::invalid_position_width(position_bits));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_BITS_1000_1PCT: usize = 9586; // ⌈9585.06⌉
    const EXPECTED_BITS_1000_0_1PCT: usize = 14378; // ⌈14377.59⌉

    #[test]
    fn test_ln2_squared_constant() {
        let expected = 0.480_453_013_918_201_4;
        assert!((LN2_SQUARED - expected).abs() < 1e-10);
    }

    #[test]
    fn test_size_for_target_rate() {
        assert_eq!(size_for_target_rate(1000, 0.01).unwrap(), EXPECTED_BITS_1000_1PCT);
        assert_eq!(
            size_for_target_rate(1000, 0.001).unwrap(),
            EXPECTED_BITS_1000_0_1PCT
        );
    }

    #[test]
    fn test_size_for_target_rate_scales_linearly() {
        let m = size_for_target_rate(1_000_000, 0.01).unwrap();
        assert!(m >= 9_585_000 && m <= 9_586_000);
    }

    #[test]
    fn test_size_for_target_rate_rejects_bad_input() {
        assert!(matches!(
            size_for_target_rate(0, 0.01),
            Err(CascadeError::InvalidElementCount { count: 0 })
        ));
        for rate in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = size_for_target_rate(1000, rate).unwrap_err();
            assert!(err.is_invalid_configuration(), "rate {rate} accepted");
        }
    }

    #[test]
    fn test_hash_count_for_size() {
        assert_eq!(hash_count_for_size(1000, EXPECTED_BITS_1000_1PCT).unwrap(), 7);
        assert_eq!(hash_count_for_size(1000, EXPECTED_BITS_1000_0_1PCT).unwrap(), 10);
        assert_eq!(hash_count_for_size(100, 2000).unwrap(), 14);
    }

    #[test]
    fn test_hash_count_for_size_floor_is_one() {
        assert_eq!(hash_count_for_size(100_000, 10).unwrap(), 1);
    }

    #[test]
    fn test_hash_count_for_size_rejects_zero() {
        assert!(hash_count_for_size(0, 100).is_err());
        assert!(hash_count_for_size(100, 0).is_err());
    }

    #[test]
    fn test_size_for_fixed_hash_count() {
        assert_eq!(size_for_fixed_hash_count(1000, 0.001, 10).unwrap(), 14378);
        assert_eq!(size_for_fixed_hash_count(1000, 0.01, 7).unwrap(), 9593);
    }

    #[test]
    fn test_size_for_fixed_hash_count_rejects_bad_input() {
        assert!(matches!(
            size_for_fixed_hash_count(1000, 0.01, 0),
            Err(CascadeError::InvalidHashCount { count: 0 })
        ));
        assert!(size_for_fixed_hash_count(0, 0.01, 7).is_err());
        assert!(size_for_fixed_hash_count(1000, 1.0, 7).is_err());
    }

    #[test]
    fn test_size_for_fixed_hash_count_zero_denominator() {
        // ε^(1/k) underflows to 0, so ln(1 - 0) == 0
        let err = size_for_fixed_hash_count(1000, 1e-300, 1).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_expected_fp_rate_matches_target() {
        let n = 1000;
        let m = size_for_target_rate(n, 0.01).unwrap();
        let k = hash_count_for_size(n, m).unwrap();
        let fp = expected_fp_rate(m, n, k).unwrap();
        assert!((fp - 0.01).abs() / 0.01 < 0.1, "got {fp}");
    }

    #[test]
    fn test_expected_fp_rate_edges() {
        assert_eq!(expected_fp_rate(1000, 0, 7).unwrap(), 0.0);
        assert!(expected_fp_rate(1000, 1000, 7).unwrap() > 0.5);
        assert!(expected_fp_rate(0, 10, 7).is_err());
        assert!(expected_fp_rate(10, 10, 0).is_err());
    }

    #[test]
    fn test_fp_rate_from_fill() {
        assert_eq!(fp_rate_from_fill(0.0, 7), 0.0);
        assert_eq!(fp_rate_from_fill(1.0, 7), 1.0);
        assert!((fp_rate_from_fill(0.5, 2) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_bits_per_element() {
        assert!((bits_per_element(0.01).unwrap() - 9.6).abs() < 0.1);
        assert!((bits_per_element(0.001).unwrap() - 14.4).abs() < 0.1);
        assert!(bits_per_element(0.0).is_err());
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(10, 10).unwrap(), 1);
        assert_eq!(chunk_count(20, 7).unwrap(), 3);
        assert_eq!(chunk_count(1, 32).unwrap(), 1);
        assert_eq!(chunk_count(64, 1).unwrap(), 64);
        for (bits, k) in [(10u32, 3usize), (64, 7), (17, 17), (5, 2)] {
            let chunks = chunk_count(bits, k).unwrap();
            assert!(chunks * k >= bits as usize);
            assert!((chunks - 1) * k < bits as usize);
        }
    }

    #[test]
    fn test_chunk_count_rejects_bad_input() {
        assert!(chunk_count(10, 0).is_err());
        assert!(chunk_count(0, 7).is_err());
        assert!(chunk_count(65, 7).is_err());
    }
}
