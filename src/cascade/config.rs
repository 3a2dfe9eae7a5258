//! Cascade configuration.

use crate::builder::DEFAULT_POSITION_BITS;
use crate::core::params::validate_position_bits;
use crate::error::{CascadeError, Result};
use crate::filters::FilterConfig;

/// Default liveness bound on the number of filter rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 32;

/// How the hash seed of each round is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeedPolicy {
    /// Every round hashes with the same seed.
    Fixed(u64),
    /// Round `r` hashes with `base + r * stride` (wrapping).
    PerRound {
        /// Seed of round 0.
        base: u64,
        /// Increment per round.
        stride: u64,
    },
}

impl SeedPolicy {
    /// Seed used by round `round`.
    #[must_use]
    pub const fn seed_for(&self, round: usize) -> u64 {
        match *self {
            Self::Fixed(seed) => seed,
            Self::PerRound { base, stride } => base.wrapping_add((round as u64).wrapping_mul(stride)),
        }
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self::Fixed(42)
    }
}

/// How each round's filter is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundSizing {
    /// Every round is sized for the configured element count.
    #[default]
    Reference,
    /// Round 0 is sized for `max(expected, input)`, later rounds for their
    /// own input only.
    Shrinking,
}

/// Parameters shared by every round of a cascade.
///
/// # Examples
///
/// ```
/// use bloomcascade::cascade::{CascadeConfig, SeedPolicy};
///
/// let config = CascadeConfig::default()
///     .with_expected_elements(1000)
///     .with_false_positive_rate(0.001)
///     .with_hash_count(10)
///     .with_position_bits(10)
///     .with_seed_policy(SeedPolicy::Fixed(42));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CascadeConfig {
    /// Estimated number of tokens.
    pub expected_elements: usize,
    /// Target false positive rate per filter.
    pub false_positive_rate: f64,
    /// Position code width. Every round input must fit: `len ≤ 2^bits`.
    pub position_bits: u32,
    /// Fixed hash function count, or `None` for the optimal count.
    pub hash_count: Option<usize>,
    /// Seed of each round.
    pub seed_policy: SeedPolicy,
    /// Filter sizing of each round.
    pub sizing: RoundSizing,
    /// Rounds run before the residue is stored exactly.
    pub max_rounds: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            expected_elements: 1000,
            false_positive_rate: 0.001,
            position_bits: DEFAULT_POSITION_BITS,
            hash_count: None,
            seed_policy: SeedPolicy::default(),
            sizing: RoundSizing::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl CascadeConfig {
    /// Set the estimated element count.
    #[must_use]
    pub const fn with_expected_elements(mut self, n: usize) -> Self {
        self.expected_elements = n;
        self
    }

    /// Set the per-filter target rate.
    #[must_use]
    pub const fn with_false_positive_rate(mut self, rate: f64) -> Self {
        self.false_positive_rate = rate;
        self
    }

    /// Set the position width.
    #[must_use]
    pub const fn with_position_bits(mut self, bits: u32) -> Self {
        self.position_bits = bits;
        self
    }

    /// Fix the hash function count.
    #[must_use]
    pub const fn with_hash_count(mut self, k: usize) -> Self {
        self.hash_count = Some(k);
        self
    }

    /// Set the seed policy.
    #[must_use]
    pub const fn with_seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.seed_policy = policy;
        self
    }

    /// Set the round sizing.
    #[must_use]
    pub const fn with_sizing(mut self, sizing: RoundSizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Set the round cap.
    #[must_use]
    pub const fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Filter config for round `round` over `input_len` tokens.
    ///
    /// Under [`RoundSizing::Shrinking`] a late round is sized for at least
    /// one token, and for as many more as it takes to give every hash
    /// function one bit of the array.
    #[must_use]
    pub fn filter_config(&self, round: usize, input_len: usize) -> FilterConfig {
        let expected = match self.sizing {
            RoundSizing::Reference => self.expected_elements,
            RoundSizing::Shrinking if round == 0 => self.expected_elements.max(input_len),
            RoundSizing::Shrinking => input_len.max(1),
        };
        let mut config = FilterConfig::new(expected, self.false_positive_rate, self.position_bits);
        if let Some(k) = self.hash_count {
            config = config.with_hash_count(k);
        }
        if self.sizing == RoundSizing::Shrinking && round > 0 {
            config = with_bit_per_hash(config);
        }
        config
    }

    /// Check every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidConfiguration`] for a zero round cap,
    /// or any filter sizing error.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(CascadeError::invalid_configuration(
                "max_rounds must be at least 1",
            ));
        }
        validate_position_bits(self.position_bits)?;
        self.filter_config(0, 0).validate()?;
        if self.sizing == RoundSizing::Shrinking {
            check_bit_per_hash(&self.filter_config(1, 1))?;
        }
        Ok(())
    }
}

/// Grow `config.expected_elements` until `m >= k`. Stops early on a sizing
/// error, which [`FilterConfig::validate`] then reports.
fn with_bit_per_hash(mut config: FilterConfig) -> FilterConfig {
    while let Ok(layout) = config.layout() {
        if layout.bit_count >= layout.hash_count {
            break;
        }
        config.expected_elements += 1;
    }
    config
}

fn check_bit_per_hash(config: &FilterConfig) -> Result<()> {
    let layout = config.layout()?;
    if layout.bit_count < layout.hash_count {
        return Err(CascadeError::invalid_configuration(format!(
            "{} bits cannot give each of {} hash functions a bit",
            layout.bit_count, layout.hash_count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CascadeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(config.sizing, RoundSizing::Reference);
        assert_eq!(config.seed_policy, SeedPolicy::Fixed(42));
    }

    #[test]
    fn test_seed_policy() {
        assert_eq!(SeedPolicy::Fixed(7).seed_for(0), 7);
        assert_eq!(SeedPolicy::Fixed(7).seed_for(9), 7);

        let policy = SeedPolicy::PerRound { base: 100, stride: 3 };
        assert_eq!(policy.seed_for(0), 100);
        assert_eq!(policy.seed_for(4), 112);

        let wrapping = SeedPolicy::PerRound {
            base: u64::MAX,
            stride: 1,
        };
        assert_eq!(wrapping.seed_for(1), 0);
    }

    #[test]
    fn test_round_sizing() {
        let config = CascadeConfig::default().with_expected_elements(1000);
        assert_eq!(config.filter_config(3, 10).expected_elements, 1000);

        let shrinking = config.with_sizing(RoundSizing::Shrinking);
        assert_eq!(shrinking.filter_config(0, 10).expected_elements, 1000);
        assert_eq!(shrinking.filter_config(0, 5000).expected_elements, 5000);
        assert_eq!(shrinking.filter_config(2, 10).expected_elements, 10);
    }

    #[test]
    fn test_shrinking_late_rounds_fit_every_hash() {
        let config = CascadeConfig::default()
            .with_false_positive_rate(0.01)
            .with_hash_count(40)
            .with_sizing(RoundSizing::Shrinking);
        assert!(config.validate().is_ok());

        // two tokens at 40 hashes and 1% give 37 bits, three give 55
        let late = config.filter_config(20, 2);
        assert_eq!(late.expected_elements, 3);
        let layout = late.layout().unwrap();
        assert!(layout.bit_count >= 40);

        assert_eq!(config.filter_config(5, 1).expected_elements, 3);
        assert_eq!(config.filter_config(5, 500).expected_elements, 500);
    }

    #[test]
    fn test_hash_count_forwarded() {
        let config = CascadeConfig::default().with_hash_count(10);
        assert_eq!(config.filter_config(0, 1).hash_count, Some(10));
        assert_eq!(CascadeConfig::default().filter_config(0, 1).hash_count, None);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(CascadeConfig::default().with_max_rounds(0).validate().is_err());
        assert!(CascadeConfig::default().with_position_bits(0).validate().is_err());
        assert!(CascadeConfig::default()
            .with_false_positive_rate(0.0)
            .validate()
            .is_err());
        assert!(CascadeConfig::default()
            .with_expected_elements(0)
            .validate()
            .is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bincode_round_trip() {
        let config = CascadeConfig::default()
            .with_hash_count(10)
            .with_seed_policy(SeedPolicy::PerRound { base: 1, stride: 2 })
            .with_sizing(RoundSizing::Shrinking);
        let bytes = bincode::serialize(&config).unwrap();
        let decoded: CascadeConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, config);
    }
}
