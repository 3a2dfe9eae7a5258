//! Round reports, cascade summaries and lookup results.

use super::collision::CollisionSet;

/// Outcome of one cascade round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundReport {
    /// Zero-based round number.
    pub round: usize,
    /// Hash seed of the round.
    pub seed: u64,
    /// Tokens offered to the round.
    pub input: usize,
    /// Tokens stored by the round's filter.
    pub accepted: usize,
    /// Tokens passed on to the next round.
    pub rejected: usize,
    /// Bits per array of the round's filter.
    pub bit_count: usize,
    /// Hash functions of the round's filter.
    pub hash_count: usize,
}

impl RoundReport {
    /// `rejected / input`, `0.0` for an empty round.
    #[must_use]
    pub fn rejection_rate(&self) -> f64 {
        if self.input == 0 {
            0.0
        } else {
            self.rejected as f64 / self.input as f64
        }
    }
}

/// Why a cascade stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CascadeStatus {
    /// A round rejected nothing.
    Converged,
    /// The round cap was hit; the residue was stored exactly.
    RoundCapReached,
    /// The caller stopped the cascade between rounds.
    Aborted,
}

/// Result of [`CascadeResolver::resolve`](super::CascadeResolver::resolve).
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeSummary {
    /// Termination reason.
    pub status: CascadeStatus,
    /// One report per round run, in order.
    pub rounds: Vec<RoundReport>,
    /// Tokens stored in filters.
    pub resolved: usize,
    /// Tokens stored in the exact fallback.
    pub exact: usize,
    /// Tokens left unstored. Non-empty only when aborted.
    pub unresolved: CollisionSet,
}

impl CascadeSummary {
    /// Number of filter rounds run.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// True if every token ended up stored somewhere.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// Filter of the given round.
    Round(usize),
    /// Exact fallback table.
    Exact,
}

/// A token's location and its position there.
///
/// Positions are local: the offset within that round's input, or within the
/// residue for [`Location::Exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    /// Round or exact table.
    pub location: Location,
    /// Local position.
    pub position: u64,
}
