//! # Cascade Resolver
//!
//! Stores positions for a set of tokens across successive filters until no
//! token is left over.
//!
//! ```text
//! round 0   tokens ──▶ [filter₀] ──accepted──▶ done
//!                          │
//!                       rejected (order kept)
//!                          ▼
//! round 1   residue ──▶ [filter₁] ──accepted──▶ done
//!                          │
//!                          ▼
//!            ...  until a round rejects nothing
//!
//! round cap reached ──▶ remaining residue stored in an exact table
//! ```
//!
//! Each round builds a fresh filter under the shared [`CascadeConfig`] and
//! inserts every token of its input with the token's offset in that input as
//! its position. Positions are therefore round-local. Filters are appended in
//! round order and never resized or removed.
//!
//! A round rejects a token only when it shares an index with an earlier token
//! of the same round that disagrees on a position bit. With a fresh filter and
//! a shrinking input every round, the residue drains quickly; the round cap
//! guarantees termination when it does not.
//!
//! ## Example
//!
//! ```
//! use bloomcascade::cascade::{CascadeConfig, CascadeResolver, CascadeStatus, CollisionSet};
//!
//! let tokens: CollisionSet = (0..200).map(|i| format!("kmer-{i}")).collect();
//! let config = CascadeConfig::default()
//!     .with_expected_elements(200)
//!     .with_position_bits(8);
//!
//! let mut resolver = CascadeResolver::new(config).unwrap();
//! let summary = resolver.resolve(tokens).unwrap();
//!
//! assert!(summary.is_complete());
//! assert!(resolver.lookup("kmer-0").is_some());
//! # assert_ne!(summary.status, CascadeStatus::Aborted);
//! ```

use super::collision::CollisionSet;
use super::config::CascadeConfig;
use super::report::{CascadeStatus, CascadeSummary, Location, Resolution, RoundReport};
use crate::core::position::fits;
use crate::error::{CascadeError, Result};
use crate::filters::{InsertOutcome, PositionalBloomFilter, Rejection};
use crate::hash::{Murmur3Hasher, PartitionedSlots, SlotStrategy, TokenHasher};
use std::collections::HashMap;
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One round's filter and the seed it was filled with.
#[derive(Debug, Clone)]
struct RoundFilter<S, H> {
    seed: u64,
    filter: PositionalBloomFilter<S, H>,
}

/// Multi-round position store with an exact fallback.
#[derive(Debug, Clone)]
pub struct CascadeResolver<S = PartitionedSlots, H = Murmur3Hasher> {
    config: CascadeConfig,
    hasher: H,
    rounds: Vec<RoundFilter<S, H>>,
    reports: Vec<RoundReport>,
    exact: HashMap<Vec<u8>, u64>,
}

impl CascadeResolver {
    /// Resolver over partitioned MurmurHash3 filters.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter of `config`.
    pub fn new(config: CascadeConfig) -> Result<Self> {
        Self::with_hasher(config, Murmur3Hasher::new())
    }
}

impl<S, H> CascadeResolver<S, H>
where
    S: SlotStrategy,
    H: TokenHasher + Clone,
{
    /// Resolver whose filters all use `hasher`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter of `config`.
    pub fn with_hasher(config: CascadeConfig, hasher: H) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            hasher,
            rounds: Vec::new(),
            reports: Vec::new(),
            exact: HashMap::new(),
        })
    }

    /// Run rounds until none rejects a token or the round cap is hit.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_with`].
    pub fn resolve(&mut self, tokens: CollisionSet) -> Result<CascadeSummary> {
        self.resolve_with(tokens, |_| ControlFlow::Continue(()))
    }

    /// Like [`Self::resolve`], calling `on_round` after every round. Returning
    /// [`ControlFlow::Break`] stops the cascade; tokens not yet stored are
    /// handed back in [`CascadeSummary::unresolved`].
    ///
    /// On error every round stored so far is dropped, so the resolver is
    /// empty again and `resolve` may be retried.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::InvalidConfiguration`] if the resolver already
    ///   stored tokens, or a round input has more tokens than
    ///   `2^position_bits`
    /// - any filter sizing error for a round
    pub fn resolve_with<F>(&mut self, tokens: CollisionSet, on_round: F) -> Result<CascadeSummary>
    where
        F: FnMut(&RoundReport) -> ControlFlow<()>,
    {
        if !self.rounds.is_empty() || !self.exact.is_empty() {
            return Err(CascadeError::invalid_configuration(
                "resolver already holds a resolved token set",
            ));
        }

        let result = self.run_cascade(tokens, on_round);
        if let Err(err) = &result {
            warn!(
                rounds = self.rounds.len(),
                error = %err,
                "cascade failed, dropping stored rounds"
            );
            self.rounds.clear();
            self.reports.clear();
            self.exact.clear();
        }
        result
    }

    fn run_cascade<F>(&mut self, tokens: CollisionSet, mut on_round: F) -> Result<CascadeSummary>
    where
        F: FnMut(&RoundReport) -> ControlFlow<()>,
    {
        info!(
            tokens = tokens.len(),
            max_rounds = self.config.max_rounds,
            position_bits = self.config.position_bits,
            "starting cascade"
        );

        let mut pending = tokens;
        let mut resolved = 0;
        let mut exact = 0;
        let mut unresolved = CollisionSet::new();

        let status = loop {
            if pending.is_empty() {
                break CascadeStatus::Converged;
            }

            let round = self.rounds.len();
            if round == self.config.max_rounds {
                warn!(
                    rounds = round,
                    residue = pending.len(),
                    "round cap reached, storing residue exactly"
                );
                exact = self.store_exact(&pending);
                break CascadeStatus::RoundCapReached;
            }

            let (filter, report, next) = self.run_round(round, &pending)?;
            info!(
                round = report.round,
                seed = report.seed,
                input = report.input,
                accepted = report.accepted,
                rejected = report.rejected,
                "round complete"
            );

            resolved += report.accepted;
            self.rounds.push(filter);
            self.reports.push(report);
            pending = next;

            if on_round(&report).is_break() && !pending.is_empty() {
                warn!(
                    rounds = self.rounds.len(),
                    residue = pending.len(),
                    "cascade aborted"
                );
                unresolved = pending;
                break CascadeStatus::Aborted;
            }
        };

        info!(
            ?status,
            rounds = self.rounds.len(),
            resolved,
            exact,
            "cascade finished"
        );

        Ok(CascadeSummary {
            status,
            rounds: self.reports.clone(),
            resolved,
            exact,
            unresolved,
        })
    }

    fn run_round(
        &self,
        round: usize,
        input: &CollisionSet,
    ) -> Result<(RoundFilter<S, H>, RoundReport, CollisionSet)> {
        let position_bits = self.config.position_bits;
        if !input.is_empty() && !fits((input.len() - 1) as u64, position_bits) {
            return Err(CascadeError::invalid_configuration(format!(
                "round {} has {} tokens, more than {} position bits can address",
                round,
                input.len(),
                position_bits
            )));
        }

        let seed = self.config.seed_policy.seed_for(round);
        let filter_config = self.config.filter_config(round, input.len());
        let mut filter =
            PositionalBloomFilter::<S, H>::with_hasher(&filter_config, self.hasher.clone())?;

        let mut accepted = 0;
        let mut rejected = CollisionSet::new();
        for (offset, token) in input.iter().enumerate() {
            match filter.insert_with_position(token, offset as u64, seed)? {
                InsertOutcome::Accepted => accepted += 1,
                InsertOutcome::Rejected(Rejection::InsertionConflict { .. }) => {
                    rejected.push(token);
                }
                InsertOutcome::Rejected(r @ Rejection::PositionOutOfRange { .. }) => {
                    return Err(r.into());
                }
            }
        }

        debug!(
            round,
            fill_ratio = filter.fill_ratio(),
            estimated_fp_rate = filter.estimated_fp_rate(),
            "round filter filled"
        );

        let report = RoundReport {
            round,
            seed,
            input: input.len(),
            accepted,
            rejected: rejected.len(),
            bit_count: filter.bit_count(),
            hash_count: filter.hash_count(),
        };

        Ok((RoundFilter { seed, filter }, report, rejected))
    }

    /// Store `residue` in the exact table at its offsets. A repeated token
    /// keeps its first offset. Returns the number of tokens stored.
    fn store_exact(&mut self, residue: &CollisionSet) -> usize {
        for (offset, token) in residue.iter().enumerate() {
            self.exact
                .entry(token.to_vec())
                .or_insert(offset as u64);
        }
        residue.len()
    }

    /// Locate `token`: the exact table first, then each round's filter in
    /// order. The first filter whose presence bits all match wins, so a false
    /// positive in an earlier round can shadow the true round.
    #[must_use]
    pub fn lookup<T: AsRef<[u8]> + ?Sized>(&self, token: &T) -> Option<Resolution> {
        let token = token.as_ref();
        if let Some(&position) = self.exact.get(token) {
            return Some(Resolution {
                location: Location::Exact,
                position,
            });
        }

        self.rounds.iter().enumerate().find_map(|(round, r)| {
            r.filter
                .retrieve_position(token, r.seed)
                .map(|position| Resolution {
                    location: Location::Round(round),
                    position,
                })
        })
    }

    /// Like [`Self::lookup`] but a miss is an error.
    ///
    /// # Errors
    ///
    /// [`CascadeError::NotFound`] if no round or the exact table holds it.
    pub fn require<T: AsRef<[u8]> + ?Sized>(&self, token: &T) -> Result<Resolution> {
        self.lookup(token).ok_or(CascadeError::NotFound)
    }

    /// Look up many tokens in parallel (requires `rayon` feature).
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn lookup_parallel<T>(&self, tokens: &[T]) -> Vec<Option<Resolution>>
    where
        T: AsRef<[u8]> + Sync,
        H: Sync,
    {
        tokens.par_iter().map(|token| self.lookup(token)).collect()
    }

    /// Configuration shared by all rounds.
    #[must_use]
    pub const fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Number of filter rounds run.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Filter of round `round`.
    #[must_use]
    pub fn filter(&self, round: usize) -> Option<&PositionalBloomFilter<S, H>> {
        self.rounds.get(round).map(|r| &r.filter)
    }

    /// Seed of round `round`.
    #[must_use]
    pub fn seed(&self, round: usize) -> Option<u64> {
        self.rounds.get(round).map(|r| r.seed)
    }

    /// Round filters in order.
    pub fn filters(&self) -> impl Iterator<Item = &PositionalBloomFilter<S, H>> + '_ {
        self.rounds.iter().map(|r| &r.filter)
    }

    /// Reports of the rounds run so far.
    #[must_use]
    pub fn reports(&self) -> &[RoundReport] {
        &self.reports
    }

    /// Tokens held by the exact table.
    #[must_use]
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Bytes held by all round filters.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.filters().map(PositionalBloomFilter::memory_usage).sum()
    }
}
