//! # Positional Bloom Filter
//!
//! A Bloom filter that, besides membership, remembers a small integer
//! position for every token it accepts.
//!
//! ## Layout
//!
//! One presence array plus `⌈position_bits / k⌉` position arrays, all `m`
//! bits long and all addressed by the same `k` slot indices of a token:
//!
//! ```text
//! token ──hash──▶ idx₀ idx₁ ... idxₖ₋₁
//!
//! presence   [....1.........1....1.....]   bit idxᵢ set for every slot i
//! chunk 0    [....b₀........b₁...bₖ₋₁..]   code bits 0 .. k-1
//! chunk 1    [....bₖ........bₖ₊₁.......]   code bits k .. 2k-1
//! ...
//! ```
//!
//! Code bit `g` of the least-significant-first position code lives in chunk
//! `g / k` at the index of slot `g % k`. The last chunk may be only partly
//! covered.
//!
//! ## Insertion
//!
//! [`insert_with_position`](PositionalBloomFilter::insert_with_position) is
//! all-or-nothing. A covered `(chunk, slot)` whose presence bit is already set
//! must already hold the desired position bit; otherwise the token is
//! rejected with [`Rejection::InsertionConflict`] and no bit changes. Only
//! after the full scan are presence bits and the `1` position bits written.
//! Since a position bit at an index is never written without also setting the
//! presence bit there, bits at unset-presence indices are always `0`, and the
//! position of an accepted token stays readable however many later tokens are
//! accepted.
//!
//! Under [`UniformSlots`](crate::hash::UniformSlots) two slots of one token may
//! land on the same index. The scan also compares a token's own pending
//! writes, so a token that would disagree with itself is rejected too.
//!
//! ## Example
//!
//! ```
//! use bloomcascade::filters::{InsertOutcome, PositionalBloomFilter, Rejection};
//!
//! let mut filter = PositionalBloomFilter::new(1000, 0.01, 10).unwrap();
//!
//! assert!(filter.insert_with_position("ATCG", 42, 0).unwrap().is_accepted());
//! assert_eq!(filter.retrieve_position("ATCG", 0), Some(42));
//!
//! // same token, different position: refused, old position kept
//! let outcome = filter.insert_with_position("ATCG", 43, 0).unwrap();
//! assert!(matches!(outcome, InsertOutcome::Rejected(Rejection::InsertionConflict { .. })));
//! assert_eq!(filter.retrieve_position("ATCG", 0), Some(42));
//! ```

use super::config::{FilterConfig, FilterLayout};
use super::stats::{FilterStats, PartitionStats};
use crate::core::bitvec::BitVec;
use crate::core::params::{expected_fp_rate, fp_rate_from_fill};
use crate::core::position::{fits, PositionCode};
use crate::error::{CascadeError, Result};
use crate::hash::{Murmur3Hasher, PartitionedSlots, SlotGenerator, SlotStrategy, TokenHasher};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Why an insert was refused. No bit changed in either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    /// A shared index already stores a different position bit.
    InsertionConflict {
        /// Position chunk holding the disagreeing bit.
        chunk: usize,
        /// Hash slot addressing it.
        slot: usize,
        /// Global bit index.
        bit_index: usize,
    },
    /// The position does not fit the filter's code width.
    PositionOutOfRange {
        /// Offending position.
        position: u64,
        /// Code width of the filter.
        position_bits: u32,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", CascadeError::from(*self))
    }
}

impl From<Rejection> for CascadeError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InsertionConflict {
                chunk,
                slot,
                bit_index,
            } => CascadeError::insertion_conflict(chunk, slot, bit_index),
            Rejection::PositionOutOfRange {
                position,
                position_bits,
            } => CascadeError::position_out_of_range(position, position_bits),
        }
    }
}

/// Result of a position insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// All presence and position bits written.
    Accepted,
    /// Refused without mutation.
    Rejected(Rejection),
}

impl InsertOutcome {
    /// True for [`InsertOutcome::Accepted`].
    #[inline]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The rejection reason, if any.
    #[inline]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(r) => Some(*r),
        }
    }

    /// `Ok(())` if accepted, the matching error otherwise.
    ///
    /// # Errors
    ///
    /// [`CascadeError::InsertionConflict`] or
    /// [`CascadeError::PositionOutOfRange`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(r) => Err(r.into()),
        }
    }
}

/// Bloom filter storing a fixed-width position per accepted token.
///
/// # Type Parameters
///
/// * `S` - slot strategy, [`PartitionedSlots`] by default
/// * `H` - token hasher, [`Murmur3Hasher`] by default
///
/// Every operation takes an explicit `seed`. A token must be queried with the
/// seed it was inserted with.
#[derive(Debug, Clone)]
pub struct PositionalBloomFilter<S = PartitionedSlots, H = Murmur3Hasher> {
    presence: BitVec,
    chunks: Vec<BitVec>,
    slots: SlotGenerator<S, H>,
    layout: FilterLayout,
    config: FilterConfig,
    accepted: usize,
}

impl PositionalBloomFilter {
    /// Partitioned MurmurHash3 filter with the optimal hash count.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid rate, count or width.
    pub fn new(expected_elements: usize, fp_rate: f64, position_bits: u32) -> Result<Self> {
        Self::from_config(&FilterConfig::new(expected_elements, fp_rate, position_bits))
    }

    /// Partitioned MurmurHash3 filter with a fixed hash count.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid rate, count or width.
    pub fn with_hash_count(
        expected_elements: usize,
        fp_rate: f64,
        position_bits: u32,
        hash_count: usize,
    ) -> Result<Self> {
        Self::from_config(
            &FilterConfig::new(expected_elements, fp_rate, position_bits)
                .with_hash_count(hash_count),
        )
    }
}

impl<S, H> PositionalBloomFilter<S, H>
where
    S: SlotStrategy,
    H: TokenHasher,
{
    /// Build from a config using the hasher's default instance.
    ///
    /// # Errors
    ///
    /// See [`Self::with_hasher`].
    pub fn from_config(config: &FilterConfig) -> Result<Self>
    where
        H: Default,
    {
        Self::with_hasher(config, H::default())
    }

    /// Build from a config and an explicit hasher.
    ///
    /// The layout is resolved and the slot strategy constructed from it before
    /// any bit array is allocated.
    ///
    /// # Errors
    ///
    /// Any sizing error of [`FilterConfig::layout`], or the strategy's own
    /// layout check (e.g. partitioned slots need `m ≥ k`).
    pub fn with_hasher(config: &FilterConfig, hasher: H) -> Result<Self> {
        let layout = config.layout()?;
        let strategy = S::from_layout(layout.bit_count, layout.hash_count)?;

        let presence = BitVec::new(layout.bit_count)?;
        let chunks = (0..layout.chunk_count)
            .map(|_| BitVec::new(layout.bit_count))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            bit_count = layout.bit_count,
            hash_count = layout.hash_count,
            chunk_count = layout.chunk_count,
            position_bits = config.position_bits,
            strategy = strategy.name(),
            hasher = hasher.name(),
            "allocated positional filter"
        );

        Ok(Self {
            presence,
            chunks,
            slots: SlotGenerator::new(strategy, hasher),
            layout,
            config: *config,
            accepted: 0,
        })
    }

    /// Set the presence bits of `token` without touching position arrays.
    ///
    /// Tokens added this way read back as position `0`-bits wherever no
    /// accepted token wrote a `1`, and they constrain later position inserts
    /// like any other present index.
    ///
    /// # Errors
    ///
    /// Propagates slot strategy errors.
    pub fn presence_add<T: AsRef<[u8]> + ?Sized>(&mut self, token: &T, seed: u64) -> Result<()> {
        for idx in self.slots.slot_indices(token.as_ref(), seed)? {
            self.presence.set(idx);
        }
        Ok(())
    }

    /// True if every presence bit of `token` is set. May be a false positive,
    /// never a false negative.
    #[must_use]
    pub fn presence_contains<T: AsRef<[u8]> + ?Sized>(&self, token: &T, seed: u64) -> bool {
        self.slots
            .slot_indices(token.as_ref(), seed)
            .map_or(false, |indices| self.all_present(&indices))
    }

    /// Store `position` for `token`, all-or-nothing.
    ///
    /// Returns `Ok(Rejected(..))` for the routine refusals (conflict, position
    /// too wide); `Err` only for internal slot strategy failures.
    ///
    /// # Errors
    ///
    /// Propagates slot strategy errors.
    pub fn insert_with_position<T: AsRef<[u8]> + ?Sized>(
        &mut self,
        token: &T,
        position: u64,
        seed: u64,
    ) -> Result<InsertOutcome> {
        let position_bits = self.config.position_bits;
        if !fits(position, position_bits) {
            return Ok(InsertOutcome::Rejected(Rejection::PositionOutOfRange {
                position,
                position_bits,
            }));
        }

        let code = PositionCode::encode(position, position_bits)?;
        let indices = self.slots.slot_indices(token.as_ref(), seed)?;

        if let Some(rejection) = self.find_conflict(&indices, &code) {
            return Ok(InsertOutcome::Rejected(rejection));
        }

        if self.commit(&indices, &code) {
            self.accepted += 1;
        }
        Ok(InsertOutcome::Accepted)
    }

    /// Position stored for `token`, or `None` if any presence bit is unset.
    ///
    /// A false positive presence match returns whatever bits the shared
    /// indices hold.
    #[must_use]
    pub fn retrieve_position<T: AsRef<[u8]> + ?Sized>(&self, token: &T, seed: u64) -> Option<u64> {
        let indices = self.slots.slot_indices(token.as_ref(), seed).ok()?;
        if !self.all_present(&indices) {
            return None;
        }
        Some(self.read_code(&indices))
    }

    /// Like [`Self::retrieve_position`] but absent tokens are an error.
    ///
    /// # Errors
    ///
    /// [`CascadeError::NotFound`] if the token is absent.
    pub fn require_position<T: AsRef<[u8]> + ?Sized>(&self, token: &T, seed: u64) -> Result<u64> {
        self.retrieve_position(token, seed)
            .ok_or(CascadeError::NotFound)
    }

    /// Retrieve many positions in parallel (requires `rayon` feature).
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn retrieve_positions_parallel<T>(&self, tokens: &[T], seed: u64) -> Vec<Option<u64>>
    where
        T: AsRef<[u8]> + Sync,
    {
        tokens
            .par_iter()
            .map(|token| self.retrieve_position(token, seed))
            .collect()
    }

    /// The `k` bit indices of `token` under `seed`, in slot order.
    ///
    /// # Errors
    ///
    /// Propagates slot strategy errors.
    pub fn slot_indices<T: AsRef<[u8]> + ?Sized>(&self, token: &T, seed: u64) -> Result<Vec<usize>> {
        self.slots.slot_indices(token.as_ref(), seed)
    }

    fn all_present(&self, indices: &[usize]) -> bool {
        indices.iter().all(|&idx| self.presence.get(idx))
    }

    fn covered(&self, code: &PositionCode) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let k = self.layout.hash_count;
        let width = code.width() as usize;
        let code = *code;
        (0..width).map(move |g| (g / k, g % k, code.bit(g)))
    }

    fn find_conflict(&self, indices: &[usize], code: &PositionCode) -> Option<Rejection> {
        // only needed when two slots can share an index
        let mut pending: HashMap<(usize, usize), bool> = HashMap::new();
        let track_pending = self.slots.strategy().partition_map().is_none();

        for (chunk, slot, desired) in self.covered(code) {
            let idx = indices[slot];
            let conflict = Rejection::InsertionConflict {
                chunk,
                slot,
                bit_index: idx,
            };

            if self.presence.get(idx) && self.chunks[chunk].get(idx) != desired {
                return Some(conflict);
            }
            if track_pending {
                if let Some(previous) = pending.insert((chunk, idx), desired) {
                    if previous != desired {
                        return Some(conflict);
                    }
                }
            }
        }
        None
    }

    /// Returns true if any presence bit was newly set.
    fn commit(&mut self, indices: &[usize], code: &PositionCode) -> bool {
        let fresh = !self.all_present(indices);
        for &idx in indices {
            self.presence.set(idx);
        }
        let k = self.layout.hash_count;
        for g in 0..code.width() as usize {
            if code.bit(g) {
                self.chunks[g / k].set(indices[g % k]);
            }
        }
        fresh
    }

    fn read_code(&self, indices: &[usize]) -> u64 {
        let k = self.layout.hash_count;
        (0..self.config.position_bits as usize).fold(0u64, |acc, g| {
            if self.chunks[g / k].get(indices[g % k]) {
                acc | (1u64 << g)
            } else {
                acc
            }
        })
    }

    /// Reset all arrays and the accepted counter.
    pub fn clear(&mut self) {
        self.presence.clear();
        for chunk in &mut self.chunks {
            chunk.clear();
        }
        self.accepted = 0;
    }

    /// Bits per array (`m`).
    #[must_use]
    pub const fn bit_count(&self) -> usize {
        self.layout.bit_count
    }

    /// Hash functions (`k`).
    #[must_use]
    pub const fn hash_count(&self) -> usize {
        self.layout.hash_count
    }

    /// Position arrays.
    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        self.layout.chunk_count
    }

    /// Position code width.
    #[must_use]
    pub const fn position_bits(&self) -> u32 {
        self.config.position_bits
    }

    /// Resolved layout.
    #[must_use]
    pub const fn layout(&self) -> &FilterLayout {
        &self.layout
    }

    /// Config the filter was built from.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Accepted position inserts that set at least one new presence bit.
    /// Repeating an accepted `(token, position)` pair does not count again.
    #[must_use]
    pub const fn accepted_count(&self) -> usize {
        self.accepted
    }

    /// Presence array.
    #[must_use]
    pub const fn presence(&self) -> &BitVec {
        &self.presence
    }

    /// Slot strategy.
    #[must_use]
    pub fn strategy(&self) -> &S {
        self.slots.strategy()
    }

    /// Set fraction of the presence array.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.presence.count_ones() as f64 / self.layout.bit_count as f64
    }

    /// False positive rate implied by the current presence fill.
    #[must_use]
    pub fn estimated_fp_rate(&self) -> f64 {
        fp_rate_from_fill(self.fill_ratio(), self.layout.hash_count)
    }

    /// Bytes held by all bit arrays.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.presence.memory_usage()
            + self.chunks.iter().map(BitVec::memory_usage).sum::<usize>()
    }

    /// Snapshot of sizing and occupancy.
    #[must_use]
    pub fn stats(&self) -> FilterStats {
        let presence_bits_set = self.presence.count_ones();
        let fill_ratio = presence_bits_set as f64 / self.layout.bit_count as f64;
        FilterStats {
            bit_count: self.layout.bit_count,
            hash_count: self.layout.hash_count,
            chunk_count: self.layout.chunk_count,
            position_bits: self.config.position_bits,
            expected_elements: self.config.expected_elements,
            accepted: self.accepted,
            presence_bits_set,
            fill_ratio,
            estimated_fp_rate: fp_rate_from_fill(fill_ratio, self.layout.hash_count),
            expected_fp_rate: expected_fp_rate(
                self.layout.bit_count,
                self.accepted,
                self.layout.hash_count,
            )
            .unwrap_or(1.0),
            memory_bytes: self.memory_usage(),
        }
    }

    /// Presence fill per partition, or `None` for non-partitioned strategies.
    #[must_use]
    pub fn partition_stats(&self) -> Option<Vec<PartitionStats>> {
        let map = self.slots.strategy().partition_map()?;
        map.ranges()
            .enumerate()
            .map(|(partition, range)| {
                let bits_set = self.presence.count_ones_in(range.start, range.end).ok()?;
                let size = range.len();
                Some(PartitionStats {
                    partition,
                    start: range.start,
                    size,
                    bits_set,
                    fill_ratio: bits_set as f64 / size as f64,
                })
            })
            .collect()
    }
}
