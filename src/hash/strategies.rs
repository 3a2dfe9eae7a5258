//! Slot index strategies.
//!
//! A filter with `k` hash functions derives `k` bit indices per token. Slot
//! `i` re-keys the token hasher with `seed + i`, folds the digest to 64 bits,
//! and hands it to a [`SlotStrategy`] which maps it into the bit array:
//!
//! ```text
//! Uniform:     [=================== m bits ===================]
//!               h₀↑     h₂↑          h₁↑              hₖ₋₁↑
//!
//! Partitioned: [== P₀ ==][== P₁ ==][== P₂ ==] ... [== Pₖ₋₁ ==+r]
//!                 h₀↑       h₁↑       h₂↑             hₖ₋₁↑
//! ```
//!
//! Partition `i` covers `[i·⌊m/k⌋, (i+1)·⌊m/k⌋)` and the last partition also
//! takes the `m mod k` remainder bits, so the partitions tile `[0, m)`
//! exactly. Slots of one token can never share a bit under partitioning.
//!
//! Strategies are built from the final `(m, k)` layout by
//! [`SlotStrategy::from_layout`] before the filter allocates anything, so no
//! strategy is ever consulted with half-initialized sizing state.

use super::hasher::TokenHasher;
use crate::error::{CascadeError, Result};
use std::fmt;
use std::ops::Range;

/// Maps a folded 64-bit digest for hash slot `slot` to a bit index.
pub trait SlotStrategy: Clone + Send + Sync + fmt::Debug {
    /// Build the strategy for a bit array of `bit_count` bits probed by
    /// `hash_count` hash functions.
    ///
    /// # Errors
    ///
    /// Returns an invalid-configuration error if the layout cannot be
    /// served by this strategy.
    fn from_layout(bit_count: usize, hash_count: usize) -> Result<Self>
    where
        Self: Sized;

    /// Bit index for `digest` produced by hash slot `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::IndexOutOfRange`] if `slot >= hash_count`.
    fn locate(&self, digest: u64, slot: usize) -> Result<usize>;

    /// Bit array size this strategy was built for.
    fn bit_count(&self) -> usize;

    /// Hash function count this strategy was built for.
    fn hash_count(&self) -> usize;

    /// Partition layout, if the strategy partitions the bit array.
    fn partition_map(&self) -> Option<&PartitionMap> {
        None
    }

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

#[inline]
fn check_slot(slot: usize, hash_count: usize) -> Result<()> {
    if slot >= hash_count {
        return Err(CascadeError::index_out_of_range(slot, hash_count));
    }
    Ok(())
}

/// Every slot probes the whole array: `digest mod m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformSlots {
    bit_count: usize,
    hash_count: usize,
}

impl SlotStrategy for UniformSlots {
    fn from_layout(bit_count: usize, hash_count: usize) -> Result<Self> {
        if bit_count == 0 {
            return Err(CascadeError::invalid_filter_size(bit_count));
        }
        if hash_count == 0 {
            return Err(CascadeError::invalid_hash_count(hash_count));
        }
        Ok(Self {
            bit_count,
            hash_count,
        })
    }

    #[inline]
    fn locate(&self, digest: u64, slot: usize) -> Result<usize> {
        check_slot(slot, self.hash_count)?;
        Ok((digest % self.bit_count as u64) as usize)
    }

    fn bit_count(&self) -> usize {
        self.bit_count
    }

    fn hash_count(&self) -> usize {
        self.hash_count
    }

    fn name(&self) -> &'static str {
        "Uniform"
    }
}

/// Disjoint per-slot ranges tiling `[0, bit_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionMap {
    bit_count: usize,
    hash_count: usize,
    partition_size: usize,
}

impl PartitionMap {
    /// Split `bit_count` bits into `hash_count` partitions.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::InvalidFilterSize`] if `bit_count == 0`
    /// - [`CascadeError::InvalidHashCount`] if `hash_count == 0`
    /// - [`CascadeError::InvalidConfiguration`] if `bit_count < hash_count`
    ///   (a partition would be empty)
    pub fn new(bit_count: usize, hash_count: usize) -> Result<Self> {
        if bit_count == 0 {
            return Err(CascadeError::invalid_filter_size(bit_count));
        }
        if hash_count == 0 {
            return Err(CascadeError::invalid_hash_count(hash_count));
        }

        let partition_size = bit_count / hash_count;
        if partition_size == 0 {
            return Err(CascadeError::invalid_configuration(format!(
                "{} bits cannot be split into {} non-empty partitions",
                bit_count, hash_count
            )));
        }

        Ok(Self {
            bit_count,
            hash_count,
            partition_size,
        })
    }

    /// `[start, end)` of slot `slot`'s partition.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::IndexOutOfRange`] if `slot >= hash_count`.
    pub fn range(&self, slot: usize) -> Result<Range<usize>> {
        check_slot(slot, self.hash_count)?;
        let start = slot * self.partition_size;
        let end = if slot == self.hash_count - 1 {
            self.bit_count
        } else {
            start + self.partition_size
        };
        Ok(start..end)
    }

    /// All partition ranges in slot order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.hash_count).filter_map(move |slot| self.range(slot).ok())
    }

    /// Size in bits of each partition, in slot order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.ranges().map(|r| r.len()).collect()
    }

    /// Partition owning global bit `bit_index`. Remainder bits belong to the
    /// last partition.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::IndexOutOfRange`] if `bit_index >= bit_count`.
    pub fn partition_of(&self, bit_index: usize) -> Result<usize> {
        if bit_index >= self.bit_count {
            return Err(CascadeError::index_out_of_range(bit_index, self.bit_count));
        }
        Ok((bit_index / self.partition_size).min(self.hash_count - 1))
    }

    /// Nominal partition size, `⌊m/k⌋`.
    #[must_use]
    pub const fn partition_size(&self) -> usize {
        self.partition_size
    }

    /// Number of partitions.
    #[must_use]
    pub const fn partition_count(&self) -> usize {
        self.hash_count
    }

    /// Total bits covered.
    #[must_use]
    pub const fn bit_count(&self) -> usize {
        self.bit_count
    }
}

/// Slot `i` probes only its own partition: `start_i + digest mod len_i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionedSlots {
    map: PartitionMap,
}

impl SlotStrategy for PartitionedSlots {
    fn from_layout(bit_count: usize, hash_count: usize) -> Result<Self> {
        Ok(Self {
            map: PartitionMap::new(bit_count, hash_count)?,
        })
    }

    #[inline]
    fn locate(&self, digest: u64, slot: usize) -> Result<usize> {
        let range = self.map.range(slot)?;
        let len = (range.end - range.start) as u64;
        Ok(range.start + (digest % len) as usize)
    }

    fn bit_count(&self) -> usize {
        self.map.bit_count
    }

    fn hash_count(&self) -> usize {
        self.map.hash_count
    }

    fn partition_map(&self) -> Option<&PartitionMap> {
        Some(&self.map)
    }

    fn name(&self) -> &'static str {
        "Partitioned"
    }
}

/// Hasher plus slot strategy: `(token, slot, seed) → bit index`.
#[derive(Debug, Clone)]
pub struct SlotGenerator<S, H> {
    strategy: S,
    hasher: H,
}

impl<S: SlotStrategy, H: TokenHasher> SlotGenerator<S, H> {
    /// Pair a built strategy with a hasher.
    pub fn new(strategy: S, hasher: H) -> Self {
        Self { strategy, hasher }
    }

    /// Bit index for hash slot `slot` of `token` under `seed`. The hasher is
    /// keyed with `seed + slot` (wrapping).
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::IndexOutOfRange`] if `slot >= hash_count`.
    #[inline]
    pub fn compute_slot_index(&self, token: &[u8], slot: usize, seed: u64) -> Result<usize> {
        let digest = self.hasher.hash64(token, seed.wrapping_add(slot as u64));
        self.strategy.locate(digest, slot)
    }

    /// All `k` slot indices of `token`, written into `out` (cleared first).
    ///
    /// # Errors
    ///
    /// Propagates strategy errors; none occur for a well-formed strategy.
    pub fn fill_slot_indices(&self, token: &[u8], seed: u64, out: &mut Vec<usize>) -> Result<()> {
        out.clear();
        for slot in 0..self.strategy.hash_count() {
            out.push(self.compute_slot_index(token, slot, seed)?);
        }
        Ok(())
    }

    /// All `k` slot indices of `token`, in slot order.
    ///
    /// # Errors
    ///
    /// See [`Self::fill_slot_indices`].
    pub fn slot_indices(&self, token: &[u8], seed: u64) -> Result<Vec<usize>> {
        let mut out = Vec::with_capacity(self.strategy.hash_count());
        self.fill_slot_indices(token, seed, &mut out)?;
        Ok(out)
    }

    /// The slot strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The token hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Murmur3Hasher;

    #[test]
    fn test_partition_map_tiles_array() {
        for (m, k) in [(100, 7), (14378, 10), (10, 10), (65, 8), (9586, 7)] {
            let map = PartitionMap::new(m, k).unwrap();
            let ranges: Vec<_> = map.ranges().collect();
            assert_eq!(ranges.len(), k);
            assert_eq!(ranges[0].start, 0);
            assert_eq!(ranges[k - 1].end, m);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            assert_eq!(map.sizes().iter().sum::<usize>(), m);
        }
    }

    #[test]
    fn test_last_partition_absorbs_remainder() {
        let map = PartitionMap::new(100, 7).unwrap();
        assert_eq!(map.partition_size(), 14);
        assert_eq!(map.range(0).unwrap(), 0..14);
        assert_eq!(map.range(6).unwrap(), 84..100);
        assert_eq!(map.partition_of(99).unwrap(), 6);
        assert_eq!(map.partition_of(98).unwrap(), 6);
        assert_eq!(map.partition_of(13).unwrap(), 0);
        assert_eq!(map.partition_of(14).unwrap(), 1);
        assert!(map.partition_of(100).is_err());
    }

    #[test]
    fn test_partition_map_rejects_empty_partitions() {
        assert!(matches!(
            PartitionMap::new(5, 10),
            Err(CascadeError::InvalidConfiguration { .. })
        ));
        assert!(PartitionMap::new(0, 1).is_err());
        assert!(PartitionMap::new(10, 0).is_err());
    }

    #[test]
    fn test_partitioned_locate_stays_in_partition() {
        let strategy = PartitionedSlots::from_layout(1000, 7).unwrap();
        let map = *strategy.partition_map().unwrap();
        for slot in 0..7 {
            let range = map.range(slot).unwrap();
            for digest in [0u64, 1, 13, u64::MAX, 0xdead_beef, 987_654_321] {
                let idx = strategy.locate(digest, slot).unwrap();
                assert!(range.contains(&idx), "slot {slot} digest {digest} → {idx}");
            }
        }
    }

    #[test]
    fn test_locate_rejects_bad_slot() {
        let partitioned = PartitionedSlots::from_layout(1000, 7).unwrap();
        assert!(matches!(
            partitioned.locate(5, 7),
            Err(CascadeError::IndexOutOfRange { index: 7, length: 7 })
        ));
        let uniform = UniformSlots::from_layout(1000, 7).unwrap();
        assert!(uniform.locate(5, 7).is_err());
    }

    #[test]
    fn test_uniform_locate_is_modulo() {
        let uniform = UniformSlots::from_layout(1000, 3).unwrap();
        assert_eq!(uniform.locate(12_345, 0).unwrap(), 345);
        assert_eq!(uniform.locate(999, 2).unwrap(), 999);
        assert!(uniform.partition_map().is_none());
    }

    #[test]
    fn test_generator_rekeys_per_slot() {
        let generator =
            SlotGenerator::new(UniformSlots::from_layout(1 << 20, 4).unwrap(), Murmur3Hasher);
        let hasher = Murmur3Hasher;
        for slot in 0..4 {
            let expected = (hasher.hash64(b"ATCG", 10 + slot as u64) % (1 << 20)) as usize;
            assert_eq!(generator.compute_slot_index(b"ATCG", slot, 10).unwrap(), expected);
        }
    }

    #[test]
    fn test_generator_is_deterministic() {
        let generator =
            SlotGenerator::new(PartitionedSlots::from_layout(9586, 7).unwrap(), Murmur3Hasher);
        let a = generator.slot_indices(b"test_string", 0).unwrap();
        let b = generator.slot_indices(b"test_string", 0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 7);
        assert_ne!(a, generator.slot_indices(b"test_string", 1).unwrap());
    }

    #[test]
    fn test_seed_wraps() {
        let generator =
            SlotGenerator::new(UniformSlots::from_layout(64, 2).unwrap(), Murmur3Hasher);
        assert!(generator.compute_slot_index(b"A", 1, u64::MAX).is_ok());
    }
}
