//! Occupancy snapshots.

/// Point-in-time statistics of one filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterStats {
    /// Bits per array (`m`).
    pub bit_count: usize,
    /// Hash functions (`k`).
    pub hash_count: usize,
    /// Position arrays.
    pub chunk_count: usize,
    /// Position code width.
    pub position_bits: u32,
    /// Tokens the filter was sized for.
    pub expected_elements: usize,
    /// Accepted position inserts.
    pub accepted: usize,
    /// Set bits in the presence array.
    pub presence_bits_set: usize,
    /// `presence_bits_set / bit_count`.
    pub fill_ratio: f64,
    /// Rate implied by the current fill, `fill^k`.
    pub estimated_fp_rate: f64,
    /// Theoretical rate for `(m, accepted, k)`.
    pub expected_fp_rate: f64,
    /// Bytes held by all bit arrays.
    pub memory_bytes: usize,
}

/// Presence occupancy of one partition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionStats {
    /// Partition (= hash slot) number.
    pub partition: usize,
    /// First bit of the partition.
    pub start: usize,
    /// Partition length in bits.
    pub size: usize,
    /// Set presence bits inside the partition.
    pub bits_set: usize,
    /// `bits_set / size`.
    pub fill_ratio: f64,
}
