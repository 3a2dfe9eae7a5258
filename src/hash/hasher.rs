//! Keyed 128-bit hash abstraction.
//!
//! Filters never hash tokens themselves. They ask a [`TokenHasher`] for a
//! 128-bit digest keyed by `seed + slot` and fold it to 64 bits. Slot
//! strategies (see [`super::strategies`]) turn that 64-bit digest into a bit
//! index.
//!
//! ```
//! use bloomcascade::hash::{Murmur3Hasher, TokenHasher};
//!
//! let hasher = Murmur3Hasher::new();
//! let (lo, hi) = hasher.hash128(b"ACGT", 42);
//! assert_eq!(hasher.hash64(b"ACGT", 42), lo ^ hi);
//! ```

/// Deterministic keyed hash producing a 128-bit digest.
///
/// Implementations must be stable for a fixed `(bytes, seed)` pair and well
/// distributed across consecutive seeds, since each hash slot re-keys with
/// `seed + slot`.
pub trait TokenHasher: Send + Sync {
    /// 128-bit digest as `(low, high)` halves.
    fn hash128(&self, bytes: &[u8], seed: u64) -> (u64, u64);

    /// 128-bit digest folded to 64 bits by XOR of its halves.
    #[inline]
    fn hash64(&self, bytes: &[u8], seed: u64) -> u64 {
        let (low, high) = self.hash128(bytes, seed);
        fold64(low, high)
    }

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Fold a 128-bit digest to 64 bits.
#[must_use]
#[inline]
pub const fn fold64(low: u64, high: u64) -> u64 {
    low ^ high
}
