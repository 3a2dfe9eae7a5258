//! MurmurHash3 x64_128, the default token hasher.
//!
//! One-shot variant over a complete byte slice. Tokens are short k-mers, so
//! there is no streaming state; the whole key is available up front.
//!
//! The low half of the digest is the first 8 output bytes (little endian),
//! the high half the last 8, matching the canonical C implementation.
//!
//! The seed is 64 bits wide and slot seeds are `seed.wrapping_add(slot)`.
//! The canonical routine takes a 32-bit seed, so digests agree with it only
//! while `seed + slot` stays below `2^32`; past that the C side wraps at
//! `2^32` and this one does not.

use super::hasher::TokenHasher;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// MurmurHash3 x64_128 hasher. Stateless; the seed is passed per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Murmur3Hasher;

impl Murmur3Hasher {
    /// Create a hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TokenHasher for Murmur3Hasher {
    #[inline]
    fn hash128(&self, bytes: &[u8], seed: u64) -> (u64, u64) {
        murmur3_x64_128(bytes, seed)
    }

    fn name(&self) -> &'static str {
        "MurmurHash3_x64_128"
    }
}

#[inline]
fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

#[inline]
fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^ (k >> 33)
}

#[inline]
fn read_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// MurmurHash3 x64_128 of `bytes` keyed by `seed`, as `(low, high)`.
#[must_use]
pub fn murmur3_x64_128(bytes: &[u8], seed: u64) -> (u64, u64) {
    let mut h1 = seed;
    let mut h2 = seed;

    let mut blocks = bytes.chunks_exact(16);
    for block in &mut blocks {
        let k1 = read_le(&block[..8]);
        let k2 = read_le(&block[8..]);

        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(27).wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        h2 ^= mix_k2(k2);
        h2 = h2.rotate_left(31).wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let tail = blocks.remainder();
    if tail.len() > 8 {
        h2 ^= mix_k2(read_le(&tail[8..]));
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(read_le(&tail[..tail.len().min(8)]));
    }

    let len = bytes.len() as u64;
    h1 ^= len;
    h2 ^= len;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    (h1, h2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        let (h1, h2) = murmur3_x64_128(b"The quick brown fox jumps over the lazy dog", 0);
        assert_eq!(h1, 0xe34b_bc7b_bc07_1b6c);
        assert_eq!(h2, 0x7a43_3ca9_c49a_9347);

        assert_eq!(murmur3_x64_128(b"", 0), (0, 0));
    }

    #[test]
    fn test_tail_lengths_are_distinct() {
        // exercises every tail length from 0 to 15 plus full blocks
        let data: Vec<u8> = (0u8..40).collect();
        let digests: std::collections::HashSet<_> =
            (0..=data.len()).map(|n| murmur3_x64_128(&data[..n], 7)).collect();
        assert_eq!(digests.len(), data.len() + 1);
    }

    #[test]
    fn test_seed_changes_digest() {
        let a = murmur3_x64_128(b"ACGTACGT", 42);
        let b = murmur3_x64_128(b"ACGTACGT", 43);
        assert_ne!(a, b);
        assert_eq!(a, murmur3_x64_128(b"ACGTACGT", 42));
    }

    #[test]
    fn test_seed_is_not_truncated_to_32_bits() {
        let low = murmur3_x64_128(b"ACGTACGT", 5);
        let high = murmur3_x64_128(b"ACGTACGT", (1u64 << 32) + 5);
        assert_ne!(low, high);
    }

    #[test]
    fn test_hasher_trait() {
        let hasher = Murmur3Hasher::new();
        let (lo, hi) = murmur3_x64_128(b"ATCG", 3);
        assert_eq!(hasher.hash64(b"ATCG", 3), lo ^ hi);
        assert_eq!(hasher.name(), "MurmurHash3_x64_128");
    }
}
