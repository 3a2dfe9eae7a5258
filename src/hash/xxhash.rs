//! XXH3-128 token hasher (feature `xxhash`).
//!
//! Wraps the `xxhash-rust` crate. Faster than MurmurHash3 on long tokens, but
//! produces different slot indices, so filters built with one hasher cannot be
//! queried with the other.
//!
//! ```
//! # #[cfg(feature = "xxhash")]
//! # {
//! use bloomcascade::hash::{TokenHasher, Xxh3Hasher};
//!
//! let hasher = Xxh3Hasher::new();
//! assert_ne!(hasher.hash64(b"ACGT", 0), hasher.hash64(b"ACGT", 1));
//! # }
//! ```

use super::hasher::TokenHasher;
use xxhash_rust::xxh3::xxh3_128_with_seed;

/// XXH3 128-bit hasher. Stateless; the seed is passed per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl Xxh3Hasher {
    /// Create a hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TokenHasher for Xxh3Hasher {
    #[inline]
    fn hash128(&self, bytes: &[u8], seed: u64) -> (u64, u64) {
        let digest = xxh3_128_with_seed(bytes, seed);
        (digest as u64, (digest >> 64) as u64)
    }

    fn name(&self) -> &'static str {
        "XXH3_128"
    }
}
