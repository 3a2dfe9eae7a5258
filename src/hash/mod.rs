//! Token hashing and slot index generation.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs      - TokenHasher trait and 128→64 bit fold
//! ├── murmur.rs      - MurmurHash3 x64_128 (default)
//! ├── xxhash.rs      - XXH3-128 (optional, feature = "xxhash")
//! ├── strategies.rs  - Uniform and partitioned slot strategies
//! └── mod.rs         - This file
//! ```
//!
//! # Slot Indices
//!
//! Hash slot `i` of a token re-keys the hasher with `seed + i` (wrapping),
//! folds the 128-bit digest as `low ^ high`, and lets the slot strategy map
//! it into the bit array:
//!
//! | Strategy             | Index                         | Slots may collide |
//! |----------------------|-------------------------------|-------------------|
//! | [`UniformSlots`]     | `digest mod m`                | yes               |
//! | [`PartitionedSlots`] | `start_i + digest mod len_i`  | no                |
//!
//! ```
//! use bloomcascade::hash::{Murmur3Hasher, PartitionedSlots, SlotGenerator, SlotStrategy};
//!
//! let strategy = PartitionedSlots::from_layout(1000, 4).unwrap();
//! let generator = SlotGenerator::new(strategy, Murmur3Hasher::new());
//! let indices = generator.slot_indices(b"ACGT", 7).unwrap();
//!
//! assert_eq!(indices.len(), 4);
//! for (slot, idx) in indices.iter().enumerate() {
//!     assert!((slot * 250..(slot + 1) * 250).contains(idx));
//! }
//! ```

pub mod hasher;
pub mod murmur;
pub mod strategies;

#[cfg(feature = "xxhash")]
pub mod xxhash;

pub use hasher::{fold64, TokenHasher};
pub use murmur::{murmur3_x64_128, Murmur3Hasher};
pub use strategies::{PartitionMap, PartitionedSlots, SlotGenerator, SlotStrategy, UniformSlots};

#[cfg(feature = "xxhash")]
pub use xxhash::Xxh3Hasher;
