//! Core building blocks shared by every filter in the crate.
//!
//! ```text
//! core/
//! ├── bitvec.rs    - Packed bit vector
//! ├── params.rs    - Sizing policy (bit count, hash count, chunk count)
//! ├── position.rs  - Fixed-width position codes
//! └── mod.rs       - This file
//! ```
//!
//! Nothing here knows about hashing; slot index generation lives in
//! [`crate::hash`].

pub mod bitvec;
pub mod params;
pub mod position;

pub use bitvec::BitVec;
pub use params::{
    bits_per_element, chunk_count, expected_fp_rate, hash_count_for_size,
    size_for_fixed_hash_count, size_for_target_rate,
};
pub use position::{decode_position, encode_position, PositionCode};
