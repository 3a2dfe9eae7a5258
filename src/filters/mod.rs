//! Positional Bloom filters.
//!
//! ```text
//! filters/
//! ├── config.rs      - FilterConfig and the resolved (m, k, chunks) layout
//! ├── positional.rs  - PositionalBloomFilter, InsertOutcome, Rejection
//! ├── stats.rs       - Occupancy snapshots
//! └── mod.rs         - This file
//! ```
//!
//! A filter answers "was this token inserted?" with a bounded false positive
//! rate, and for accepted tokens also "at which position?".
//!
//! | Strategy               | Slot collisions within a token | Partition stats |
//! |------------------------|--------------------------------|-----------------|
//! | `PartitionedSlots`     | impossible                     | yes             |
//! | `UniformSlots`         | possible, checked on insert    | no              |
//!
//! ```
//! use bloomcascade::filters::{FilterConfig, PositionalBloomFilter};
//! use bloomcascade::hash::UniformSlots;
//!
//! let config = FilterConfig::new(10_000, 0.01, 16).with_hash_count(8);
//! let mut filter = PositionalBloomFilter::<UniformSlots>::from_config(&config).unwrap();
//!
//! filter.insert_with_position("ACGTACGT", 1234, 0).unwrap();
//! assert!(filter.presence_contains("ACGTACGT", 0));
//! ```

pub mod config;
pub mod positional;
pub mod stats;

pub use config::{FilterConfig, FilterLayout};
pub use positional::{InsertOutcome, PositionalBloomFilter, Rejection};
pub use stats::{FilterStats, PartitionStats};
