//! BloomCascade: positional Bloom filters with multi-round collision resolution.
//!
//! Stores a large set of fixed-length tokens (k-mers) in compact probabilistic
//! structures that answer two questions with bounded error:
//! - **Have I seen this token?** Zero false negatives, tunable false positives.
//! - **At which position did I first see it?** Exact for every accepted token.
//!
//! # Quick Start
//!
//! ```
//! use bloomcascade::filters::PositionalBloomFilter;
//!
//! // 1,000 tokens, 1% false positives, positions up to 2^10 - 1
//! let mut filter = PositionalBloomFilter::new(1_000, 0.01, 10).unwrap();
//!
//! assert!(filter.insert_with_position("ATCG", 42, 0).unwrap().is_accepted());
//! assert_eq!(filter.retrieve_position("ATCG", 0), Some(42));
//! assert_eq!(filter.retrieve_position("GGCC", 0), None);
//! ```
//!
//! # Collisions and the Cascade
//!
//! Distinct tokens may share bit indices. When a shared index already stores a
//! different position bit, the insert is refused atomically and the token must
//! go elsewhere. [`CascadeResolver`] drives that: every round fills a fresh
//! filter and passes its rejected tokens, in order, to the next round.
//!
//! ```
//! use bloomcascade::cascade::{CascadeConfig, CascadeResolver, CollisionSet, SeedPolicy};
//!
//! let tokens: CollisionSet = (0..1000).map(|i| format!("token-{i}")).collect();
//! let config = CascadeConfig::default()
//!     .with_expected_elements(1000)
//!     .with_false_positive_rate(0.001)
//!     .with_hash_count(10)
//!     .with_position_bits(10)
//!     .with_seed_policy(SeedPolicy::Fixed(42));
//!
//! let mut resolver = CascadeResolver::new(config).unwrap();
//! let summary = resolver.resolve(tokens).unwrap();
//!
//! assert!(summary.is_complete());
//! for report in &summary.rounds {
//!     println!("round {}: {} in, {} rejected", report.round, report.input, report.rejected);
//! }
//! ```
//!
//! # Modules
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`core`]      | Bit vectors, sizing formulas, position codes        |
//! | [`hash`]      | Token hashers, uniform and partitioned slot indices |
//! | [`filters`]   | [`PositionalBloomFilter`]                           |
//! | [`builder`]   | Type-state [`PositionalFilterBuilder`]              |
//! | [`cascade`]   | [`CascadeResolver`] and its configuration           |
//! | [`error`]     | [`CascadeError`]                                    |
//!
//! # Feature Flags
//!
//! | Feature    | Enables                                                  |
//! |------------|----------------------------------------------------------|
//! | `serde`    | `Serialize`/`Deserialize` for configs and reports        |
//! | `xxhash`   | [`hash::Xxh3Hasher`](crate::hash)                        |
//! | `rayon`    | Parallel read-only lookups                               |
//! | `proptest` | Property tests                                           |
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (cascade progress at `info`, filter
//! construction at `debug`, round cap and aborts at `warn`) and never installs
//! a subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/bloomcascade/0.1.0")]

/// Bit vectors, sizing and position codes
pub mod core;

/// Error types and result aliases
pub mod error;

/// Positional filter implementation
pub mod filters;

/// Token hashers and slot strategies
pub mod hash;

/// Type-safe filter builders
pub mod builder;

/// Multi-round collision resolution
pub mod cascade;

pub use error::{CascadeError, Result};

pub use builder::PositionalFilterBuilder;
pub use cascade::{
    CascadeConfig, CascadeResolver, CascadeStatus, CascadeSummary, CollisionSet, Location,
    Resolution, RoundReport, RoundSizing, SeedPolicy,
};
pub use filters::{FilterConfig, InsertOutcome, PositionalBloomFilter, Rejection};
pub use hash::{Murmur3Hasher, PartitionedSlots, TokenHasher, UniformSlots};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use bloomcascade::prelude::*;
///
/// let mut filter: PositionalBloomFilter = PositionalFilterBuilder::new()
///     .expected_elements(100)
///     .false_positive_rate(0.01)
///     .position_bits(8)
///     .build()
///     .unwrap();
/// filter.insert_with_position("ACGT", 7, 0).unwrap();
/// assert_eq!(filter.retrieve_position("ACGT", 0), Some(7));
/// ```
pub mod prelude {
    pub use crate::builder::PositionalFilterBuilder;
    pub use crate::cascade::{
        CascadeConfig, CascadeResolver, CascadeStatus, CollisionSet, Location, Resolution,
        RoundSizing, SeedPolicy,
    };
    pub use crate::error::{CascadeError, Result};
    pub use crate::filters::{FilterConfig, InsertOutcome, PositionalBloomFilter, Rejection};
    pub use crate::hash::{Murmur3Hasher, PartitionedSlots, SlotStrategy, TokenHasher, UniformSlots};

    #[cfg(feature = "xxhash")]
    pub use crate::hash::Xxh3Hasher;
}
