//! Builder pattern for filter construction.
//!
//! Builders use the type-state pattern: required parameters are enforced at
//! compile time, parameter values are checked when the filter is built.
//!
//! ```
//! use bloomcascade::builder::PositionalFilterBuilder;
//! use bloomcascade::filters::PositionalBloomFilter;
//!
//! let filter: PositionalBloomFilter = PositionalFilterBuilder::new()
//!     .expected_elements(10_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//! ```
//!
//! | Required                               | Optional                       |
//! |----------------------------------------|--------------------------------|
//! | `expected_elements`, `false_positive_rate` | `position_bits`, `hash_count` |

#![allow(clippy::module_name_repetitions)]

pub mod positional;

pub use positional::{PositionalFilterBuilder, DEFAULT_POSITION_BITS};
