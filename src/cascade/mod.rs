//! Multi-round collision resolution.
//!
//! ```text
//! cascade/
//! ├── collision.rs  - CollisionSet and its line format
//! ├── config.rs     - CascadeConfig, SeedPolicy, RoundSizing
//! ├── report.rs     - RoundReport, CascadeSummary, lookup results
//! ├── resolver.rs   - CascadeResolver
//! └── mod.rs        - This file
//! ```

pub mod collision;
pub mod config;
pub mod report;
pub mod resolver;

pub use collision::{is_line_safe, CollisionSet};
pub use config::{CascadeConfig, RoundSizing, SeedPolicy, DEFAULT_MAX_ROUNDS};
pub use report::{CascadeStatus, CascadeSummary, Location, Resolution, RoundReport};
pub use resolver::CascadeResolver;
