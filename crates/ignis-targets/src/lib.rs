//! Hardware profiles and instruction catalogs for the ignis kernel generator.
//!
//! Everything here is read-only input data for the synthesis pipeline:
//! - **Profiles:** per-architecture cache/RAM sizes, thread counts, and the
//!   weighted workload mix
//! - **Catalog:** per-variant flop/byte cost of every operation symbol
//! - **Variants:** the instruction-set flavors kernels can be generated for

pub mod arch;
pub mod catalog;
pub mod error;
pub mod group;
pub mod isa;
pub mod parse;

pub use arch::{ArchitectureProfile, WeightedGroup};
pub use catalog::{Catalog, GroupCost};
pub use error::{ConfigurationError, Result};
pub use group::{InstructionGroup, MemoryLevel};
pub use isa::IsaVariant;
pub use parse::{
    discover_profiles, generate_template, load_profile_toml, parse_profile_toml, profile_to_toml,
    validate_profile, ValidationIssue,
};
