//! Error types for profile and generation configuration.

use std::path::PathBuf;

use crate::group::MemoryLevel;

/// Errors raised while validating inputs to the generation pipeline.
///
/// All variants are deterministic, input-validation-time failures: they
/// abort generation for one (architecture, variant, thread-count) entry and
/// are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// An operation symbol not present in the catalog.
    #[error("unknown instruction group '{symbol}'")]
    UnknownGroup {
        /// The offending symbol token.
        symbol: String,
    },

    /// An instruction-set tag not recognized by the generator.
    #[error("unknown instruction-set variant '{symbol}'")]
    UnknownVariant {
        /// The offending variant tag.
        symbol: String,
    },

    /// The declared workload mix sums to zero.
    #[error("total operation weight is zero for {arch}/{model}")]
    ZeroTotalWeight {
        /// Architecture id.
        arch: String,
        /// Model id.
        model: String,
    },

    /// A memory level is accessed but its per-thread region cannot sustain
    /// even one reset interval at the requested thread count.
    #[error(
        "{level} region of {region_bytes} bytes cannot cover {accesses_per_loop} \
         accesses per loop for {key}"
    )]
    RegionTooSmall {
        /// Function key of the entry being planned.
        key: String,
        /// The degenerate level.
        level: MemoryLevel,
        /// Per-thread region size after floor division.
        region_bytes: u64,
        /// Pointer advances into the level per work-loop pass.
        accesses_per_loop: u64,
    },

    /// The per-thread line budget cannot fit a single sequence traversal.
    #[error("line budget {lines} cannot fit one sequence of length {sequence_len} for {key}")]
    LineBudgetTooSmall {
        /// Function key of the entry being planned.
        key: String,
        /// Per-thread line budget after floor division.
        lines: u64,
        /// Length of one generated sequence.
        sequence_len: u64,
    },

    /// A variant was requested for an architecture that does not declare it.
    #[error("variant {variant} is not declared by architecture {arch}/{model}")]
    UnsupportedVariant {
        /// Architecture id.
        arch: String,
        /// Model id.
        model: String,
        /// The undeclared variant.
        variant: String,
    },

    /// Structural problem in a profile definition.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading or writing profile files or generated output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile file not found.
    #[error("profile file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

/// Result type for profile and generation operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
