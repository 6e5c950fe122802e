//! Instruction-set variants recognized by the generator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A vector-extension flavor a kernel can be generated for.
///
/// The variant tag selects both the cost catalog and the emission template,
/// so adding a family member (FMA, AVX-512) means adding a variant here and
/// a template for it — the per-variant generators do not get duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IsaVariant {
    Sse2,
    Avx,
}

impl IsaVariant {
    /// Every supported variant.
    pub const ALL: [IsaVariant; 2] = [IsaVariant::Sse2, IsaVariant::Avx];

    /// The lower-case tag used in function names and profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            IsaVariant::Sse2 => "sse2",
            IsaVariant::Avx => "avx",
        }
    }

    /// Width in bytes of one vector register.
    pub fn vector_bytes(&self) -> u64 {
        match self {
            IsaVariant::Sse2 => 16,
            IsaVariant::Avx => 32,
        }
    }

    /// Double-precision flops performed by one packed add.
    pub fn flops_per_add(&self) -> u64 {
        self.vector_bytes() / 8
    }
}

impl fmt::Display for IsaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsaVariant {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownVariant {
                symbol: s.to_string(),
            })
    }
}
