//! Workload operation symbols and the memory levels they target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A memory level with its own buffer region and walk pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryLevel {
    L1,
    L2,
    L3,
    Ram,
}

impl MemoryLevel {
    /// All levels in buffer-layout order.
    pub const ALL: [MemoryLevel; 4] = [
        MemoryLevel::L1,
        MemoryLevel::L2,
        MemoryLevel::L3,
        MemoryLevel::Ram,
    ];
}

impl fmt::Display for MemoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemoryLevel::L1 => "L1",
            MemoryLevel::L2 => "L2",
            MemoryLevel::L3 => "L3",
            MemoryLevel::Ram => "RAM",
        };
        f.write_str(s)
    }
}

/// One workload operation symbol.
///
/// The set is closed: every symbol has a fixed cost and emission rule, so an
/// unrecognized symbol can only appear in textual input and is rejected when
/// a profile is parsed, never during emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionGroup {
    /// Register-only arithmetic, no cache or memory traffic.
    #[serde(rename = "REG")]
    Reg,
    #[serde(rename = "L1_L")]
    L1Load,
    #[serde(rename = "L1_S")]
    L1Store,
    #[serde(rename = "L1_LS")]
    L1LoadStore,
    #[serde(rename = "L2_L")]
    L2Load,
    #[serde(rename = "L2_S")]
    L2Store,
    #[serde(rename = "L2_LS")]
    L2LoadStore,
    #[serde(rename = "L3_L")]
    L3Load,
    #[serde(rename = "L3_S")]
    L3Store,
    #[serde(rename = "L3_LS")]
    L3LoadStore,
    #[serde(rename = "L3_P")]
    L3Prefetch,
    #[serde(rename = "RAM_L")]
    RamLoad,
    #[serde(rename = "RAM_S")]
    RamStore,
    /// Load from L3, store to RAM.
    #[serde(rename = "RAM_LS")]
    RamLoadStore,
    #[serde(rename = "RAM_P")]
    RamPrefetch,
}

impl InstructionGroup {
    /// Every recognized symbol, in catalog order.
    pub const ALL: [InstructionGroup; 15] = [
        InstructionGroup::Reg,
        InstructionGroup::L1Load,
        InstructionGroup::L1Store,
        InstructionGroup::L1LoadStore,
        InstructionGroup::L2Load,
        InstructionGroup::L2Store,
        InstructionGroup::L2LoadStore,
        InstructionGroup::L3Load,
        InstructionGroup::L3Store,
        InstructionGroup::L3LoadStore,
        InstructionGroup::L3Prefetch,
        InstructionGroup::RamLoad,
        InstructionGroup::RamStore,
        InstructionGroup::RamLoadStore,
        InstructionGroup::RamPrefetch,
    ];

    /// The symbol token used in profiles and generated comments.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionGroup::Reg => "REG",
            InstructionGroup::L1Load => "L1_L",
            InstructionGroup::L1Store => "L1_S",
            InstructionGroup::L1LoadStore => "L1_LS",
            InstructionGroup::L2Load => "L2_L",
            InstructionGroup::L2Store => "L2_S",
            InstructionGroup::L2LoadStore => "L2_LS",
            InstructionGroup::L3Load => "L3_L",
            InstructionGroup::L3Store => "L3_S",
            InstructionGroup::L3LoadStore => "L3_LS",
            InstructionGroup::L3Prefetch => "L3_P",
            InstructionGroup::RamLoad => "RAM_L",
            InstructionGroup::RamStore => "RAM_S",
            InstructionGroup::RamLoadStore => "RAM_LS",
            InstructionGroup::RamPrefetch => "RAM_P",
        }
    }

    /// The memory level whose walk pointer this operation advances, if any.
    ///
    /// RAM_LS reads from L3 but advances the RAM pointer; L3_P prefetches
    /// into L3 and advances the L3 pointer.
    pub fn memory_level(&self) -> Option<MemoryLevel> {
        match self {
            InstructionGroup::Reg => None,
            InstructionGroup::L1Load
            | InstructionGroup::L1Store
            | InstructionGroup::L1LoadStore => Some(MemoryLevel::L1),
            InstructionGroup::L2Load
            | InstructionGroup::L2Store
            | InstructionGroup::L2LoadStore => Some(MemoryLevel::L2),
            InstructionGroup::L3Load
            | InstructionGroup::L3Store
            | InstructionGroup::L3LoadStore
            | InstructionGroup::L3Prefetch => Some(MemoryLevel::L3),
            InstructionGroup::RamLoad
            | InstructionGroup::RamStore
            | InstructionGroup::RamLoadStore
            | InstructionGroup::RamPrefetch => Some(MemoryLevel::Ram),
        }
    }
}

impl fmt::Display for InstructionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionGroup {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownGroup {
                symbol: s.to_string(),
            })
    }
}
