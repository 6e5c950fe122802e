//! Hardware architecture profiles.
//!
//! A profile is the declarative input to the whole pipeline: cache and RAM
//! working-set sizes, the thread counts to generate for, and the weighted
//! workload mix. Profiles are supplied once, read-only, for an entire run.

use serde::{Deserialize, Serialize};

use crate::group::InstructionGroup;
use crate::isa::IsaVariant;

/// One entry of the workload mix: an operation symbol and its weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WeightedGroup {
    /// The operation symbol.
    pub group: InstructionGroup,
    /// Non-negative integer weight; occurrences per sequence traversal.
    pub weight: u32,
}

/// Declarative description of one target processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArchitectureProfile {
    /// Short architecture id used in generated function names (e.g. "skl").
    pub arch: String,
    /// Model id within the architecture (e.g. "xeonsp").
    pub model: String,
    /// Human-readable processor name for generated comments.
    pub name: String,
    /// Instruction-set variants this architecture declares support for.
    pub isa: Vec<IsaVariant>,
    /// L1 data cache size in bytes, per core.
    pub l1_size: u64,
    /// L2 cache size in bytes, per core.
    pub l2_size: u64,
    /// L3 cache share in bytes, per core.
    pub l3_size: u64,
    /// RAM working-set size in bytes, per core.
    pub ram_size: u64,
    /// Cache-line size in bytes.
    pub cl_size: u64,
    /// Fraction of the L1 region scanned before the pointer rewinds.
    pub l1_cover: f64,
    /// Hardware-thread counts to generate kernels for.
    pub threads: Vec<u32>,
    /// Nominal workload length in instruction-bundle lines.
    pub lines: u64,
    /// Ordered workload mix; order is part of the sequence contract.
    pub groups: Vec<WeightedGroup>,
}

impl ArchitectureProfile {
    /// Whether `variant` is declared by this architecture.
    pub fn supports(&self, variant: IsaVariant) -> bool {
        self.isa.contains(&variant)
    }

    /// Total workload weight across all operation groups.
    pub fn total_weight(&self) -> u64 {
        self.groups.iter().map(|g| u64::from(g.weight)).sum()
    }

    /// Key used in generated function names:
    /// `<arch>_<model>_<variant>_<threads>t`.
    ///
    /// Stable and collision-free across the full cross-product of
    /// architectures, variants, and thread counts; the execution engine
    /// looks functions up by this name.
    pub fn function_key(&self, variant: IsaVariant, threads: u32) -> String {
        format!("{}_{}_{}_{}t", self.arch, self.model, variant, threads)
    }

    /// The canned profiles shipped with the generator.
    pub fn builtin() -> Vec<ArchitectureProfile> {
        vec![Self::skylake_sp(), Self::nehalem_ep()]
    }

    /// Look up a built-in profile by `<arch>_<model>` id.
    pub fn builtin_named(id: &str) -> Option<ArchitectureProfile> {
        Self::builtin()
            .into_iter()
            .find(|p| format!("{}_{}", p.arch, p.model) == id)
    }

    /// Intel Xeon Scalable (Skylake-SP).
    pub fn skylake_sp() -> Self {
        Self {
            arch: "skl".into(),
            model: "xeonsp".into(),
            name: "Intel Skylake-SP Xeon".into(),
            isa: vec![IsaVariant::Sse2, IsaVariant::Avx],
            l1_size: 32 * 1024,
            l2_size: 1024 * 1024,
            l3_size: 1408 * 1024,
            ram_size: 100 * 1024 * 1024,
            cl_size: 64,
            l1_cover: 0.5,
            threads: vec![1, 2],
            lines: 6400,
            groups: vec![
                WeightedGroup {
                    group: InstructionGroup::RamLoad,
                    weight: 3,
                },
                WeightedGroup {
                    group: InstructionGroup::L3LoadStore,
                    weight: 2,
                },
                WeightedGroup {
                    group: InstructionGroup::L2LoadStore,
                    weight: 15,
                },
                WeightedGroup {
                    group: InstructionGroup::L1LoadStore,
                    weight: 60,
                },
                WeightedGroup {
                    group: InstructionGroup::Reg,
                    weight: 20,
                },
            ],
        }
    }

    /// Intel Xeon 5500 (Nehalem-EP).
    pub fn nehalem_ep() -> Self {
        Self {
            arch: "nhm".into(),
            model: "xeonep".into(),
            name: "Intel Nehalem-EP Xeon".into(),
            isa: vec![IsaVariant::Sse2],
            l1_size: 32 * 1024,
            l2_size: 256 * 1024,
            l3_size: 2048 * 1024,
            ram_size: 100 * 1024 * 1024,
            cl_size: 64,
            l1_cover: 0.5,
            threads: vec![1, 2],
            lines: 3200,
            groups: vec![
                WeightedGroup {
                    group: InstructionGroup::RamLoad,
                    weight: 2,
                },
                WeightedGroup {
                    group: InstructionGroup::L3Load,
                    weight: 4,
                },
                WeightedGroup {
                    group: InstructionGroup::L2LoadStore,
                    weight: 10,
                },
                WeightedGroup {
                    group: InstructionGroup::L1LoadStore,
                    weight: 70,
                },
                WeightedGroup {
                    group: InstructionGroup::Reg,
                    weight: 14,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skylake_defaults() {
        let p = ArchitectureProfile::skylake_sp();
        assert!(p.supports(IsaVariant::Sse2));
        assert!(p.supports(IsaVariant::Avx));
        assert_eq!(p.total_weight(), 100);
        assert_eq!(p.function_key(IsaVariant::Avx, 2), "skl_xeonsp_avx_2t");
    }

    #[test]
    fn nehalem_declares_sse2_only() {
        let p = ArchitectureProfile::nehalem_ep();
        assert!(p.supports(IsaVariant::Sse2));
        assert!(!p.supports(IsaVariant::Avx));
    }

    #[test]
    fn builtin_lookup() {
        assert!(ArchitectureProfile::builtin_named("skl_xeonsp").is_some());
        assert!(ArchitectureProfile::builtin_named("nhm_xeonep").is_some());
        assert!(ArchitectureProfile::builtin_named("p4_netburst").is_none());
    }

    #[test]
    fn function_keys_are_distinct() {
        let mut keys = std::collections::HashSet::new();
        for p in ArchitectureProfile::builtin() {
            for &variant in &p.isa {
                for &threads in &p.threads {
                    assert!(keys.insert(p.function_key(variant, threads)));
                }
            }
        }
    }
}
