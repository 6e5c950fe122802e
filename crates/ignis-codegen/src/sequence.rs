//! Sequence generation: weighted interleave of workload operations.

use ignis_targets::{
    ArchitectureProfile, ConfigurationError, InstructionGroup, MemoryLevel, WeightedGroup,
};

/// One full weighted interleave of operation symbols — a single workload
/// pass.
///
/// The sequence has length equal to the total weight and contains each
/// symbol exactly as often as its declared weight. Generation is fully
/// deterministic for a fixed declaration order, which reproducible
/// measurement depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    items: Vec<InstructionGroup>,
}

impl Sequence {
    /// Generate the interleave for an ordered weighted mix.
    ///
    /// Weighted round-robin: each step picks the group whose
    /// emitted-count/weight ratio is smallest, declaration order breaking
    /// ties, so accesses to any one level spread evenly instead of
    /// bursting. Ratios are compared cross-multiplied in integers.
    pub fn generate(
        groups: &[WeightedGroup],
        arch: &str,
        model: &str,
    ) -> Result<Self, ConfigurationError> {
        let total: u64 = groups.iter().map(|g| u64::from(g.weight)).sum();
        if total == 0 {
            return Err(ConfigurationError::ZeroTotalWeight {
                arch: arch.to_string(),
                model: model.to_string(),
            });
        }

        let active: Vec<usize> = (0..groups.len())
            .filter(|&i| groups[i].weight > 0)
            .collect();

        let mut emitted = vec![0u64; groups.len()];
        let mut items = Vec::with_capacity(total as usize);
        for _ in 0..total {
            let mut best = active[0];
            for &i in &active[1..] {
                if emitted[i] * u64::from(groups[best].weight)
                    < emitted[best] * u64::from(groups[i].weight)
                {
                    best = i;
                }
            }
            emitted[best] += 1;
            items.push(groups[best].group);
        }

        Ok(Self { items })
    }

    /// Generate from a profile's declared mix.
    pub fn for_profile(profile: &ArchitectureProfile) -> Result<Self, ConfigurationError> {
        Self::generate(&profile.groups, &profile.arch, &profile.model)
    }

    /// Number of operations in one traversal.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence is empty (never true for a generated sequence).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The operations of one traversal, in emission order.
    pub fn items(&self) -> &[InstructionGroup] {
        &self.items
    }

    /// Number of operations per traversal that advance `level`'s pointer.
    pub fn level_count(&self, level: MemoryLevel) -> u64 {
        self.items
            .iter()
            .filter(|g| g.memory_level() == Some(level))
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mix(entries: &[(InstructionGroup, u32)]) -> Vec<WeightedGroup> {
        entries
            .iter()
            .map(|&(group, weight)| WeightedGroup { group, weight })
            .collect()
    }

    #[test]
    fn counts_match_weights() {
        let groups = mix(&[
            (InstructionGroup::Reg, 2),
            (InstructionGroup::L1LoadStore, 2),
            (InstructionGroup::RamLoad, 1),
        ]);
        let seq = Sequence::generate(&groups, "a", "m").unwrap();
        assert_eq!(seq.len(), 5);
        let count = |g: InstructionGroup| seq.items().iter().filter(|&&x| x == g).count();
        assert_eq!(count(InstructionGroup::Reg), 2);
        assert_eq!(count(InstructionGroup::L1LoadStore), 2);
        assert_eq!(count(InstructionGroup::RamLoad), 1);
    }

    #[test]
    fn interleave_spreads_accesses() {
        let groups = mix(&[
            (InstructionGroup::Reg, 2),
            (InstructionGroup::L1LoadStore, 2),
            (InstructionGroup::RamLoad, 1),
        ]);
        let seq = Sequence::generate(&groups, "a", "m").unwrap();
        assert_eq!(
            seq.items(),
            &[
                InstructionGroup::Reg,
                InstructionGroup::L1LoadStore,
                InstructionGroup::RamLoad,
                InstructionGroup::Reg,
                InstructionGroup::L1LoadStore,
            ]
        );
    }

    #[test]
    fn deterministic_for_fixed_order() {
        let groups = mix(&[
            (InstructionGroup::RamLoad, 3),
            (InstructionGroup::L2LoadStore, 15),
            (InstructionGroup::L1LoadStore, 60),
            (InstructionGroup::Reg, 20),
        ]);
        let a = Sequence::generate(&groups, "a", "m").unwrap();
        let b = Sequence::generate(&groups, "a", "m").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn declaration_order_changes_result() {
        let fwd = mix(&[(InstructionGroup::Reg, 1), (InstructionGroup::RamLoad, 1)]);
        let rev = mix(&[(InstructionGroup::RamLoad, 1), (InstructionGroup::Reg, 1)]);
        let a = Sequence::generate(&fwd, "a", "m").unwrap();
        let b = Sequence::generate(&rev, "a", "m").unwrap();
        assert_eq!(a.items()[0], InstructionGroup::Reg);
        assert_eq!(b.items()[0], InstructionGroup::RamLoad);
    }

    #[test]
    fn zero_weights_are_skipped() {
        let groups = mix(&[
            (InstructionGroup::L3Prefetch, 0),
            (InstructionGroup::Reg, 3),
        ]);
        let seq = Sequence::generate(&groups, "a", "m").unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.level_count(MemoryLevel::L3), 0);
    }

    #[test]
    fn zero_total_weight_fails() {
        let groups = mix(&[(InstructionGroup::Reg, 0)]);
        let err = Sequence::generate(&groups, "skl", "xeonsp").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ZeroTotalWeight { ref arch, .. } if arch == "skl"
        ));
    }

    #[test]
    fn level_counts() {
        let seq = Sequence::for_profile(&ArchitectureProfile::skylake_sp()).unwrap();
        assert_eq!(seq.len(), 100);
        assert_eq!(seq.level_count(MemoryLevel::L1), 60);
        assert_eq!(seq.level_count(MemoryLevel::L2), 15);
        assert_eq!(seq.level_count(MemoryLevel::L3), 2);
        assert_eq!(seq.level_count(MemoryLevel::Ram), 3);
    }
}
