//! Per-variant cost catalog for workload operations.

use crate::group::InstructionGroup;
use crate::isa::IsaVariant;

/// Flop and memory-traffic cost of one execution of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCost {
    /// Double-precision floating-point operations.
    pub flops: u64,
    /// Bytes of memory traffic. Zero for operations whose accesses stay
    /// inside the cache hierarchy.
    pub bytes: u64,
}

/// Cost catalog for one instruction-set variant.
///
/// Every operation performs exactly one packed add, so the flop cost is the
/// variant's vector width in doubles. Only RAM-directed operations move
/// measurable memory traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    variant: IsaVariant,
}

impl Catalog {
    /// The catalog for `variant`.
    pub fn for_variant(variant: IsaVariant) -> Self {
        Self { variant }
    }

    /// The variant this catalog describes.
    pub fn variant(&self) -> IsaVariant {
        self.variant
    }

    /// Cost of one execution of `group`.
    ///
    /// RAM stores cost two cache lines (read-for-ownership plus writeback);
    /// RAM_LS takes its load from L3 so only the store side is counted.
    pub fn cost(&self, group: InstructionGroup) -> GroupCost {
        let flops = self.variant.flops_per_add();
        let bytes = match group {
            InstructionGroup::RamLoad | InstructionGroup::RamPrefetch => 64,
            InstructionGroup::RamStore | InstructionGroup::RamLoadStore => 128,
            _ => 0,
        };
        GroupCost { flops, bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse2_costs() {
        let catalog = Catalog::for_variant(IsaVariant::Sse2);
        for group in InstructionGroup::ALL {
            assert_eq!(catalog.cost(group).flops, 2);
        }
        assert_eq!(catalog.cost(InstructionGroup::RamLoad).bytes, 64);
        assert_eq!(catalog.cost(InstructionGroup::RamStore).bytes, 128);
        assert_eq!(catalog.cost(InstructionGroup::RamLoadStore).bytes, 128);
        assert_eq!(catalog.cost(InstructionGroup::RamPrefetch).bytes, 64);
        assert_eq!(catalog.cost(InstructionGroup::L3LoadStore).bytes, 0);
    }

    #[test]
    fn avx_doubles_flops() {
        let catalog = Catalog::for_variant(IsaVariant::Avx);
        assert_eq!(catalog.cost(InstructionGroup::Reg).flops, 4);
        // traffic costs are width-independent: one cache line is one line
        assert_eq!(catalog.cost(InstructionGroup::RamLoad).bytes, 64);
    }
}
