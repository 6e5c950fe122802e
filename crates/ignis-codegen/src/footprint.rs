//! Footprint planning: per-thread region sizes, repeat counts, and
//! reset-loop counters.

use ignis_targets::{ArchitectureProfile, Catalog, ConfigurationError, IsaVariant, MemoryLevel};

use crate::sequence::Sequence;

/// Per-thread plan derived from a profile, a sequence, and a thread count.
///
/// All splits are floor divisions; residual bytes and lines are left unused
/// rather than redistributed. Plans are transient — recomputed for every
/// (architecture, variant, thread-count) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPlan {
    /// Threads the profile is split across.
    pub threads: u32,
    /// Per-thread L1 region size in bytes.
    pub l1_size: u64,
    /// Per-thread L2 region size in bytes.
    pub l2_size: u64,
    /// Per-thread L3 region size in bytes.
    pub l3_size: u64,
    /// Per-thread RAM region size in bytes.
    pub ram_size: u64,
    /// Per-thread share of the nominal line count.
    pub lines: u64,
    /// Sequence traversals per work-loop pass.
    pub repeat: u64,
    /// L2 reset counter; absent when the sequence never walks the L2
    /// pointer.
    pub l2_loop_count: Option<u64>,
    /// L3 reset counter.
    pub l3_loop_count: Option<u64>,
    /// RAM reset counter.
    pub ram_loop_count: Option<u64>,
    /// Flops performed by one work-loop pass.
    pub flops: u64,
    /// Memory-traffic bytes moved by one work-loop pass.
    pub bytes: u64,
}

impl ThreadPlan {
    /// Compute the plan for one (profile, variant, thread-count) entry.
    pub fn compute(
        profile: &ArchitectureProfile,
        variant: IsaVariant,
        threads: u32,
        sequence: &Sequence,
    ) -> Result<ThreadPlan, ConfigurationError> {
        if threads == 0 {
            return Err(ConfigurationError::Validation {
                detail: format!(
                    "thread count 0 requested for {}/{}",
                    profile.arch, profile.model
                ),
            });
        }

        let key = profile.function_key(variant, threads);
        let split = u64::from(threads);
        let l1_size = profile.l1_size / split;
        let l2_size = profile.l2_size / split;
        let l3_size = profile.l3_size / split;
        let ram_size = profile.ram_size / split;
        let lines = profile.lines / split;

        let repeat = lines / sequence.len() as u64;
        if repeat == 0 {
            return Err(ConfigurationError::LineBudgetTooSmall {
                key,
                lines,
                sequence_len: sequence.len() as u64,
            });
        }

        let catalog = Catalog::for_variant(variant);
        let mut flops = 0u64;
        let mut bytes = 0u64;
        for wg in &profile.groups {
            let cost = catalog.cost(wg.group);
            flops += cost.flops * u64::from(wg.weight);
            bytes += cost.bytes * u64::from(wg.weight);
        }
        flops *= repeat;
        bytes *= repeat;

        let l2_loop_count =
            reset_counter(&key, MemoryLevel::L2, l2_size, profile.cl_size, repeat, sequence)?;
        let l3_loop_count =
            reset_counter(&key, MemoryLevel::L3, l3_size, profile.cl_size, repeat, sequence)?;
        let ram_loop_count =
            reset_counter(&key, MemoryLevel::Ram, ram_size, profile.cl_size, repeat, sequence)?;

        Ok(ThreadPlan {
            threads,
            l1_size,
            l2_size,
            l3_size,
            ram_size,
            lines,
            repeat,
            l2_loop_count,
            l3_loop_count,
            ram_loop_count,
            flops,
            bytes,
        })
    }

    /// Per-thread region size of `level`.
    pub fn level_size(&self, level: MemoryLevel) -> u64 {
        match level {
            MemoryLevel::L1 => self.l1_size,
            MemoryLevel::L2 => self.l2_size,
            MemoryLevel::L3 => self.l3_size,
            MemoryLevel::Ram => self.ram_size,
        }
    }

    /// Offset of `level`'s walk-pointer base within the per-thread buffer.
    ///
    /// Pointer bases stagger by the size of the level one down: the L2
    /// pointer starts at the L1 boundary and walks until the L3 base at
    /// `l2_size`, and so on.
    pub fn region_offset(&self, level: MemoryLevel) -> u64 {
        match level {
            MemoryLevel::L1 => 0,
            MemoryLevel::L2 => self.l1_size,
            MemoryLevel::L3 => self.l2_size,
            MemoryLevel::Ram => self.l3_size,
        }
    }

    /// Total per-thread buffer size the init function must prime.
    pub fn buffer_size(&self) -> u64 {
        self.l1_size + self.l2_size + self.l3_size + self.ram_size
    }

    /// Counter reload value for `level`, or None when unused.
    pub fn loop_count(&self, level: MemoryLevel) -> Option<u64> {
        match level {
            MemoryLevel::L1 => None,
            MemoryLevel::L2 => self.l2_loop_count,
            MemoryLevel::L3 => self.l3_loop_count,
            MemoryLevel::Ram => self.ram_loop_count,
        }
    }
}

/// Reset counter for one level: region size in cache-line units divided by
/// the pointer advances into that level per work-loop pass.
fn reset_counter(
    key: &str,
    level: MemoryLevel,
    region_bytes: u64,
    cl_size: u64,
    repeat: u64,
    sequence: &Sequence,
) -> Result<Option<u64>, ConfigurationError> {
    let accesses_per_loop = repeat * sequence.level_count(level);
    if accesses_per_loop == 0 {
        return Ok(None);
    }
    let count = (region_bytes / cl_size) / accesses_per_loop;
    if count == 0 {
        return Err(ConfigurationError::RegionTooSmall {
            key: key.to_string(),
            level,
            region_bytes,
            accesses_per_loop,
        });
    }
    Ok(Some(count))
}

/// Bytes of the profile's regions left unused by floor division at the
/// given thread count.
pub fn residual_bytes(profile: &ArchitectureProfile, threads: u32) -> u64 {
    let split = u64::from(threads);
    [
        profile.l1_size,
        profile.l2_size,
        profile.l3_size,
        profile.ram_size,
    ]
    .iter()
    .map(|size| size % split)
    .sum()
}
