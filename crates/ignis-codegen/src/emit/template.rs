//! Per-variant emission templates: register files and instruction
//! spellings.

use ignis_targets::IsaVariant;

use super::avx::AvxTemplate;
use super::sse2::Sse2Template;

/// Prefetch locality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchTier {
    /// All cache levels — used for L3-resident data.
    T0,
    /// Far tier — used for RAM-resident data.
    T2,
}

/// Register assignment for the x86-64 kernel family.
///
/// The pointer and counter registers are fixed by the extended-asm
/// contract shared across variants; only the vector side differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    /// Buffer base; holds the original pointer used for rewinds.
    pub pointer: &'static str,
    /// L1 walk pointer.
    pub l1_addr: &'static str,
    /// L2 walk pointer.
    pub l2_addr: &'static str,
    /// L3 walk pointer.
    pub l3_addr: &'static str,
    /// RAM walk pointer.
    pub ram_addr: &'static str,
    /// L2 reset countdown.
    pub l2_count: &'static str,
    /// L3 reset countdown.
    pub l3_count: &'static str,
    /// RAM reset countdown.
    pub ram_count: &'static str,
    /// Scratch register for immediates.
    pub temp: &'static str,
    /// Holds the cache-line width used as pointer increment.
    pub offset: &'static str,
    /// Address of the shared control flag.
    pub flag_addr: &'static str,
    /// Iteration counter.
    pub iter: &'static str,
    /// Vector register prefix ("xmm", "ymm").
    pub vec: &'static str,
    /// Accumulator pool size; vector registers `0..acc_pool`.
    pub acc_pool: usize,
    /// Transfer pool size; vector registers `acc_pool..acc_pool + trans_pool`.
    pub trans_pool: usize,
}

impl RegisterFile {
    /// The fixed x86-64 assignment shared by the kernel family.
    pub const fn x86_64(vec: &'static str, acc_pool: usize, trans_pool: usize) -> Self {
        Self {
            pointer: "rax",
            l1_addr: "rbx",
            l2_addr: "rcx",
            l3_addr: "rdx",
            ram_addr: "rdi",
            l2_count: "r8",
            l3_count: "r9",
            ram_count: "r10",
            temp: "r11",
            offset: "r12",
            flag_addr: "r13",
            iter: "r14",
            vec,
            acc_pool,
            trans_pool,
        }
    }

    /// Vector register name for an accumulator-pool index.
    pub fn acc_reg(&self, idx: usize) -> String {
        format!("{}{}", self.vec, idx)
    }

    /// Vector register name for a transfer-pool index.
    pub fn trans_reg(&self, idx: usize) -> String {
        format!("{}{}", self.vec, self.acc_pool + idx)
    }

    /// General-purpose registers the kernel clobbers.
    ///
    /// rax/rbx/rcx are bound by the in/out constraint lists and are not
    /// repeated. The iteration register is included — leaving it out would
    /// silently corrupt caller-saved state.
    pub fn gp_clobbers(&self) -> Vec<String> {
        [
            self.l3_addr,
            self.ram_addr,
            self.l2_count,
            self.l3_count,
            self.ram_count,
            self.temp,
            self.offset,
            self.flag_addr,
            self.iter,
        ]
        .iter()
        .map(|r| format!("%{r}"))
        .collect()
    }
}

/// Instruction spellings for one instruction-set variant.
///
/// Implementations provide only the vector texture; bundle structure,
/// rotation bookkeeping, and pointer arithmetic live in the emitter. The
/// slot methods return bare asm statements; the prologue methods return
/// complete source lines (indentation and quoting included) emitted
/// verbatim.
pub trait EmissionTemplate {
    /// The variant this template emits for.
    fn variant(&self) -> IsaVariant;

    /// The register assignment.
    fn registers(&self) -> &RegisterFile;

    /// Packed add of two accumulator registers.
    fn add_reg(&self, dest: usize, src: usize) -> String;

    /// Packed add with a memory source operand.
    fn add_mem(&self, dest: usize, addr_reg: &str, disp: u64) -> String;

    /// Aligned store of accumulator `src`.
    fn store(&self, src: usize, addr_reg: &str, disp: u64) -> String;

    /// Register transfer within the transfer pool.
    fn transfer(&self, dest: usize, src: usize) -> String;

    /// Prefetch through the given locality tier.
    fn prefetch(&self, addr_reg: &str, tier: PrefetchTier) -> String;

    /// Prologue lines filling the accumulator pool from the buffer.
    fn init_accumulators(&self) -> Vec<String>;

    /// Prologue lines seeding the transfer pool with a bit pattern.
    fn init_transfers(&self) -> Vec<String>;

    /// Data registers named in the clobber list.
    fn vector_clobbers(&self) -> Vec<String>;
}

/// The emission template for `variant`.
pub fn template_for(variant: IsaVariant) -> &'static dyn EmissionTemplate {
    match variant {
        IsaVariant::Sse2 => &Sse2Template,
        IsaVariant::Avx => &AvxTemplate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_register_names() {
        let regs = RegisterFile::x86_64("xmm", 14, 2);
        assert_eq!(regs.acc_reg(0), "xmm0");
        assert_eq!(regs.acc_reg(13), "xmm13");
        assert_eq!(regs.trans_reg(0), "xmm14");
        assert_eq!(regs.trans_reg(1), "xmm15");
    }

    #[test]
    fn clobbers_include_iteration_register() {
        let regs = RegisterFile::x86_64("xmm", 14, 2);
        let clobbers = regs.gp_clobbers();
        assert!(clobbers.contains(&"%r14".to_string()));
        // in/out constrained registers never appear
        assert!(!clobbers.contains(&"%rax".to_string()));
        assert!(!clobbers.contains(&"%rbx".to_string()));
        assert!(!clobbers.contains(&"%rcx".to_string()));
    }

    #[test]
    fn every_variant_has_a_template() {
        for variant in IsaVariant::ALL {
            let template = template_for(variant);
            assert_eq!(template.variant(), variant);
            assert_eq!(
                template.registers().acc_pool + template.registers().trans_pool,
                16
            );
        }
    }
}
