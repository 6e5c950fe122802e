//! AVX emission template: 256-bit packed doubles.
//!
//! Same register assignment and bundle structure as SSE2; the arithmetic
//! uses three-operand VEX encodings and ymm registers, and the transfer
//! pool is widened through the xmm lanes with vinsertf128.

use ignis_targets::IsaVariant;

use super::template::{EmissionTemplate, PrefetchTier, RegisterFile};

/// 14 ymm accumulators, 2 ymm transfer registers.
pub(crate) struct AvxTemplate;

impl AvxTemplate {
    const REGISTERS: RegisterFile = RegisterFile::x86_64("ymm", 14, 2);
}

impl EmissionTemplate for AvxTemplate {
    fn variant(&self) -> IsaVariant {
        IsaVariant::Avx
    }

    fn registers(&self) -> &RegisterFile {
        &Self::REGISTERS
    }

    fn add_reg(&self, dest: usize, src: usize) -> String {
        format!("vaddpd %%ymm{src}, %%ymm{dest}, %%ymm{dest};")
    }

    fn add_mem(&self, dest: usize, addr_reg: &str, disp: u64) -> String {
        format!("vaddpd {disp}(%%{addr_reg}), %%ymm{dest}, %%ymm{dest};")
    }

    fn store(&self, src: usize, addr_reg: &str, disp: u64) -> String {
        format!("vmovapd %%ymm{src}, {disp}(%%{addr_reg});")
    }

    fn transfer(&self, dest: usize, src: usize) -> String {
        let regs = &Self::REGISTERS;
        format!(
            "vmovdqa %%{}, %%{};",
            regs.trans_reg(src),
            regs.trans_reg(dest)
        )
    }

    fn prefetch(&self, addr_reg: &str, tier: PrefetchTier) -> String {
        let op = match tier {
            PrefetchTier::T0 => "prefetcht0",
            PrefetchTier::T2 => "prefetcht2",
        };
        format!("{op} (%%{addr_reg});")
    }

    fn init_accumulators(&self) -> Vec<String> {
        let regs = &Self::REGISTERS;
        let mut lines = vec!["        //Initialize AVX-Registers for Addition".to_string()];
        for i in 0..regs.acc_pool {
            lines.push(format!(
                "        \"vmovapd {}(%%{}), %%ymm{i};\"",
                i * 64,
                regs.pointer
            ));
        }
        lines
    }

    fn init_transfers(&self) -> Vec<String> {
        let regs = &Self::REGISTERS;
        let mut lines = vec![
            "        //Initialize AVX-Registers for Transfer-Operations".to_string(),
            format!("        \"movabs $0x0F0F0F0F0F0F0F0F, %%{};\"", regs.temp),
        ];
        for i in 0..regs.trans_pool {
            let reg = regs.acc_pool + i;
            if i > 0 {
                let shift = if reg % 2 == 0 { "shr" } else { "shl" };
                lines.push(format!("        \"{shift} $4, %%{};\"", regs.temp));
            }
            lines.push(format!(
                "        \"pinsrq $0, %%{}, %%xmm{reg};\"",
                regs.temp
            ));
            lines.push(format!(
                "        \"pinsrq $1, %%{}, %%xmm{reg};\"",
                regs.temp
            ));
            lines.push(format!(
                "        \"vinsertf128 $1, %%xmm{reg}, %%ymm{reg}, %%ymm{reg};\""
            ));
        }
        lines
    }

    fn vector_clobbers(&self) -> Vec<String> {
        (0..16).map(|i| format!("%xmm{i}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_spellings() {
        let t = AvxTemplate;
        assert_eq!(t.add_reg(5, 4), "vaddpd %%ymm4, %%ymm5, %%ymm5;");
        assert_eq!(
            t.add_mem(3, "rbx", 32),
            "vaddpd 32(%%rbx), %%ymm3, %%ymm3;"
        );
        assert_eq!(t.store(3, "rcx", 64), "vmovapd %%ymm3, 64(%%rcx);");
        assert_eq!(t.transfer(1, 0), "vmovdqa %%ymm14, %%ymm15;");
    }

    #[test]
    fn accumulator_init_uses_vector_stride() {
        let lines = AvxTemplate.init_accumulators();
        assert_eq!(lines.len(), 15);
        assert!(lines[1].contains("vmovapd 0(%%rax), %%ymm0;"));
        assert!(lines[14].contains("vmovapd 832(%%rax), %%ymm13;"));
    }

    #[test]
    fn transfer_init_widens_lanes() {
        let lines = AvxTemplate.init_transfers();
        assert!(lines
            .iter()
            .any(|l| l.contains("vinsertf128 $1, %%xmm14, %%ymm14, %%ymm14;")));
        assert!(lines
            .iter()
            .any(|l| l.contains("vinsertf128 $1, %%xmm15, %%ymm15, %%ymm15;")));
    }
}
