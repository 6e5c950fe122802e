//! SSE2 emission template: 128-bit packed doubles.

use ignis_targets::IsaVariant;

use super::template::{EmissionTemplate, PrefetchTier, RegisterFile};

/// 14 xmm accumulators, 2 xmm transfer registers.
pub(crate) struct Sse2Template;

impl Sse2Template {
    const REGISTERS: RegisterFile = RegisterFile::x86_64("xmm", 14, 2);
}

impl EmissionTemplate for Sse2Template {
    fn variant(&self) -> IsaVariant {
        IsaVariant::Sse2
    }

    fn registers(&self) -> &RegisterFile {
        &Self::REGISTERS
    }

    fn add_reg(&self, dest: usize, src: usize) -> String {
        format!("addpd %%xmm{src}, %%xmm{dest};")
    }

    fn add_mem(&self, dest: usize, addr_reg: &str, disp: u64) -> String {
        format!("addpd {disp}(%%{addr_reg}), %%xmm{dest};")
    }

    fn store(&self, src: usize, addr_reg: &str, disp: u64) -> String {
        format!("movapd %%xmm{src}, {disp}(%%{addr_reg});")
    }

    fn transfer(&self, dest: usize, src: usize) -> String {
        let regs = &Self::REGISTERS;
        format!(
            "movdqa %%{}, %%{};",
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
        let mut lines = vec!["        //Initialize SSE-Registers for Addition".to_string()];
        for i in 0..regs.acc_pool {
            lines.push(format!(
                "        \"movapd {}(%%{}), %%xmm{i};\"",
                i * 32,
                regs.pointer
            ));
        }
        lines
    }

    fn init_transfers(&self) -> Vec<String> {
        let regs = &Self::REGISTERS;
        let mut lines = vec![
            "        //Initialize SSE-Registers for Transfer-Operations".to_string(),
            format!("        \"movabs $0x0F0F0F0F0F0F0F0F, %%{};\"", regs.temp),
        ];
        for i in 0..regs.trans_pool {
            let reg = regs.acc_pool + i;
            if i > 0 {
                // alternate the nibble pattern between transfer registers
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
        }
        lines
    }

    fn vector_clobbers(&self) -> Vec<String> {
        let mut clobbers: Vec<String> = (0..8).map(|i| format!("%mm{i}")).collect();
        clobbers.extend((0..16).map(|i| format!("%xmm{i}")));
        clobbers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_spellings() {
        let t = Sse2Template;
        assert_eq!(t.add_reg(5, 4), "addpd %%xmm4, %%xmm5;");
        assert_eq!(t.add_mem(3, "rbx", 32), "addpd 32(%%rbx), %%xmm3;");
        assert_eq!(t.store(3, "rcx", 64), "movapd %%xmm3, 64(%%rcx);");
        assert_eq!(t.transfer(0, 1), "movdqa %%xmm15, %%xmm14;");
        assert_eq!(t.prefetch("rdx", PrefetchTier::T0), "prefetcht0 (%%rdx);");
        assert_eq!(t.prefetch("rdi", PrefetchTier::T2), "prefetcht2 (%%rdi);");
    }

    #[test]
    fn accumulator_init_covers_pool() {
        let lines = Sse2Template.init_accumulators();
        // comment plus one movapd per accumulator
        assert_eq!(lines.len(), 15);
        assert!(lines[1].contains("movapd 0(%%rax), %%xmm0;"));
        assert!(lines[14].contains("movapd 416(%%rax), %%xmm13;"));
    }

    #[test]
    fn transfer_init_alternates_pattern() {
        let lines = Sse2Template.init_transfers();
        assert!(lines[1].contains("0x0F0F0F0F0F0F0F0F"));
        assert!(lines.iter().any(|l| l.contains("shl $4")));
        assert!(lines.iter().any(|l| l.contains("pinsrq $1, %%r11, %%xmm15;")));
    }

    #[test]
    fn clobbers_cover_all_data_registers() {
        let clobbers = Sse2Template.vector_clobbers();
        assert_eq!(clobbers.len(), 24);
        assert!(clobbers.contains(&"%mm7".to_string()));
        assert!(clobbers.contains(&"%xmm15".to_string()));
    }
}
