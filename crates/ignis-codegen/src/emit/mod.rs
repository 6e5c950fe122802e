//! Kernel emission: the register-rotation scheduler and function assembly.
//!
//! Expands (sequence x repeat count) into per-iteration instruction
//! bundles with latency-hiding register rotation and assembles the
//! buffer-initialization and work-loop function texts. The emitter is a
//! pure function of its inputs — no side effects beyond producing text.

mod avx;
mod rotation;
mod sse2;
mod template;

pub use rotation::{L1Step, RotationState};
pub use template::{template_for, EmissionTemplate, PrefetchTier, RegisterFile};

use ignis_targets::{
    ArchitectureProfile, InstructionGroup, IsaVariant, MemoryLevel,
};

use crate::footprint::ThreadPlan;
use crate::sequence::Sequence;

/// One work-loop line: up to four parallel issue slots plus a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Arithmetic slot; always filled.
    pub arith: String,
    /// Store or prefetch slot.
    pub memory: String,
    /// Auxiliary transfer slot, independent of the accumulator chain.
    pub transfer: String,
    /// Pointer-advance or pointer-rewind slot.
    pub pointer: String,
    /// Trailing source comment naming the operation.
    pub comment: &'static str,
}

/// The emitted function pair for one (architecture, variant, thread-count)
/// entry. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelFunctions {
    /// `<arch>_<model>_<variant>_<threads>t` — the lookup name contract.
    pub key: String,
    /// Buffer-priming function; writes the flops/bytes metadata once.
    pub init: String,
    /// Work-loop function embedding the instruction stream.
    pub work: String,
}

/// Emit the init/work pair for one planned entry.
pub fn emit_kernel(
    profile: &ArchitectureProfile,
    variant: IsaVariant,
    threads: u32,
    sequence: &Sequence,
    plan: &ThreadPlan,
) -> KernelFunctions {
    let key = profile.function_key(variant, threads);
    let template = template_for(variant);
    let init = emit_init(plan, &key);
    let work = emit_work(profile, threads, sequence, plan, template, &key);
    KernelFunctions { key, init, work }
}

/// Expand (sequence x repeat) into the flat bundle list.
///
/// The rotation state is threaded through explicitly; two expansions of the
/// same inputs produce identical bundles.
pub fn expand_bundles(
    sequence: &Sequence,
    plan: &ThreadPlan,
    profile: &ArchitectureProfile,
    template: &dyn EmissionTemplate,
) -> Vec<Bundle> {
    let l1_threshold = (plan.l1_size as f64 * profile.l1_cover) as u64;
    let mut state = RotationState::new();
    let mut bundles = Vec::with_capacity(plan.repeat as usize * sequence.len());
    for _ in 0..plan.repeat {
        for &group in sequence.items() {
            let (bundle, next) = emit_bundle(group, state, profile, template, l1_threshold);
            bundles.push(bundle);
            state = next;
        }
    }
    bundles
}

/// Emission rule for one operation symbol: fill the slots and advance the
/// rotation state.
fn emit_bundle(
    group: InstructionGroup,
    state: RotationState,
    profile: &ArchitectureProfile,
    template: &dyn EmissionTemplate,
    l1_threshold: u64,
) -> (Bundle, RotationState) {
    let regs = template.registers();
    let dest = state.acc_dest;
    let ahead = state.acc_src_ahead(regs.acc_pool);
    let behind = state.acc_src_behind(regs.acc_pool);

    let mut bundle = Bundle {
        arith: String::new(),
        memory: String::new(),
        transfer: String::new(),
        pointer: String::new(),
        comment: "",
    };
    let mut next = state;

    match group {
        InstructionGroup::Reg => {
            bundle.arith = template.add_reg(dest, ahead);
            bundle.transfer = template.transfer(state.trans_dest, state.trans_src);
            bundle.comment = "// REG ops only";
        }
        InstructionGroup::L1Load => {
            bundle.arith = template.add_mem(dest, regs.l1_addr, 32);
            let (s, step) = next.l1_stepped(profile.cl_size, l1_threshold);
            next = s;
            bundle.pointer = l1_pointer(step, regs);
            bundle.comment = "// L1 load";
        }
        InstructionGroup::L1Store => {
            bundle.arith = template.add_reg(dest, behind);
            bundle.memory = template.store(dest, regs.l1_addr, 32);
            let (s, step) = next.l1_stepped(profile.cl_size, l1_threshold);
            next = s;
            bundle.pointer = l1_pointer(step, regs);
            bundle.comment = "// L1 store";
        }
        InstructionGroup::L1LoadStore => {
            bundle.arith = template.add_mem(dest, regs.l1_addr, 32);
            bundle.memory = template.store(dest, regs.l1_addr, 64);
            let (s, step) = next.l1_stepped(profile.cl_size, l1_threshold);
            next = s;
            bundle.pointer = l1_pointer(step, regs);
            bundle.comment = "// L1 load, L1 store";
        }
        InstructionGroup::L2Load => {
            bundle.arith = template.add_mem(dest, regs.l2_addr, 64);
            bundle.pointer = advance(regs, regs.l2_addr);
            bundle.comment = "// L2 load";
        }
        InstructionGroup::L2Store => {
            bundle.arith = template.add_reg(dest, behind);
            bundle.memory = template.store(dest, regs.l2_addr, 64);
            bundle.pointer = advance(regs, regs.l2_addr);
            bundle.comment = "// L2 store";
        }
        InstructionGroup::L2LoadStore => {
            bundle.arith = template.add_mem(dest, regs.l2_addr, 64);
            bundle.memory = template.store(dest, regs.l2_addr, 96);
            bundle.pointer = advance(regs, regs.l2_addr);
            bundle.comment = "// L2 load, L2 store";
        }
        InstructionGroup::L3Load => {
            bundle.arith = template.add_mem(dest, regs.l3_addr, 64);
            bundle.pointer = advance(regs, regs.l3_addr);
            bundle.comment = "// L3 load";
        }
        InstructionGroup::L3Store => {
            bundle.arith = template.add_reg(dest, behind);
            bundle.memory = template.store(dest, regs.l3_addr, 96);
            bundle.pointer = advance(regs, regs.l3_addr);
            bundle.comment = "// L3 store";
        }
        InstructionGroup::L3LoadStore => {
            bundle.arith = template.add_mem(dest, regs.l3_addr, 64);
            bundle.memory = template.store(dest, regs.l3_addr, 96);
            bundle.pointer = advance(regs, regs.l3_addr);
            bundle.comment = "// L3 load, L3 store";
        }
        InstructionGroup::L3Prefetch => {
            bundle.arith = template.add_mem(dest, regs.l1_addr, 32);
            bundle.memory = template.prefetch(regs.l3_addr, PrefetchTier::T0);
            bundle.pointer = advance(regs, regs.l3_addr);
            bundle.comment = "// L3 prefetch";
        }
        InstructionGroup::RamLoad => {
            bundle.arith = template.add_mem(dest, regs.ram_addr, 64);
            bundle.pointer = advance(regs, regs.ram_addr);
            bundle.comment = "// RAM load";
        }
        InstructionGroup::RamStore => {
            bundle.arith = template.add_reg(dest, behind);
            bundle.memory = template.store(dest, regs.ram_addr, 64);
            bundle.pointer = advance(regs, regs.ram_addr);
            bundle.comment = "// RAM store";
        }
        InstructionGroup::RamLoadStore => {
            bundle.arith = template.add_mem(dest, regs.l3_addr, 64);
            bundle.memory = template.store(dest, regs.ram_addr, 64);
            bundle.pointer = advance(regs, regs.ram_addr);
            bundle.comment = "// L3 load, RAM store";
        }
        InstructionGroup::RamPrefetch => {
            bundle.arith = template.add_mem(dest, regs.l1_addr, 32);
            bundle.memory = template.prefetch(regs.ram_addr, PrefetchTier::T2);
            bundle.pointer = advance(regs, regs.ram_addr);
            bundle.comment = "// RAM prefetch";
        }
    }

    next = next.rotated(regs.acc_pool, regs.trans_pool);
    (bundle, next)
}

fn advance(regs: &RegisterFile, addr_reg: &str) -> String {
    format!("add %%{}, %%{addr_reg};", regs.offset)
}

fn l1_pointer(step: L1Step, regs: &RegisterFile) -> String {
    match step {
        L1Step::Advance => advance(regs, regs.l1_addr),
        L1Step::Rewind => format!("mov %%{}, %%{};", regs.pointer, regs.l1_addr),
    }
}

/// Assemble the buffer-priming init function.
///
/// Seeds the first block with scaled doubles, replicates it block-wise,
/// finishes the tail with a scalar loop, then writes the per-thread
/// flops/bytes metadata the execution engine reports from.
fn emit_init(plan: &ThreadPlan, key: &str) -> String {
    let buffersize = plan.buffer_size();
    let mut out = String::new();
    out.push_str(&format!(
        "int init_{key}(threaddata_t* threaddata) __attribute__((noinline));\n"
    ));
    out.push_str(&format!("int init_{key}(threaddata_t* threaddata)\n"));
    out.push_str("{\n");
    out.push_str("    unsigned long long addrMem = threaddata->addrMem;\n");
    out.push_str("    int i;\n");
    out.push('\n');
    out.push_str(
        "    for (i = 0; i < INIT_BLOCKSIZE; i+=8) *((double*)(addrMem+i)) = i * 1.654738925401e-10;\n",
    );
    out.push_str(&format!(
        "    for (i = INIT_BLOCKSIZE; i <= {buffersize} - INIT_BLOCKSIZE; i+= INIT_BLOCKSIZE) memcpy((void*)(addrMem+i),(void*)(addrMem+i-INIT_BLOCKSIZE),INIT_BLOCKSIZE);\n"
    ));
    out.push_str(&format!(
        "    for (; i <= {buffersize}-8; i+=8) *((double*)(addrMem+i)) = i * 1.654738925401e-15;\n"
    ));
    out.push('\n');
    out.push_str(&format!("    threaddata->flops={};\n", plan.flops));
    out.push_str(&format!("    threaddata->bytes={};\n", plan.bytes));
    out.push('\n');
    out.push_str("    return EXIT_SUCCESS;\n");
    out.push_str("}\n");
    out
}

/// Assemble the work-loop function around the expanded bundles.
fn emit_work(
    profile: &ArchitectureProfile,
    threads: u32,
    sequence: &Sequence,
    plan: &ThreadPlan,
    template: &dyn EmissionTemplate,
    key: &str,
) -> String {
    let regs = template.registers();
    let mut out = String::new();

    out.push_str("/**\n");
    out.push_str(" * assembler implementation of processor and memory stress test\n");
    out.push_str(&format!(
        " * ISA: {}\n",
        template.variant().as_str().to_uppercase()
    ));
    out.push_str(&format!(
        " * optimized for {} - {} thread(s) per core\n",
        profile.name, threads
    ));
    out.push_str(" */\n");
    out.push_str(&format!(
        "int asm_work_{key}(threaddata_t* threaddata) __attribute__((noinline));\n"
    ));
    out.push_str(&format!("int asm_work_{key}(threaddata_t* threaddata)\n"));
    out.push_str("{\n");
    out.push_str(
        "    if (*((unsigned long long*)threaddata->addrHigh) == 0) return EXIT_SUCCESS;\n",
    );
    out.push_str(&register_contract(regs));
    out.push_str("        __asm__ __volatile__(\n");
    out.push_str(&format!(
        "        \"mov %%rax, %%{};\" // store start address of buffer in {}\n",
        regs.pointer, regs.pointer
    ));
    out.push_str(&format!(
        "        \"mov %%rbx, %%{};\" // store address of shared variable that controls load level in {}\n",
        regs.flag_addr, regs.flag_addr
    ));
    out.push_str(&format!(
        "        \"mov %%rcx, %%{};\" // store iteration counter in {}\n",
        regs.iter, regs.iter
    ));
    out.push_str(&format!(
        "        \"mov ${}, %%{};\" // increment after each cache/memory access\n",
        profile.cl_size, regs.offset
    ));
    for line in template.init_accumulators() {
        out.push_str(&line);
        out.push('\n');
    }
    for line in template.init_transfers() {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!(
        "        \"mov %%{}, %%{};\" // address for L1-buffer\n",
        regs.pointer, regs.l1_addr
    ));
    for (level, addr_reg) in [
        (MemoryLevel::L2, regs.l2_addr),
        (MemoryLevel::L3, regs.l3_addr),
        (MemoryLevel::Ram, regs.ram_addr),
    ] {
        out.push_str(&format!(
            "        \"mov %%{}, %%{addr_reg};\"\n",
            regs.pointer
        ));
        out.push_str(&format!(
            "        \"add ${}, %%{addr_reg};\" // address for {level}-buffer\n",
            plan.region_offset(level)
        ));
    }

    for (level, count_reg) in [
        (MemoryLevel::L2, regs.l2_count),
        (MemoryLevel::L3, regs.l3_count),
        (MemoryLevel::Ram, regs.ram_count),
    ] {
        if let Some(count) = plan.loop_count(level) {
            let lines_per_loop = plan.repeat * sequence.level_count(level);
            let kb = (lines_per_loop * profile.cl_size) as f64 / 1024.0;
            out.push_str(&format!(
                "        \"movabs ${count}, %%{count_reg};\" // reset-counter for {level}-buffer with {lines_per_loop} cache lines accessed per loop ({kb:.2} KB)\n"
            ));
        }
    }

    out.push('\n');
    out.push_str("        \".align 64;\"     /* alignment in bytes */\n");
    out.push_str(&format!("        \"_work_loop_{key}:\"\n"));
    out.push_str(
        "        /****************************************************************************************************\n",
    );
    out.push_str(
        "         decode 0                       decode 1                       decode 2                       decode 3 */\n",
    );
    for bundle in expand_bundles(sequence, plan, profile, template) {
        out.push_str(&format!(
            "        \"{:<30} {:<30} {:<30} {:<30}\" {}\n",
            bundle.arith, bundle.memory, bundle.transfer, bundle.pointer, bundle.comment
        ));
    }

    // countdown blocks in fixed order: RAM, then L2, then L3
    for (level, label, what, count_reg, addr_reg) in [
        (MemoryLevel::Ram, "ram", "RAM counter", regs.ram_count, regs.ram_addr),
        (MemoryLevel::L2, "L2", "L2-Cache counter", regs.l2_count, regs.l2_addr),
        (MemoryLevel::L3, "L3", "L3-Cache counter", regs.l3_count, regs.l3_addr),
    ] {
        let Some(count) = plan.loop_count(level) else {
            continue;
        };
        out.push_str(&format!("        //reset {what}\n"));
        out.push_str(&format!("        \"sub $1, %%{count_reg};\"\n"));
        out.push_str(&format!(
            "        \"jnz _work_no_{label}_reset_{key};\"\n"
        ));
        out.push_str(&format!("        \"movabs ${count}, %%{count_reg};\"\n"));
        out.push_str(&format!(
            "        \"mov %%{}, %%{addr_reg};\"\n",
            regs.pointer
        ));
        out.push_str(&format!(
            "        \"add ${}, %%{addr_reg};\"\n",
            plan.region_offset(level)
        ));
        out.push_str(&format!("        \"_work_no_{label}_reset_{key}:\"\n"));
    }

    out.push_str(&format!(
        "        \"inc %%{};\" // increment iteration counter\n",
        regs.iter
    ));
    out.push_str(&format!(
        "        \"mov %%{}, %%{};\"\n",
        regs.pointer, regs.l1_addr
    ));
    out.push_str(&format!("        \"testq $1, (%%{});\"\n", regs.flag_addr));
    out.push_str(&format!("        \"jnz _work_loop_{key};\"\n"));
    out.push_str(&format!(
        "        \"movq %%{}, %%rax;\" // restore iteration counter\n",
        regs.iter
    ));
    out.push_str("        : \"=a\" (threaddata->iterations)\n");
    out.push_str(
        "        : \"a\"(threaddata->addrMem), \"b\"(threaddata->addrHigh), \"c\" (threaddata->iterations)\n",
    );
    let mut clobbers = regs.gp_clobbers();
    clobbers.extend(template.vector_clobbers());
    let clobber_list = clobbers
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("        : {clobber_list}\n"));
    out.push_str("        );\n");
    out.push_str("    return EXIT_SUCCESS;\n");
    out.push_str("}\n");
    out
}

/// The register-contract comment block at the top of the work function.
fn register_contract(regs: &RegisterFile) -> String {
    let mut out = String::new();
    out.push_str("        /* input:\n");
    out.push_str("         *   - threaddata->addrMem    -> rax\n");
    out.push_str("         *   - threaddata->addrHigh   -> rbx\n");
    out.push_str("         *   - threaddata->iterations -> rcx\n");
    out.push_str("         * output:\n");
    out.push_str("         *   - rax -> threaddata->iterations\n");
    out.push_str("         * register usage:\n");
    let rows: [(&str, &str); 13] = [
        (
            regs.pointer,
            "stores original pointer to buffer, used to periodically reset other pointers",
        ),
        (regs.l1_addr, "pointer to L1 buffer"),
        (regs.l2_addr, "pointer to L2 buffer"),
        (regs.l3_addr, "pointer to L3 buffer"),
        (regs.ram_addr, "pointer to RAM buffer"),
        (regs.l2_count, "counter for L2-pointer reset"),
        (regs.l3_count, "counter for L3-pointer reset"),
        (regs.ram_count, "counter for RAM-pointer reset"),
        (regs.temp, "register for temporary results"),
        (
            regs.offset,
            "stores cacheline width as increment for buffer addresses",
        ),
        (
            regs.flag_addr,
            "stores address of shared variable that controls load level",
        ),
        (regs.iter, "stores iteration counter"),
        (regs.vec, "data registers for SIMD instructions"),
    ];
    for (reg, what) in rows {
        let name = if reg == regs.vec {
            format!("{reg}*:")
        } else {
            format!("{reg}:")
        };
        out.push_str(&format!("         *   - {name:<9} {what}\n"));
    }
    out.push_str("         */\n");
    out
}
