//! Generation pipeline: cross-product orchestration over profiles,
//! variants, and thread counts.

use std::io::Write;

use ignis_targets::{ArchitectureProfile, ConfigurationError, IsaVariant};

use crate::emit::{emit_kernel, KernelFunctions};
use crate::footprint::{residual_bytes, ThreadPlan};
use crate::report::GenerationReport;
use crate::sequence::Sequence;
use crate::writer::OutputWriter;

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Variants to generate. Architectures not declaring a variant are
    /// silently skipped — the pair is counted in the report but no function
    /// is emitted for it.
    pub variants: Vec<IsaVariant>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            variants: IsaVariant::ALL.to_vec(),
        }
    }
}

/// Generate the function pair for one specific entry.
///
/// Unlike the cross-product path, requesting an undeclared variant here is
/// an error, not a skip: a caller asking for a single pair should learn why
/// nothing came back.
pub fn generate_pair(
    profile: &ArchitectureProfile,
    variant: IsaVariant,
    threads: u32,
) -> Result<KernelFunctions, ConfigurationError> {
    if !profile.supports(variant) {
        return Err(ConfigurationError::UnsupportedVariant {
            arch: profile.arch.clone(),
            model: profile.model.clone(),
            variant: variant.to_string(),
        });
    }
    let sequence = Sequence::for_profile(profile)?;
    let plan = ThreadPlan::compute(profile, variant, threads, &sequence)?;
    Ok(emit_kernel(profile, variant, threads, &sequence, &plan))
}

/// Run the full cross-product and serialize every emitted pair.
///
/// A validation failure aborts only its own entry and is collected in the
/// report; an I/O failure aborts the run.
pub fn generate<W: Write>(
    profiles: &[ArchitectureProfile],
    config: &GenerationConfig,
    out: W,
) -> Result<GenerationReport, ConfigurationError> {
    let mut writer = OutputWriter::new(out);
    let mut report = GenerationReport::default();

    for profile in profiles {
        for &variant in &config.variants {
            if !profile.supports(variant) {
                report.pairs_skipped += 1;
                continue;
            }
            for &threads in &profile.threads {
                match generate_pair(profile, variant, threads) {
                    Ok(kernel) => {
                        writer.write_kernel(&kernel)?;
                        report.pairs_emitted += 1;
                        report.residual_bytes += residual_bytes(profile, threads);
                    }
                    Err(err) => {
                        report
                            .failures
                            .push((profile.function_key(variant, threads), err.to_string()));
                    }
                }
            }
        }
    }

    Ok(report)
}
