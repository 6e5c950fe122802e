//! `ignis generate` — run the pipeline and write generated kernels.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};

use ignis_codegen::{generate, GenerationConfig, GenerationReport};
use ignis_targets::{
    discover_profiles, load_profile_toml, validate_profile, ArchitectureProfile, IsaVariant,
};

/// Run generation over built-in and discovered profiles.
///
/// The generated source goes to `output` (stdout if omitted); the report
/// goes to stderr so it never mixes with the artifact.
pub fn run(
    base_dir: &Path,
    variant: Option<&str>,
    profile_name: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let mut profiles = ArchitectureProfile::builtin();
    for (name, path) in discover_profiles(base_dir)? {
        let profile =
            load_profile_toml(&path).with_context(|| format!("loading profile '{name}'"))?;
        if let Err(issues) = validate_profile(&profile) {
            for issue in &issues {
                eprintln!("{}: {name}: {}", issue.severity, issue.message);
            }
            bail!("profile '{name}' failed validation");
        }
        profiles.push(profile);
    }

    if let Some(wanted) = profile_name {
        profiles.retain(|p| format!("{}_{}", p.arch, p.model) == wanted);
        if profiles.is_empty() {
            bail!("no profile named '{wanted}' (use 'ignis profile list')");
        }
    }

    let config = match variant {
        Some(tag) => GenerationConfig {
            variants: vec![tag.parse::<IsaVariant>()?],
        },
        None => GenerationConfig::default(),
    };

    let report = write_output(&profiles, &config, output)?;
    eprint!("{report}");
    Ok(())
}

fn write_output(
    profiles: &[ArchitectureProfile],
    config: &GenerationConfig,
    output: Option<&str>,
) -> Result<GenerationReport> {
    let report = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {path}"))?;
            generate(profiles, config, BufWriter::new(file))?
        }
        None => generate(profiles, config, io::stdout().lock())?,
    };
    Ok(report)
}
