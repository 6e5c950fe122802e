//! `ignis profile` — profile listing, description, and validation.

use std::path::Path;

use anyhow::{bail, Result};

use ignis_targets::{
    discover_profiles, generate_template, load_profile_toml, profile_to_toml, validate_profile,
    ArchitectureProfile,
};

/// List built-in and discovered profiles.
pub fn list(base_dir: &Path) -> Result<()> {
    println!("Built-in profiles:");
    println!();
    for p in ArchitectureProfile::builtin() {
        println!("  {:<15} {}", format!("{}_{}", p.arch, p.model), p.name);
    }

    let discovered = discover_profiles(base_dir)?;
    if !discovered.is_empty() {
        println!();
        println!("Custom profiles (profiles/):");
        for (name, _) in discovered {
            println!("  {name}");
        }
    }

    println!();
    println!("Use 'ignis profile describe <name>' for details.");
    Ok(())
}

/// Describe a specific profile in detail.
pub fn describe(base_dir: &Path, name: &str, format: Option<&str>) -> Result<()> {
    let profile = resolve(base_dir, name)?;

    if format == Some("toml") {
        print!("{}", profile_to_toml(&profile)?);
        return Ok(());
    }

    println!("=== Profile: {}_{} ===", profile.arch, profile.model);
    println!("Name: {}", profile.name);
    println!();

    println!("--- Variants ---");
    for v in &profile.isa {
        println!("  {v}");
    }
    println!();

    println!("--- Memory ---");
    println!("  L1:   {} bytes", profile.l1_size);
    println!("  L2:   {} bytes", profile.l2_size);
    println!("  L3:   {} bytes", profile.l3_size);
    println!("  RAM:  {} bytes", profile.ram_size);
    println!("  Cache line: {} bytes", profile.cl_size);
    println!("  L1 coverage: {}", profile.l1_cover);
    println!();

    println!("--- Workload ---");
    for wg in &profile.groups {
        println!("  {:<7} {}", wg.group.to_string(), wg.weight);
    }
    println!("  Lines:   {}", profile.lines);
    println!("  Threads: {:?}", profile.threads);

    Ok(())
}

/// Seed a custom profile template under `profiles/`.
pub fn add(base_dir: &Path, name: &str) -> Result<()> {
    let profiles_dir = base_dir.join("profiles");
    std::fs::create_dir_all(&profiles_dir)?;
    let path = profiles_dir.join(format!("{name}.profile.toml"));
    if path.exists() {
        bail!("profile '{name}' already exists at {}", path.display());
    }
    std::fs::write(&path, generate_template(name)?)?;
    println!("Created {}", path.display());
    println!("Edit the file, then run 'ignis profile validate {name}'.");
    Ok(())
}

/// Validate a profile definition.
pub fn validate(base_dir: &Path, name: &str) -> Result<()> {
    let profile = resolve(base_dir, name)?;
    match validate_profile(&profile) {
        Ok(()) => {
            println!("Profile '{name}' is valid.");
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                eprintln!("{}: {}", issue.severity, issue.message);
            }
            let errors = issues.iter().filter(|i| i.severity == "error").count();
            if errors > 0 {
                bail!("profile '{name}' has {errors} error(s)");
            }
            println!("Profile '{name}' is valid ({} warning(s)).", issues.len());
            Ok(())
        }
    }
}

/// Look a profile up among built-ins, then among discovered files.
fn resolve(base_dir: &Path, name: &str) -> Result<ArchitectureProfile> {
    if let Some(profile) = ArchitectureProfile::builtin_named(name) {
        return Ok(profile);
    }
    for (found, path) in discover_profiles(base_dir)? {
        if found == name {
            return Ok(load_profile_toml(&path)?);
        }
    }
    bail!("unknown profile: '{name}'. Use 'ignis profile list' to see available profiles.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_known_profile() {
        let dir = tempfile::tempdir().unwrap();
        assert!(describe(dir.path(), "skl_xeonsp", None).is_ok());
        assert!(describe(dir.path(), "skl_xeonsp", Some("toml")).is_ok());
    }

    #[test]
    fn describe_unknown_profile() {
        let dir = tempfile::tempdir().unwrap();
        assert!(describe(dir.path(), "nonexistent", None).is_err());
    }

    #[test]
    fn add_then_resolve() {
        let dir = tempfile::tempdir().unwrap();
        add(dir.path(), "zen4").unwrap();
        let profile = resolve(dir.path(), "zen4").unwrap();
        assert_eq!(profile.arch, "zen4");
        // second add refuses to overwrite
        assert!(add(dir.path(), "zen4").is_err());
    }

    #[test]
    fn validate_builtin() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate(dir.path(), "nhm_xeonep").is_ok());
    }
}
