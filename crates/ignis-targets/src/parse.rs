//! TOML parsing, serialization, validation, and discovery for profiles.
//!
//! Custom profiles are stored as `.profile.toml` files in the `profiles/`
//! directory next to the generator. This module provides functions to load,
//! validate, serialize, and discover these files.

use std::path::{Path, PathBuf};

use crate::arch::ArchitectureProfile;
use crate::error::{ConfigurationError, Result};
use crate::group::MemoryLevel;

/// A validation issue found in a profile definition.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load a profile from a `.profile.toml` file.
pub fn load_profile_toml(path: &Path) -> Result<ArchitectureProfile> {
    if !path.exists() {
        return Err(ConfigurationError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_profile_toml(&content)
}

/// Parse a profile from a TOML string.
pub fn parse_profile_toml(toml_str: &str) -> Result<ArchitectureProfile> {
    let profile: ArchitectureProfile = toml::from_str(toml_str)?;
    Ok(profile)
}

/// Serialize a profile to pretty TOML.
pub fn profile_to_toml(profile: &ArchitectureProfile) -> Result<String> {
    let toml_str = toml::to_string_pretty(profile)?;
    Ok(toml_str)
}

/// Validate a profile definition for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_profile(
    profile: &ArchitectureProfile,
) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if profile.arch.is_empty() || profile.model.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "arch and model ids must be non-empty".into(),
        });
    }

    if profile.isa.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "profile declares no instruction-set variants".into(),
        });
    }

    if profile.total_weight() == 0 {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!(
                "total operation weight is zero for {}/{}",
                profile.arch, profile.model
            ),
        });
    }

    if profile.threads.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "profile declares no thread counts".into(),
        });
    }
    for &t in &profile.threads {
        if t == 0 {
            issues.push(ValidationIssue {
                severity: "error",
                message: "thread count 0 is not usable".into(),
            });
        }
    }

    if profile.cl_size == 0 {
        issues.push(ValidationIssue {
            severity: "error",
            message: "cache-line size must be nonzero".into(),
        });
    } else if !profile.cl_size.is_power_of_two() {
        issues.push(ValidationIssue {
            severity: "warning",
            message: format!("cache-line size {} is not a power of two", profile.cl_size),
        });
    }

    if !(profile.l1_cover > 0.0 && profile.l1_cover <= 1.0) {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!(
                "l1-cover {} is outside the permitted (0, 1] range",
                profile.l1_cover
            ),
        });
    }

    // every accessed level needs a nonzero region
    for wg in &profile.groups {
        if wg.weight == 0 {
            continue;
        }
        if let Some(level) = wg.group.memory_level() {
            let size = match level {
                MemoryLevel::L1 => profile.l1_size,
                MemoryLevel::L2 => profile.l2_size,
                MemoryLevel::L3 => profile.l3_size,
                MemoryLevel::Ram => profile.ram_size,
            };
            if size == 0 {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!(
                        "operation {} is weighted but the {} region size is zero",
                        wg.group, level
                    ),
                });
            }
        }
    }

    if profile.lines < profile.total_weight() {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!(
                "line count {} cannot fit one sequence of length {}",
                profile.lines,
                profile.total_weight()
            ),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template `.profile.toml` for a new architecture.
///
/// Seeds from the Skylake-SP profile with the given arch id.
pub fn generate_template(arch: &str) -> Result<String> {
    let mut profile = ArchitectureProfile::skylake_sp();
    profile.arch = arch.into();
    profile.model = "custom".into();
    profile.name = format!("{arch} (custom)");
    profile_to_toml(&profile)
}

/// Discover all `.profile.toml` files in a `profiles/` directory.
///
/// Returns a list of (profile_name, file_path) pairs sorted by name.
pub fn discover_profiles(base_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let profiles_dir = base_dir.join("profiles");
    if !profiles_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut profiles = Vec::new();
    let entries = std::fs::read_dir(&profiles_dir)?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(name) = file_name.strip_suffix(".profile.toml") {
                profiles.push((name.to_string(), path.clone()));
            }
        }
    }
    profiles.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::InstructionGroup;

    #[test]
    fn round_trip_builtins() {
        for original in ArchitectureProfile::builtin() {
            let toml_str = profile_to_toml(&original).unwrap();
            let parsed = parse_profile_toml(&toml_str).unwrap();
            assert_eq!(original, parsed);
        }
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
arch = "zen2"
model = "epyc"
name = "AMD EPYC (Zen 2)"
isa = ["sse2", "avx"]
l1-size = 32768
l2-size = 524288
l3-size = 4194304
ram-size = 104857600
cl-size = 64
l1-cover = 0.5
threads = [1, 2]
lines = 1600
groups = [
    { group = "RAM_L", weight = 2 },
    { group = "L2_LS", weight = 18 },
    { group = "L1_LS", weight = 60 },
    { group = "REG", weight = 20 },
]
"#;
        let profile = parse_profile_toml(toml_str).unwrap();
        assert_eq!(profile.arch, "zen2");
        assert_eq!(profile.groups.len(), 4);
        assert_eq!(profile.groups[0].group, InstructionGroup::RamLoad);
        assert!(validate_profile(&profile).is_ok());
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(parse_profile_toml("this is not valid toml [[[").is_err());
    }

    #[test]
    fn parse_unknown_group_returns_error() {
        let toml_str = r#"
arch = "x"
model = "y"
name = "X"
isa = ["sse2"]
l1-size = 32768
l2-size = 262144
l3-size = 2097152
ram-size = 104857600
cl-size = 64
l1-cover = 0.5
threads = [1]
lines = 100
groups = [{ group = "L4_L", weight = 1 }]
"#;
        assert!(parse_profile_toml(toml_str).is_err());
    }

    #[test]
    fn validate_builtins() {
        for profile in ArchitectureProfile::builtin() {
            assert!(validate_profile(&profile).is_ok());
        }
    }

    #[test]
    fn validate_zero_weight() {
        let mut profile = ArchitectureProfile::skylake_sp();
        for wg in &mut profile.groups {
            wg.weight = 0;
        }
        let issues = validate_profile(&profile).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("weight is zero")));
    }

    #[test]
    fn validate_zero_thread_count() {
        let mut profile = ArchitectureProfile::skylake_sp();
        profile.threads = vec![0];
        let issues = validate_profile(&profile).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("thread count 0")));
    }

    #[test]
    fn validate_bad_coverage() {
        let mut profile = ArchitectureProfile::skylake_sp();
        profile.l1_cover = 1.5;
        let issues = validate_profile(&profile).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("l1-cover")));
    }

    #[test]
    fn validate_accessed_level_with_zero_region() {
        let mut profile = ArchitectureProfile::skylake_sp();
        profile.l3_size = 0;
        let issues = validate_profile(&profile).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.message.contains("L3 region size is zero")));
    }

    #[test]
    fn validate_line_budget() {
        let mut profile = ArchitectureProfile::skylake_sp();
        profile.lines = 10;
        let issues = validate_profile(&profile).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("cannot fit")));
    }

    #[test]
    fn generate_template_is_valid() {
        let toml_str = generate_template("zen3").unwrap();
        let profile = parse_profile_toml(&toml_str).unwrap();
        assert_eq!(profile.arch, "zen3");
        assert!(validate_profile(&profile).is_ok());
    }

    #[test]
    fn discover_profiles_finds_files() {
        let dir = tempfile::tempdir().unwrap();
        let profiles_dir = dir.path().join("profiles");
        std::fs::create_dir_all(&profiles_dir).unwrap();

        let template = generate_template("board-a").unwrap();
        std::fs::write(profiles_dir.join("board-a.profile.toml"), &template).unwrap();
        std::fs::write(profiles_dir.join("board-b.profile.toml"), &template).unwrap();
        // Non-.profile.toml file should be ignored
        std::fs::write(profiles_dir.join("notes.txt"), "ignore me").unwrap();

        let found = discover_profiles(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "board-a");
        assert_eq!(found[1].0, "board-b");
    }

    #[test]
    fn discover_without_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_profiles(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn load_not_found() {
        let result = load_profile_toml(Path::new("/nonexistent/x.profile.toml"));
        assert!(matches!(
            result.unwrap_err(),
            ConfigurationError::NotFound { .. }
        ));
    }
}
