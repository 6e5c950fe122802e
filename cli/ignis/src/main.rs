//! ignis CLI — generate processor stress-test kernels ahead of measurement.

mod commands;

use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ignis", version, about = "Stress-test kernel generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate init/work function pairs for the selected profiles
    Generate {
        /// Instruction-set variant (sse2, avx; default: every declared variant)
        #[arg(long)]
        variant: Option<String>,
        /// Generate only the named profile (default: all)
        #[arg(long)]
        profile: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<String>,
    },
    /// Manage hardware profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List available profiles
    List,
    /// Show details of a profile
    Describe {
        /// Profile name (`<arch>_<model>`)
        name: String,
        /// Output format (default: human-readable, "toml" for TOML)
        #[arg(long)]
        format: Option<String>,
    },
    /// Seed a custom profile definition
    Add {
        /// Architecture id for the new profile
        name: String,
    },
    /// Validate a profile definition
    Validate {
        /// Profile name
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Generate {
            variant,
            profile,
            output,
        } => commands::generate::run(
            &cwd,
            variant.as_deref(),
            profile.as_deref(),
            output.as_deref(),
        ),

        Commands::Profile { action } => match action {
            ProfileAction::List => commands::profile::list(&cwd),
            ProfileAction::Describe { name, format } => {
                commands::profile::describe(&cwd, &name, format.as_deref())
            }
            ProfileAction::Add { name } => commands::profile::add(&cwd, &name),
            ProfileAction::Validate { name } => commands::profile::validate(&cwd, &name),
        },
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Full workflow: generate to a file, then check the artifact's shape.
    #[test]
    fn generate_to_file_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("kernels.c");

        commands::generate::run(dir.path(), None, None, Some(out_path.to_str().unwrap()))
            .unwrap();

        let text = std::fs::read_to_string(&out_path).unwrap();
        // one init/work pair per declared (variant, thread-count)
        assert!(text.contains("int init_skl_xeonsp_sse2_1t(threaddata_t* threaddata)"));
        assert!(text.contains("int asm_work_skl_xeonsp_avx_2t(threaddata_t* threaddata)"));
        assert!(text.contains("int asm_work_nhm_xeonep_sse2_2t(threaddata_t* threaddata)"));
        // nehalem declares no avx: the pair is silently absent
        assert!(!text.contains("nhm_xeonep_avx"));
    }

    /// Variant filter narrows the cross-product.
    #[test]
    fn generate_variant_filter() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("avx.c");

        commands::generate::run(
            dir.path(),
            Some("avx"),
            None,
            Some(out_path.to_str().unwrap()),
        )
        .unwrap();

        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.contains("asm_work_skl_xeonsp_avx_1t"));
        assert!(!text.contains("sse2"));
    }

    /// Unknown variant tag fails cleanly.
    #[test]
    fn generate_unknown_variant() {
        let dir = tempfile::tempdir().unwrap();
        let result = commands::generate::run(dir.path(), Some("avx1024"), None, None);
        assert!(result.is_err());
    }

    /// Profile filter selects a single architecture.
    #[test]
    fn generate_single_profile() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("nhm.c");

        commands::generate::run(
            dir.path(),
            None,
            Some("nhm_xeonep"),
            Some(out_path.to_str().unwrap()),
        )
        .unwrap();

        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.contains("nhm_xeonep_sse2_1t"));
        assert!(!text.contains("skl_xeonsp"));
    }

    /// add → validate → generate picks up the discovered profile.
    #[test]
    fn custom_profile_workflow() {
        let dir = tempfile::tempdir().unwrap();

        commands::profile::add(dir.path(), "zen5").unwrap();
        commands::profile::validate(dir.path(), "zen5").unwrap();

        let out_path = dir.path().join("all.c");
        commands::generate::run(dir.path(), None, None, Some(out_path.to_str().unwrap()))
            .unwrap();

        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.contains("asm_work_zen5_custom_sse2_1t"));
    }

    /// A broken discovered profile aborts generation with a clear error.
    #[test]
    fn invalid_custom_profile_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let profiles_dir = dir.path().join("profiles");
        std::fs::create_dir_all(&profiles_dir).unwrap();

        let template = ignis_targets::generate_template("broken").unwrap();
        let broken = template.replace("lines = 6400", "lines = 1");
        std::fs::write(profiles_dir.join("broken.profile.toml"), broken).unwrap();

        let result = commands::generate::run(dir.path(), None, None, None);
        assert!(result.is_err());
    }
}
