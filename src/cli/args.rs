//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::requirements::{ContainerBackend, InstallPolicy};

/// nbsetup - Notebook environment setup.
///
/// Finds a Python 3.11-3.13 interpreter (installing one if needed), pins
/// it in `<install-dir>/.python_cmd`, and can set up a Docker-compatible
/// container runtime.
#[derive(Debug, Parser)]
#[command(name = "nbsetup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Install root holding .python_cmd and .nbsetup.yml (default: current directory)
    #[arg(
        short = 'd',
        long,
        global = true,
        env = "NBSETUP_INSTALL_DIR",
        value_name = "DIR"
    )]
    pub install_dir: Option<PathBuf>,

    /// Interpreter to try before the standard candidates
    #[arg(long, global = true, env = "NBSETUP_PYTHON", value_name = "PATH")]
    pub python: Option<String>,

    /// Register a Jupyter kernel with this name after pinning
    #[arg(long, global = true, value_name = "NAME")]
    pub kernel: Option<String>,

    /// Display name of the registered kernel
    #[arg(long, global = true, value_name = "TEXT")]
    pub kernel_display_name: Option<String>,

    /// Never install; fail if nothing acceptable is found
    #[arg(long, global = true)]
    pub no_install: bool,

    /// Print the install plan instead of running it
    #[arg(long, global = true, conflicts_with = "no_install")]
    pub dry_run: bool,

    /// Host platform (ubuntu, debian, macos, windows) instead of detecting it
    #[arg(long, global = true, env = "NBSETUP_PLATFORM", value_name = "ID")]
    pub platform: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use defaults, no prompts
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Whether installs run, are skipped, or are only printed.
    pub fn install_policy(&self) -> InstallPolicy {
        if self.dry_run {
            InstallPolicy::DryRun
        } else if self.no_install {
            InstallPolicy::Disabled
        } else {
            InstallPolicy::Enabled
        }
    }

    /// Settings shared by every resolving command.
    pub fn setup_options(&self) -> SetupOptions {
        SetupOptions {
            python: self.python.clone(),
            kernel: self.kernel.clone(),
            kernel_display_name: self.kernel_display_name.clone(),
            policy: self.install_policy(),
            platform: self.platform.clone(),
        }
    }
}

/// Global flags that commands act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupOptions {
    pub python: Option<String>,
    pub kernel: Option<String>,
    pub kernel_display_name: Option<String>,
    pub policy: InstallPolicy,
    pub platform: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve and pin a Python interpreter (default if no command specified)
    Python,

    /// Resolve a Docker-compatible container runtime and Compose
    Docker(DockerArgs),

    /// Show the pinned interpreter and whether it still satisfies the range
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `docker` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DockerArgs {
    /// Runtime to install when none is found
    #[arg(long, value_enum, env = "NBSETUP_DOCKER_BACKEND")]
    pub backend: Option<ContainerBackend>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["nbsetup"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.install_policy(), InstallPolicy::Enabled);
    }

    #[test]
    fn parses_install_dir_and_python_override() {
        let cli = Cli::try_parse_from([
            "nbsetup",
            "-d",
            "/work/project",
            "--python",
            "/opt/python/bin/python3.12",
        ])
        .unwrap();
        assert_eq!(cli.install_dir, Some(PathBuf::from("/work/project")));
        assert_eq!(
            cli.setup_options().python.as_deref(),
            Some("/opt/python/bin/python3.12")
        );
    }

    #[test]
    fn install_dir_requires_a_value() {
        let err = Cli::try_parse_from(["nbsetup", "-d"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["nbsetup", "status", "--json", "--no-install"]).unwrap();
        assert!(cli.no_install);
        assert!(matches!(cli.command, Some(Commands::Status(StatusArgs { json: true }))));
    }

    #[test]
    fn dry_run_and_no_install_conflict() {
        assert!(Cli::try_parse_from(["nbsetup", "--dry-run", "--no-install"]).is_err());
    }

    #[test]
    fn dry_run_policy() {
        let cli = Cli::try_parse_from(["nbsetup", "--dry-run"]).unwrap();
        assert_eq!(cli.install_policy(), InstallPolicy::DryRun);
    }

    #[test]
    fn docker_backend_is_value_enum() {
        let cli = Cli::try_parse_from(["nbsetup", "docker", "--backend", "rancher"]).unwrap();
        match cli.command {
            Some(Commands::Docker(args)) => {
                assert_eq!(args.backend, Some(ContainerBackend::Rancher))
            }
            other => panic!("Expected docker command, got {:?}", other),
        }
        assert!(Cli::try_parse_from(["nbsetup", "docker", "--backend", "podman"]).is_err());
    }

    #[test]
    fn platform_is_free_form_until_resolved() {
        let cli = Cli::try_parse_from(["nbsetup", "--platform", "solaris"]).unwrap();
        assert_eq!(cli.platform.as_deref(), Some("solaris"));
    }
}
